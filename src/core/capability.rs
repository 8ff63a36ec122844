// Copyright 2025 Cowboy AI, LLC.

//! Capabilities and the capability service

use super::capabilities::{
    ActionCapability, CompositionCapability, DelegationCapability, InstantiationCapability,
    MetadataCapability, MutationCapability, PersistenceCapability, RelationshipCapability,
    TypeCapability, ViewCapability,
};
use super::domain_object::DomainObject;
use crate::entanglement::LocationCapability;
use crate::errors::{CapabilityError, FrameworkResult};
use crate::framework::ResolvedExtension;
use crate::identifiers::Identifier;
use crate::transaction::EditorCapability;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Builds one kind of capability for applicable objects
pub trait CapabilityFactory: Send + Sync {
    /// Whether the capability applies to an object with this model
    fn applies_to(&self, _model: &Value, _id: &Identifier) -> bool {
        true
    }

    /// Build the capability for an object
    fn instantiate(&self, object: &DomainObject) -> Capability;
}

/// Resolves which capabilities an object has
pub trait CapabilityService: Send + Sync {
    /// Factories applicable to the object's current model, by key
    fn get_capabilities(&self, object: &DomainObject) -> IndexMap<String, Arc<dyn CapabilityFactory>>;
}

/// Result of a capability's primary operation
#[derive(Debug, Clone)]
pub enum Invoked {
    /// Plain data
    Value(Value),
    /// Several objects
    Objects(Vec<DomainObject>),
    /// A single object
    Object(DomainObject),
    /// Whether the operation took effect
    Done(bool),
}

impl Invoked {
    /// Objects, if the result holds any
    pub fn into_objects(self) -> Vec<DomainObject> {
        match self {
            Invoked::Objects(objects) => objects,
            Invoked::Object(object) => vec![object],
            _ => Vec::new(),
        }
    }

    /// Plain value, if the result is one
    pub fn into_value(self) -> Option<Value> {
        match self {
            Invoked::Value(value) => Some(value),
            Invoked::Done(done) => Some(Value::Bool(done)),
            _ => None,
        }
    }
}

/// A capability instance
#[derive(Clone)]
pub enum Capability {
    /// Child objects
    Composition(Arc<CompositionCapability>),
    /// Named links to other objects
    Relationship(Arc<RelationshipCapability>),
    /// Type definition access
    Type(Arc<TypeCapability>),
    /// Applicable actions
    Action(Arc<ActionCapability>),
    /// Applicable views
    View(Arc<ViewCapability>),
    /// Saving and loading
    Persistence(Arc<dyn PersistenceCapability>),
    /// Display properties
    Metadata(Arc<MetadataCapability>),
    /// Model changes
    Mutation(Arc<dyn MutationCapability>),
    /// Capabilities delegated to children
    Delegation(Arc<DelegationCapability>),
    /// Creating new objects
    Instantiation(Arc<InstantiationCapability>),
    /// Primary versus contextual location
    Location(Arc<LocationCapability>),
    /// Edit sessions
    Editor(Arc<EditorCapability>),
    /// Capabilities contributed outside the built-in set
    Other(Arc<dyn Any + Send + Sync>),
}

fn first_str<'a>(key: &str, args: &'a [Value]) -> FrameworkResult<&'a str> {
    args.first().and_then(Value::as_str).ok_or_else(|| {
        CapabilityError::InvalidArguments {
            key: key.to_string(),
            reason: "expected a string argument".to_string(),
        }
        .into()
    })
}

impl Capability {
    /// Capability key this variant is registered under
    pub fn kind(&self) -> &'static str {
        match self {
            Capability::Composition(_) => "composition",
            Capability::Relationship(_) => "relationship",
            Capability::Type(_) => "type",
            Capability::Action(_) => "action",
            Capability::View(_) => "view",
            Capability::Persistence(_) => "persistence",
            Capability::Metadata(_) => "metadata",
            Capability::Mutation(_) => "mutation",
            Capability::Delegation(_) => "delegation",
            Capability::Instantiation(_) => "instantiation",
            Capability::Location(_) => "location",
            Capability::Editor(_) => "editor",
            Capability::Other(_) => "other",
        }
    }

    /// Run the primary operation
    ///
    /// - composition: load children
    /// - relationship: list keys, or load related objects for `args[0]`
    /// - action: list keys, or perform action `args[0]`
    /// - mutation: merge object `args[0]` into the model
    /// - delegation: delegates for capability `args[0]`
    /// - instantiation: new object from model `args[0]`
    pub async fn invoke(&self, args: Vec<Value>) -> FrameworkResult<Invoked> {
        let key = self.kind();
        match self {
            Capability::Composition(c) => Ok(Invoked::Objects(c.invoke().await?)),
            Capability::Relationship(r) => match args.first().and_then(Value::as_str) {
                Some(name) => Ok(Invoked::Objects(r.get_related_objects(name).await?)),
                None => Ok(Invoked::Value(json!(r.list_relationships()))),
            },
            Capability::Type(t) => Ok(Invoked::Value(match t.definition() {
                Some(definition) => serde_json::to_value(definition.as_ref())?,
                None => Value::Null,
            })),
            Capability::Action(a) => match args.first().and_then(Value::as_str) {
                Some(action) => Ok(Invoked::Done(a.perform(action).await?)),
                None => Ok(Invoked::Value(json!(a.keys()?))),
            },
            Capability::View(v) => Ok(Invoked::Value(serde_json::to_value(v.views()?)?)),
            Capability::Persistence(p) => Ok(Invoked::Done(p.persist().await?)),
            Capability::Metadata(m) => Ok(Invoked::Value(serde_json::to_value(m.properties())?)),
            Capability::Mutation(m) => {
                let Some(Value::Object(patch)) = args.into_iter().next() else {
                    return Err(CapabilityError::InvalidArguments {
                        key: key.to_string(),
                        reason: "expected an object to merge".to_string(),
                    }
                    .into());
                };
                let done = m.mutate(
                    &mut |model: &mut Value| match model {
                        Value::Object(fields) => {
                            fields.extend(patch.clone());
                            true
                        }
                        _ => false,
                    },
                    None,
                );
                Ok(Invoked::Done(done))
            }
            Capability::Delegation(d) => {
                let delegated = first_str(key, &args)?;
                Ok(Invoked::Objects(d.get_delegates(delegated).await?))
            }
            Capability::Instantiation(i) => {
                let model = args.into_iter().next().unwrap_or_else(|| json!({}));
                Ok(Invoked::Object(i.instantiate(model)?))
            }
            Capability::Location(l) => Ok(Invoked::Value(json!(l.location()))),
            Capability::Editor(e) => {
                e.edit();
                Ok(Invoked::Done(true))
            }
            Capability::Other(_) => Err(CapabilityError::NotInvocable(key.to_string()).into()),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.kind())
    }
}

/// Capability service built from the `capabilities` category
///
/// For each key the first applicable factory in priority order wins.
pub struct CoreCapabilityService {
    factories: Vec<(String, Arc<dyn CapabilityFactory>)>,
}

impl CoreCapabilityService {
    /// Collect factories from resolved `capabilities[]` extensions
    pub fn new(extensions: &[ResolvedExtension]) -> FrameworkResult<Self> {
        let mut factories = Vec::new();
        for extension in extensions {
            let Some(key) = extension.key() else {
                warn!(extension = %extension.extension().log_name(), "Capability without key; skipping");
                continue;
            };
            if !extension.has_implementation() {
                warn!(extension = %extension.extension().log_name(), "Capability without implementation; skipping");
                continue;
            }
            let factory = extension.implementation::<Arc<dyn CapabilityFactory>>()?;
            factories.push((key.to_string(), factory));
        }
        Ok(Self { factories })
    }

    /// Service over explicit factories
    pub fn from_factories(factories: Vec<(String, Arc<dyn CapabilityFactory>)>) -> Self {
        Self { factories }
    }
}

impl CapabilityService for CoreCapabilityService {
    fn get_capabilities(&self, object: &DomainObject) -> IndexMap<String, Arc<dyn CapabilityFactory>> {
        let identifier = object.identifier();
        object.with_model(|model| {
            let mut applicable: IndexMap<String, Arc<dyn CapabilityFactory>> = IndexMap::new();
            for (key, factory) in &self.factories {
                if !applicable.contains_key(key) && factory.applies_to(model, identifier) {
                    applicable.insert(key.clone(), factory.clone());
                }
            }
            applicable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain_object::model_handle;

    struct Marker(&'static str, Option<&'static str>);

    impl CapabilityFactory for Marker {
        fn applies_to(&self, model: &Value, _: &Identifier) -> bool {
            self.1.map_or(true, |field| model.get(field).is_some())
        }

        fn instantiate(&self, _: &DomainObject) -> Capability {
            Capability::Other(Arc::new(self.0))
        }
    }

    fn service() -> Arc<dyn CapabilityService> {
        Arc::new(CoreCapabilityService::from_factories(vec![
            ("thing".to_string(), Arc::new(Marker("specific", Some("special")))),
            ("thing".to_string(), Arc::new(Marker("general", None))),
            ("extra".to_string(), Arc::new(Marker("extra", Some("extra")))),
        ]))
    }

    fn marker(capability: Option<Capability>) -> Option<&'static str> {
        match capability? {
            Capability::Other(any) => any.downcast_ref::<&'static str>().copied(),
            _ => None,
        }
    }

    #[test]
    fn test_first_applicable_factory_wins() {
        let plain = DomainObject::new(Identifier::local("a"), model_handle(json!({})), service());
        let special = DomainObject::new(
            Identifier::local("b"),
            model_handle(json!({"special": true})),
            service(),
        );

        assert_eq!(marker(plain.get_capability("thing")), Some("general"));
        assert_eq!(marker(special.get_capability("thing")), Some("specific"));
    }

    #[test]
    fn test_applicability_follows_model_changes() {
        let object = DomainObject::new(Identifier::local("a"), model_handle(json!({})), service());
        assert!(!object.has_capability("extra"));

        object.replace_model(json!({"extra": 1}));
        assert!(object.has_capability("extra"));
    }

    #[tokio::test]
    async fn test_other_capabilities_are_not_invocable() {
        let object = DomainObject::new(Identifier::local("a"), model_handle(json!({})), service());
        let err = object.use_capability("thing", vec![]).await.unwrap_err();
        assert_eq!(
            err,
            crate::errors::FrameworkError::Capability(CapabilityError::NotInvocable(
                "other".to_string()
            ))
        );
    }
}
