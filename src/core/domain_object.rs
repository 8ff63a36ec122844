// Copyright 2025 Cowboy AI, LLC.

//! Domain objects
//!
//! A domain object is an identifier, a shared model and access to the
//! capability service. Capabilities are never stored on the object; they
//! are looked up from the current model on every request.

use super::capabilities::{
    ActionCapability, CompositionCapability, DelegationCapability, InstantiationCapability,
    MetadataCapability, MutationCapability, PersistenceCapability, RelationshipCapability,
    TypeCapability, ViewCapability,
};
use super::capability::{Capability, CapabilityFactory, CapabilityService, Invoked};
use crate::entanglement::LocationCapability;
use crate::errors::{CapabilityError, FrameworkError, FrameworkResult};
use crate::identifiers::Identifier;
use crate::transaction::EditorCapability;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Model storage shared by every object wrapping the same identifier
pub type ModelHandle = Arc<RwLock<Value>>;

/// Wrap a model in a fresh handle
pub fn model_handle(model: Value) -> ModelHandle {
    Arc::new(RwLock::new(model))
}

struct Inner {
    identifier: Identifier,
    model: ModelHandle,
    capability_service: Arc<dyn CapabilityService>,
    parent: Option<DomainObject>,
}

/// Addressable object: identifier, model and capabilities
#[derive(Clone)]
pub struct DomainObject {
    inner: Arc<Inner>,
}

impl DomainObject {
    /// Create an object over a model handle
    pub fn new(
        identifier: Identifier,
        model: ModelHandle,
        capability_service: Arc<dyn CapabilityService>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                identifier,
                model,
                capability_service,
                parent: None,
            }),
        }
    }

    /// Key string of the identifier
    pub fn id(&self) -> String {
        self.inner.identifier.keystring()
    }

    /// Identifier
    pub fn identifier(&self) -> &Identifier {
        &self.inner.identifier
    }

    /// Snapshot of the current model
    pub fn model(&self) -> Value {
        self.inner.model.read().clone()
    }

    /// Read the model without cloning it
    pub fn with_model<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.model.read())
    }

    /// String field of the model
    pub fn model_str(&self, field: &str) -> Option<String> {
        self.with_model(|m| m.get(field).and_then(Value::as_str).map(String::from))
    }

    /// Shared model handle
    pub fn model_handle(&self) -> &ModelHandle {
        &self.inner.model
    }

    /// Replace the model without notifying anyone
    ///
    /// Prefer the mutation capability; this exists for restoring snapshots.
    pub fn replace_model(&self, model: Value) {
        *self.inner.model.write() = model;
    }

    /// Capability service this object resolves through
    pub fn capability_service(&self) -> &Arc<dyn CapabilityService> {
        &self.inner.capability_service
    }

    /// Capability factories applicable to the current model
    pub fn capabilities(&self) -> IndexMap<String, Arc<dyn CapabilityFactory>> {
        self.inner.capability_service.get_capabilities(self)
    }

    /// Whether a capability applies right now
    pub fn has_capability(&self, key: &str) -> bool {
        self.capabilities().contains_key(key)
    }

    /// Instantiate a capability
    pub fn get_capability(&self, key: &str) -> Option<Capability> {
        self.capabilities()
            .get(key)
            .map(|factory| factory.instantiate(self))
    }

    /// Invoke a capability's primary operation; `None` when it does not apply
    pub async fn use_capability(
        &self,
        key: &str,
        args: Vec<Value>,
    ) -> FrameworkResult<Option<Invoked>> {
        match self.get_capability(key) {
            Some(capability) => Ok(Some(capability.invoke(args).await?)),
            None => Ok(None),
        }
    }

    /// Error for a capability this object does not have
    pub fn unavailable(&self, key: &str) -> FrameworkError {
        CapabilityError::Unavailable {
            id: self.id(),
            key: key.to_string(),
        }
        .into()
    }

    /// Contextual parent, when reached through a composition
    pub fn parent(&self) -> Option<&DomainObject> {
        self.inner.parent.as_ref()
    }

    /// The same object seen through `parent`
    pub fn contextualize(&self, parent: &DomainObject) -> DomainObject {
        Self {
            inner: Arc::new(Inner {
                identifier: self.inner.identifier.clone(),
                model: self.inner.model.clone(),
                capability_service: self.inner.capability_service.clone(),
                parent: Some(parent.clone()),
            }),
        }
    }

    /// Ids from the outermost context down to this object
    pub fn path(&self) -> Vec<String> {
        let mut path = vec![self.id()];
        let mut current = self.parent();
        while let Some(parent) = current {
            path.push(parent.id());
            current = parent.parent();
        }
        path.reverse();
        path
    }

    /// Whether both wrap the same identifier
    pub fn same_as(&self, other: &DomainObject) -> bool {
        self.inner.identifier == other.inner.identifier
    }

    /// Persistence capability
    pub fn persistence(&self) -> Option<Arc<dyn PersistenceCapability>> {
        match self.get_capability("persistence")? {
            Capability::Persistence(c) => Some(c),
            _ => None,
        }
    }

    /// Mutation capability
    pub fn mutation(&self) -> Option<Arc<dyn MutationCapability>> {
        match self.get_capability("mutation")? {
            Capability::Mutation(c) => Some(c),
            _ => None,
        }
    }

    /// Composition capability
    pub fn composition(&self) -> Option<Arc<CompositionCapability>> {
        match self.get_capability("composition")? {
            Capability::Composition(c) => Some(c),
            _ => None,
        }
    }

    /// Relationship capability
    pub fn relationship(&self) -> Option<Arc<RelationshipCapability>> {
        match self.get_capability("relationship")? {
            Capability::Relationship(c) => Some(c),
            _ => None,
        }
    }

    /// Type capability
    pub fn type_capability(&self) -> Option<Arc<TypeCapability>> {
        match self.get_capability("type")? {
            Capability::Type(c) => Some(c),
            _ => None,
        }
    }

    /// Metadata capability
    pub fn metadata(&self) -> Option<Arc<MetadataCapability>> {
        match self.get_capability("metadata")? {
            Capability::Metadata(c) => Some(c),
            _ => None,
        }
    }

    /// Delegation capability
    pub fn delegation(&self) -> Option<Arc<DelegationCapability>> {
        match self.get_capability("delegation")? {
            Capability::Delegation(c) => Some(c),
            _ => None,
        }
    }

    /// Instantiation capability
    pub fn instantiation(&self) -> Option<Arc<InstantiationCapability>> {
        match self.get_capability("instantiation")? {
            Capability::Instantiation(c) => Some(c),
            _ => None,
        }
    }

    /// Action capability
    pub fn action(&self) -> Option<Arc<ActionCapability>> {
        match self.get_capability("action")? {
            Capability::Action(c) => Some(c),
            _ => None,
        }
    }

    /// View capability
    pub fn view(&self) -> Option<Arc<ViewCapability>> {
        match self.get_capability("view")? {
            Capability::View(c) => Some(c),
            _ => None,
        }
    }

    /// Location capability
    pub fn location(&self) -> Option<Arc<LocationCapability>> {
        match self.get_capability("location")? {
            Capability::Location(c) => Some(c),
            _ => None,
        }
    }

    /// Editor capability
    pub fn editor(&self) -> Option<Arc<EditorCapability>> {
        match self.get_capability("editor")? {
            Capability::Editor(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Debug for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainObject")
            .field("id", &self.id())
            .field("parent", &self.parent().map(DomainObject::id))
            .finish()
    }
}
