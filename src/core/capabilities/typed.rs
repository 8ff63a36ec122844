// Copyright 2025 Cowboy AI, LLC.

//! Capabilities derived from an object's type: type, metadata, delegation

use crate::core::capability::{Capability, CapabilityFactory};
use crate::core::domain_object::DomainObject;
use crate::core::services::{TypeDefinition, TypeService};
use crate::errors::FrameworkResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Access to the object's type definition
pub struct TypeCapability {
    object: DomainObject,
    types: Arc<TypeService>,
}

impl TypeCapability {
    /// Type capability for `object`
    pub fn new(object: DomainObject, types: Arc<TypeService>) -> Self {
        Self { object, types }
    }

    /// Declared `model.type`
    pub fn type_key(&self) -> Option<String> {
        self.object.model_str("type")
    }

    /// Merged definition, if the type is known
    pub fn definition(&self) -> Option<Arc<TypeDefinition>> {
        self.types.get_type(&self.type_key()?)
    }

    /// Whether the object's type is, or inherits from, `key`
    pub fn instance_of(&self, key: &str) -> bool {
        match self.definition() {
            Some(definition) => definition.instance_of(key),
            None => self.type_key().as_deref() == Some(key),
        }
    }

    /// Whether the type declares `feature`
    pub fn has_feature(&self, feature: &str) -> bool {
        self.definition().is_some_and(|d| d.has_feature(feature))
    }

    /// Initial model for new instances of this type
    pub fn initial_model(&self) -> Value {
        self.definition()
            .map(|d| d.initial_model())
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    /// Display name of the type
    pub fn name(&self) -> String {
        match self.definition() {
            Some(definition) => definition.display_name().to_string(),
            None => self.type_key().unwrap_or_else(|| "Unknown Type".to_string()),
        }
    }
}

/// A displayable property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataProperty {
    /// Label
    pub name: String,
    /// Formatted value
    pub value: String,
}

impl MetadataProperty {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3fZ").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Display properties of an object
pub struct MetadataCapability {
    object: DomainObject,
    types: Arc<TypeService>,
}

impl MetadataCapability {
    /// Metadata of `object`
    pub fn new(object: DomainObject, types: Arc<TypeService>) -> Self {
        Self { object, types }
    }

    /// Title, type, type-declared properties, then timestamps
    pub fn properties(&self) -> Vec<MetadataProperty> {
        let model = self.object.model();
        let definition = model
            .get("type")
            .and_then(Value::as_str)
            .and_then(|key| self.types.get_type(key));

        let mut properties = vec![
            MetadataProperty::new(
                "Title",
                model.get("name").map(display).unwrap_or_default(),
            ),
            MetadataProperty::new(
                "Type",
                definition
                    .as_ref()
                    .map(|d| d.display_name().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
        ];
        if let Some(definition) = &definition {
            for property in &definition.properties {
                let Some(key) = property.get("key").and_then(Value::as_str) else {
                    continue;
                };
                let name = property.get("name").and_then(Value::as_str).unwrap_or(key);
                if let Some(value) = model.get(key) {
                    properties.push(MetadataProperty::new(name, display(value)));
                }
            }
        }
        if let Some(modified) = model.get("modified").and_then(Value::as_i64) {
            properties.push(MetadataProperty::new("Modified", format_millis(modified)));
        }
        properties.push(MetadataProperty::new(
            "Persisted",
            model
                .get("persisted")
                .and_then(Value::as_i64)
                .map(format_millis)
                .unwrap_or_else(|| "Never".to_string()),
        ));
        properties
    }
}

/// Capabilities an object hands off to its children
pub struct DelegationCapability {
    object: DomainObject,
    types: Arc<TypeService>,
}

impl DelegationCapability {
    /// Delegation of `object`
    pub fn new(object: DomainObject, types: Arc<TypeService>) -> Self {
        Self { object, types }
    }

    /// Whether the type delegates `key`
    pub fn does_delegate(&self, key: &str) -> bool {
        self.object
            .model_str("type")
            .and_then(|t| self.types.get_type(&t))
            .is_some_and(|d| d.delegates.iter().any(|k| k == key))
    }

    /// Children having capability `key`, when it is delegated
    pub async fn get_delegates(&self, key: &str) -> FrameworkResult<Vec<DomainObject>> {
        if !self.does_delegate(key) {
            return Ok(Vec::new());
        }
        let Some(composition) = self.object.composition() else {
            return Ok(Vec::new());
        };
        Ok(composition
            .invoke()
            .await?
            .into_iter()
            .filter(|child| child.has_capability(key))
            .collect())
    }
}

/// Which type-derived capability a [`TypedFactory`] builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedKind {
    /// [`TypeCapability`]
    Type,
    /// [`MetadataCapability`]
    Metadata,
    /// [`DelegationCapability`]
    Delegation,
}

/// Factory for the type-derived capabilities
pub struct TypedFactory {
    kind: TypedKind,
    types: Arc<TypeService>,
}

impl TypedFactory {
    /// Factory of `kind` over `types`
    pub fn new(kind: TypedKind, types: Arc<TypeService>) -> Self {
        Self { kind, types }
    }
}

impl CapabilityFactory for TypedFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        let object = object.clone();
        let types = self.types.clone();
        match self.kind {
            TypedKind::Type => Capability::Type(Arc::new(TypeCapability::new(object, types))),
            TypedKind::Metadata => {
                Capability::Metadata(Arc::new(MetadataCapability::new(object, types)))
            }
            TypedKind::Delegation => {
                Capability::Delegation(Arc::new(DelegationCapability::new(object, types)))
            }
        }
    }
}
