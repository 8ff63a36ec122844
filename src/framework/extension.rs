// Copyright 2025 Cowboy AI, LLC.

//! Extension definitions and their bundle-aware wrappers

use super::priority::{Priority, PrioritySpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Role of a component extension within its service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Supplies a service instance
    Provider,
    /// Merges several providers into one instance
    Aggregator,
    /// Wraps the instance built so far
    Decorator,
}

impl ComponentKind {
    /// Parse a declared `type`; anything else is not a component role
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "provider" => Some(ComponentKind::Provider),
            "aggregator" => Some(ComponentKind::Aggregator),
            "decorator" => Some(ComponentKind::Decorator),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Provider => write!(f, "provider"),
            ComponentKind::Aggregator => write!(f, "aggregator"),
            ComponentKind::Decorator => write!(f, "decorator"),
        }
    }
}

/// Raw extension as declared in a bundle definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDefinition {
    /// Key identifying the extension within its category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Implementation path, relative to the bundle's source folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,

    /// Names injected into the implementation, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,

    /// Declared priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PrioritySpec>,

    /// Declared `type`: a component role, or free-form data such as a
    /// view's object type. Only component roles take part in composition.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Service a component contributes to; defaults to the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provides: Option<String>,

    /// Any other declared fields
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ExtensionDefinition {
    /// Start a definition with the given key
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Set the implementation path
    pub fn implementation(mut self, path: impl Into<String>) -> Self {
        self.implementation = Some(path.into());
        self
    }

    /// Set the dependency list
    pub fn depends<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set a named priority
    pub fn priority(mut self, priority: &str) -> Self {
        self.priority = Some(PrioritySpec::Named(priority.to_string()));
        self
    }

    /// Mark as a component of the given kind
    pub fn component(mut self, kind: ComponentKind, provides: impl Into<String>) -> Self {
        self.kind = Some(kind.to_string());
        self.provides = Some(provides.into());
        self
    }

    /// Add a metadata field
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(field.into(), value);
        self
    }
}

/// An extension as registered: definition plus the bundle context it came from
#[derive(Debug, Clone)]
pub struct Extension {
    bundle: String,
    category: String,
    implementation_path: Option<String>,
    definition: ExtensionDefinition,
    priority: Priority,
    sequence: usize,
}

impl Extension {
    pub(crate) fn new(
        bundle: String,
        category: String,
        implementation_path: Option<String>,
        definition: ExtensionDefinition,
        sequence: usize,
    ) -> Self {
        let owner = format!(
            "{category}({}) from {bundle}",
            definition.key.as_deref().unwrap_or("<no key>")
        );
        let priority = Priority::from_spec(definition.priority.as_ref(), &owner);
        Self {
            bundle,
            category,
            implementation_path,
            definition,
            priority,
            sequence,
        }
    }

    /// Key, if declared
    pub fn key(&self) -> Option<&str> {
        self.definition.key.as_deref()
    }

    /// Category the extension was declared under
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Log name of the contributing bundle
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Raw definition
    pub fn definition(&self) -> &ExtensionDefinition {
        &self.definition
    }

    /// Whether an implementation was declared
    pub fn has_implementation(&self) -> bool {
        self.implementation_path.is_some()
    }

    /// Bundle-resolved implementation path
    pub fn implementation_path(&self) -> Option<&str> {
        self.implementation_path.as_deref()
    }

    /// Declared dependencies
    pub fn depends(&self) -> &[String] {
        &self.definition.depends
    }

    /// Effective priority
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Registration order across all bundles
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Component role, if any
    pub fn component_kind(&self) -> Option<ComponentKind> {
        self.definition.kind.as_deref().and_then(ComponentKind::from_name)
    }

    /// Service this component contributes to
    pub fn provided_service(&self) -> &str {
        self.definition
            .provides
            .as_deref()
            .unwrap_or(&self.category)
    }

    /// Metadata field
    pub fn metadata(&self, field: &str) -> Option<&Value> {
        self.definition.metadata.get(field)
    }

    /// String metadata field
    pub fn metadata_str(&self, field: &str) -> Option<&str> {
        self.metadata(field).and_then(Value::as_str)
    }

    /// Human-readable name for logs and errors
    pub fn log_name(&self) -> String {
        format!(
            "{}({}) from {}",
            self.category,
            self.key().unwrap_or("<no key>"),
            self.bundle
        )
    }
}
