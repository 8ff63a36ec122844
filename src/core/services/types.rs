// Copyright 2025 Cowboy AI, LLC.

//! Type definitions (`typeService`)
//!
//! Types come from the `types` category. A type may inherit from others;
//! inherited definitions are merged once at construction, parents first.

use crate::framework::ResolvedExtension;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// A merged type definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type key
    pub key: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Features such as `creation`
    #[serde(default)]
    pub features: Vec<String>,

    /// Parent types
    #[serde(default)]
    pub inherits: Vec<String>,

    /// Initial model for new instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,

    /// Properties shown as metadata (`{key, name}`)
    #[serde(default)]
    pub properties: Vec<Value>,

    /// Capabilities instances delegate to their children
    #[serde(default)]
    pub delegates: Vec<String>,

    /// Types allowed in an instance's composition; any when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<String>>,

    /// This type and every type it inherits from
    #[serde(skip)]
    ancestry: Vec<String>,
}

impl TypeDefinition {
    /// Whether this type is, or inherits from, `key`
    pub fn instance_of(&self, key: &str) -> bool {
        self.key == key || self.ancestry.iter().any(|k| k == key)
    }

    /// Whether the type declares a feature
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Initial model, `{}` when none is declared
    pub fn initial_model(&self) -> Value {
        self.model.clone().unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Display name, falling back to the key
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Whether instances start out with a composition
    pub fn holds_composition(&self) -> bool {
        self.model
            .as_ref()
            .and_then(|m| m.get("composition"))
            .is_some_and(Value::is_array)
    }

    /// Whether instances may contain objects of `child_type`
    pub fn may_contain(&self, child_type: Option<&str>) -> bool {
        match (&self.contains, child_type) {
            (None, _) => true,
            (Some(allowed), Some(child)) => allowed.iter().any(|t| t == child),
            (Some(_), None) => false,
        }
    }

    fn inherit(&mut self, parent: &TypeDefinition) {
        if self.name.is_none() {
            self.name = parent.name.clone();
        }
        if self.description.is_none() {
            self.description = parent.description.clone();
        }
        union(&mut self.features, &parent.features);
        union(&mut self.delegates, &parent.delegates);
        let mut properties = parent.properties.clone();
        properties.append(&mut self.properties);
        self.properties = properties;
        self.model = match (parent.model.clone(), self.model.take()) {
            (Some(Value::Object(mut base)), Some(Value::Object(own))) => {
                base.extend(own);
                Some(Value::Object(base))
            }
            (base, own) => own.or(base),
        };
        if self.contains.is_none() {
            self.contains = parent.contains.clone();
        }
        union(&mut self.ancestry, &parent.ancestry);
        union(&mut self.ancestry, std::slice::from_ref(&parent.key));
    }
}

fn union(target: &mut Vec<String>, source: &[String]) {
    for item in source {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

/// Type registry with inheritance resolved
#[derive(Debug, Default)]
pub struct TypeService {
    types: IndexMap<String, Arc<TypeDefinition>>,
}

impl TypeService {
    /// Build from resolved `types[]` extensions; the first definition per key wins
    pub fn new(extensions: &[ResolvedExtension]) -> Self {
        let mut raw: IndexMap<String, TypeDefinition> = IndexMap::new();
        for extension in extensions {
            match extension.definition_as::<TypeDefinition>() {
                Ok(definition) if !definition.key.is_empty() => {
                    if !raw.contains_key(&definition.key) {
                        raw.insert(definition.key.clone(), definition);
                    }
                }
                Ok(_) => warn!(extension = %extension.extension().log_name(), "Type without key; skipping"),
                Err(e) => warn!(
                    extension = %extension.extension().log_name(),
                    error = %e,
                    "Malformed type definition; skipping"
                ),
            }
        }
        Self::from_definitions(raw.into_values().collect())
    }

    /// Build from explicit definitions
    pub fn from_definitions(definitions: Vec<TypeDefinition>) -> Self {
        let raw: IndexMap<String, TypeDefinition> = definitions
            .into_iter()
            .map(|d| (d.key.clone(), d))
            .collect();
        let mut merged = IndexMap::new();
        for key in raw.keys() {
            let mut visiting = HashSet::new();
            if let Some(definition) = merge(key, &raw, &mut visiting) {
                merged.insert(key.clone(), Arc::new(definition));
            }
        }
        Self { types: merged }
    }

    /// Type by key
    pub fn get_type(&self, key: &str) -> Option<Arc<TypeDefinition>> {
        self.types.get(key).cloned()
    }

    /// Every type, in declaration order
    pub fn list_types(&self) -> Vec<Arc<TypeDefinition>> {
        self.types.values().cloned().collect()
    }
}

fn merge(
    key: &str,
    raw: &IndexMap<String, TypeDefinition>,
    visiting: &mut HashSet<String>,
) -> Option<TypeDefinition> {
    let own = raw.get(key)?;
    if !visiting.insert(key.to_string()) {
        warn!(type_key = %key, "Cyclic type inheritance; ignoring repeated parent");
        return None;
    }
    let mut merged = own.clone();
    merged.properties.clear();
    merged.model = None;
    merged.features.clear();
    merged.delegates.clear();
    for parent_key in &own.inherits {
        match merge(parent_key, raw, visiting) {
            Some(parent) => merged.inherit(&parent),
            None => warn!(type_key = %key, parent = %parent_key, "Unknown or cyclic parent type"),
        }
    }
    let mut local = own.clone();
    local.ancestry = Vec::new();
    merged.inherit_own(local);
    visiting.remove(key);
    Some(merged)
}

impl TypeDefinition {
    fn inherit_own(&mut self, own: TypeDefinition) {
        if own.name.is_some() {
            self.name = own.name;
        }
        if own.description.is_some() {
            self.description = own.description;
        }
        union(&mut self.features, &own.features);
        union(&mut self.delegates, &own.delegates);
        self.properties.extend(own.properties);
        self.model = match (self.model.take(), own.model) {
            (Some(Value::Object(mut base)), Some(Value::Object(fields))) => {
                base.extend(fields);
                Some(Value::Object(base))
            }
            (base, own) => own.or(base),
        };
        if own.contains.is_some() {
            self.contains = own.contains;
        }
    }
}
