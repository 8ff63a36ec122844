// Copyright 2025 Cowboy AI, LLC.

//! Composition and relationship capabilities

use crate::core::capability::{Capability, CapabilityFactory};
use crate::core::domain_object::DomainObject;
use crate::core::services::ObjectService;
use crate::errors::{CapabilityError, FrameworkResult};
use crate::framework::Lazy;
use crate::identifiers::Identifier;
use serde_json::Value;
use std::sync::Arc;

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Children listed in `model.composition`
pub struct CompositionCapability {
    object: DomainObject,
    objects: Lazy<Arc<ObjectService>>,
}

impl CompositionCapability {
    /// Composition of `object`
    pub fn new(object: DomainObject, objects: Lazy<Arc<ObjectService>>) -> Self {
        Self { object, objects }
    }

    /// Child ids in order
    pub fn ids(&self) -> Vec<String> {
        self.object.with_model(|m| string_list(m.get("composition")))
    }

    /// Whether `id` is a child
    pub fn contains(&self, id: &str) -> bool {
        self.ids().iter().any(|child| child == id)
    }

    /// Load children, each seen in the context of this object
    pub async fn invoke(&self) -> FrameworkResult<Vec<DomainObject>> {
        let ids = self.ids();
        let mut loaded = self.objects.get()?.get_objects(&ids).await?;
        Ok(ids
            .iter()
            .filter_map(|id| loaded.shift_remove(id))
            .map(|child| child.contextualize(&self.object))
            .collect())
    }

    /// Add a child at `index` (or last); returns the child in this context
    ///
    /// Adding a child already present only contextualizes it.
    pub fn add(&self, child: &DomainObject, index: Option<usize>) -> FrameworkResult<DomainObject> {
        let id = child.id();
        if !self.contains(&id) {
            self.mutate(|composition| {
                let at = index.unwrap_or(composition.len()).min(composition.len());
                composition.insert(at, Value::String(id.clone()));
                true
            })?;
        }
        Ok(child.contextualize(&self.object))
    }

    /// Remove a child; `false` when it was not present
    pub fn remove(&self, id: &str) -> FrameworkResult<bool> {
        if !self.contains(id) {
            return Ok(false);
        }
        self.mutate(|composition| {
            composition.retain(|child| child.as_str() != Some(id));
            true
        })?;
        Ok(true)
    }

    fn mutate(&self, mut change: impl FnMut(&mut Vec<Value>) -> bool) -> FrameworkResult<()> {
        let mutation = self
            .object
            .mutation()
            .ok_or_else(|| self.object.unavailable("mutation"))?;
        let done = mutation.mutate(
            &mut |model: &mut Value| match model.get_mut("composition") {
                Some(Value::Array(composition)) => change(composition),
                _ => false,
            },
            None,
        );
        if done {
            Ok(())
        } else {
            Err(CapabilityError::MutationCancelled(self.object.id()).into())
        }
    }
}

/// Factory for [`CompositionCapability`]; applies when `composition` is an array
pub struct CompositionFactory {
    objects: Lazy<Arc<ObjectService>>,
}

impl CompositionFactory {
    /// Factory loading children through `objects`
    pub fn new(objects: Lazy<Arc<ObjectService>>) -> Self {
        Self { objects }
    }
}

impl CapabilityFactory for CompositionFactory {
    fn applies_to(&self, model: &Value, _: &Identifier) -> bool {
        model.get("composition").is_some_and(Value::is_array)
    }

    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Composition(Arc::new(CompositionCapability::new(
            object.clone(),
            self.objects.clone(),
        )))
    }
}

/// Named links in `model.relationships`
pub struct RelationshipCapability {
    object: DomainObject,
    objects: Lazy<Arc<ObjectService>>,
}

impl RelationshipCapability {
    /// Relationships of `object`
    pub fn new(object: DomainObject, objects: Lazy<Arc<ObjectService>>) -> Self {
        Self { object, objects }
    }

    /// Relationship names
    pub fn list_relationships(&self) -> Vec<String> {
        self.object.with_model(|m| {
            m.get("relationships")
                .and_then(Value::as_object)
                .map(|r| r.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Ids related under `key`
    pub fn related_ids(&self, key: &str) -> Vec<String> {
        self.object
            .with_model(|m| string_list(m.get("relationships").and_then(|r| r.get(key))))
    }

    /// Objects related under `key`, in declaration order
    pub async fn get_related_objects(&self, key: &str) -> FrameworkResult<Vec<DomainObject>> {
        let ids = self.related_ids(key);
        let mut loaded = self.objects.get()?.get_objects(&ids).await?;
        Ok(ids.iter().filter_map(|id| loaded.shift_remove(id)).collect())
    }
}

/// Factory for [`RelationshipCapability`]; applies when `relationships` is an object
pub struct RelationshipFactory {
    objects: Lazy<Arc<ObjectService>>,
}

impl RelationshipFactory {
    /// Factory loading related objects through `objects`
    pub fn new(objects: Lazy<Arc<ObjectService>>) -> Self {
        Self { objects }
    }
}

impl CapabilityFactory for RelationshipFactory {
    fn applies_to(&self, model: &Value, _: &Identifier) -> bool {
        model.get("relationships").is_some_and(Value::is_object)
    }

    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Relationship(Arc::new(RelationshipCapability::new(
            object.clone(),
            self.objects.clone(),
        )))
    }
}
