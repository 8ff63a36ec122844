// Copyright 2025 Cowboy AI, LLC.

//! Building domain objects (`instantiate`, `objectService`)

use super::cache::ModelCache;
use super::identifier::IdentifierService;
use super::model::ModelService;
use crate::core::capability::CapabilityService;
use crate::core::domain_object::DomainObject;
use crate::errors::FrameworkResult;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Creates domain objects over cached model handles
pub struct Instantiator {
    capability_service: Arc<dyn CapabilityService>,
    identifiers: Arc<IdentifierService>,
    cache: Arc<ModelCache>,
}

impl Instantiator {
    /// Instantiator resolving capabilities through `capability_service`
    pub fn new(
        capability_service: Arc<dyn CapabilityService>,
        identifiers: Arc<IdentifierService>,
        cache: Arc<ModelCache>,
    ) -> Self {
        Self {
            capability_service,
            identifiers,
            cache,
        }
    }

    /// Object for `model`; a new identifier is generated when `id` is `None`
    ///
    /// The model replaces whatever is cached for the id.
    pub fn instantiate(&self, model: Value, id: Option<&str>) -> DomainObject {
        let identifier = match id {
            Some(id) => self.identifiers.parse(id),
            None => self.identifiers.generate(None),
        };
        let handle = self.cache.put(&identifier.keystring(), model);
        DomainObject::new(identifier, handle, self.capability_service.clone())
    }

    /// Object for a loaded model, sharing any cached handle
    pub fn attach(&self, id: &str, model: Value) -> DomainObject {
        let handle = self.cache.attach(id, model);
        DomainObject::new(self.identifiers.parse(id), handle, self.capability_service.clone())
    }
}

/// Loads domain objects by id
pub struct ObjectService {
    models: Arc<dyn ModelService>,
    instantiator: Arc<Instantiator>,
}

impl ObjectService {
    /// Object service over a model service
    pub fn new(models: Arc<dyn ModelService>, instantiator: Arc<Instantiator>) -> Self {
        Self {
            models,
            instantiator,
        }
    }

    /// Objects for the ids that have models, in request order
    pub async fn get_objects(&self, ids: &[String]) -> FrameworkResult<IndexMap<String, DomainObject>> {
        let models = self.models.get_models(ids).await?;
        Ok(models
            .into_iter()
            .map(|(id, model)| {
                let object = self.instantiator.attach(&id, model);
                (id, object)
            })
            .collect())
    }

    /// A single object
    pub async fn get_object(&self, id: &str) -> FrameworkResult<Option<DomainObject>> {
        let mut objects = self.get_objects(&[id.to_string()]).await?;
        Ok(objects.shift_remove(id))
    }
}
