// Copyright 2025 Cowboy AI, LLC.

//! Instantiation capability

use crate::core::capability::{Capability, CapabilityFactory};
use crate::core::domain_object::DomainObject;
use crate::core::services::{IdentifierService, Instantiator};
use crate::errors::FrameworkResult;
use crate::framework::Lazy;
use serde_json::Value;
use std::sync::Arc;

/// Creates new objects in the same space as this one
pub struct InstantiationCapability {
    object: DomainObject,
    instantiator: Lazy<Arc<Instantiator>>,
    identifiers: Arc<IdentifierService>,
}

impl InstantiationCapability {
    /// Instantiation from `object`
    pub fn new(
        object: DomainObject,
        instantiator: Lazy<Arc<Instantiator>>,
        identifiers: Arc<IdentifierService>,
    ) -> Self {
        Self {
            object,
            instantiator,
            identifiers,
        }
    }

    /// New object with a generated id, seen in the context of this object
    ///
    /// The object is not added to any composition and not persisted.
    pub fn instantiate(&self, model: Value) -> FrameworkResult<DomainObject> {
        let space = self.identifiers.space_of(self.object.identifier());
        let id = self.identifiers.generate(Some(&space));
        let created = self
            .instantiator
            .get()?
            .instantiate(model, Some(&id.keystring()));
        Ok(created.contextualize(&self.object))
    }
}

/// Factory for [`InstantiationCapability`]
pub struct InstantiationFactory {
    instantiator: Lazy<Arc<Instantiator>>,
    identifiers: Arc<IdentifierService>,
}

impl InstantiationFactory {
    /// Factory creating objects through `instantiator`
    pub fn new(instantiator: Lazy<Arc<Instantiator>>, identifiers: Arc<IdentifierService>) -> Self {
        Self {
            instantiator,
            identifiers,
        }
    }
}

impl CapabilityFactory for InstantiationFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Instantiation(Arc::new(InstantiationCapability::new(
            object.clone(),
            self.instantiator.clone(),
            self.identifiers.clone(),
        )))
    }
}
