// Copyright 2025 Cowboy AI, LLC.

//! Compose actions: link, move, copy and remove
//!
//! For link, move and copy the context's `domain_object` is the new
//! parent and `selected_object` the object being placed. Remove takes
//! `domain_object` out of its contextual parent.

use super::services::EntanglementService;
use crate::core::services::{Action, ActionContext, ActionFactory, ActionMetadata};
use crate::core::DomainObject;
use crate::errors::FrameworkResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Action factory placing the selected object into the domain object
pub struct ComposeActionFactory {
    service: Arc<dyn EntanglementService>,
}

impl ComposeActionFactory {
    /// Factory performing through `service`
    pub fn new(service: Arc<dyn EntanglementService>) -> Self {
        Self { service }
    }
}

impl ActionFactory for ComposeActionFactory {
    fn applies_to(&self, context: &ActionContext) -> bool {
        match (&context.domain_object, &context.selected_object) {
            (Some(parent), Some(object)) => self.service.validate(object, parent).is_ok(),
            _ => false,
        }
    }

    fn create(&self, metadata: ActionMetadata, context: &ActionContext) -> Arc<dyn Action> {
        Arc::new(ComposeAction {
            metadata,
            service: self.service.clone(),
            parent: context.domain_object.clone(),
            object: context.selected_object.clone(),
        })
    }
}

struct ComposeAction {
    metadata: ActionMetadata,
    service: Arc<dyn EntanglementService>,
    parent: Option<DomainObject>,
    object: Option<DomainObject>,
}

#[async_trait]
impl Action for ComposeAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    async fn perform(&self) -> FrameworkResult<bool> {
        let (Some(parent), Some(object)) = (&self.parent, &self.object) else {
            return Ok(false);
        };
        self.service.perform(object, parent).await?;
        Ok(true)
    }
}

/// Action factory removing an object from the parent it is seen through
#[derive(Debug, Default)]
pub struct RemoveActionFactory;

impl ActionFactory for RemoveActionFactory {
    fn applies_to(&self, context: &ActionContext) -> bool {
        context
            .domain_object
            .as_ref()
            .and_then(DomainObject::parent)
            .is_some_and(|parent| parent.has_capability("composition"))
    }

    fn create(&self, metadata: ActionMetadata, context: &ActionContext) -> Arc<dyn Action> {
        Arc::new(RemoveAction {
            metadata,
            object: context.domain_object.clone(),
        })
    }
}

struct RemoveAction {
    metadata: ActionMetadata,
    object: Option<DomainObject>,
}

#[async_trait]
impl Action for RemoveAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    async fn perform(&self) -> FrameworkResult<bool> {
        let Some(object) = &self.object else {
            return Ok(false);
        };
        let Some(parent) = object.parent() else {
            return Ok(false);
        };
        let Some(composition) = parent.composition() else {
            return Err(parent.unavailable("composition"));
        };
        if !composition.remove(&object.id())? {
            return Ok(false);
        }
        if let Some(persistence) = parent.persistence() {
            persistence.persist().await?;
        }
        info!(object = %object.id(), parent = %parent.id(), "Removed object from parent");
        Ok(true)
    }
}
