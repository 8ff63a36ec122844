// Copyright 2025 Cowboy AI, LLC.

//! Action and view capabilities

use crate::core::capability::{Capability, CapabilityFactory};
use crate::core::domain_object::DomainObject;
use crate::core::services::{Action, ActionContext, ActionService, ViewDefinition, ViewService};
use crate::errors::FrameworkResult;
use crate::framework::Lazy;
use std::sync::Arc;

/// Actions available on an object
pub struct ActionCapability {
    object: DomainObject,
    actions: Lazy<Arc<dyn ActionService>>,
}

impl ActionCapability {
    /// Actions of `object`
    pub fn new(object: DomainObject, actions: Lazy<Arc<dyn ActionService>>) -> Self {
        Self { object, actions }
    }

    /// Actions for this object, optionally only those with `key`
    pub fn get_actions(&self, key: Option<&str>) -> FrameworkResult<Vec<Arc<dyn Action>>> {
        let mut context = ActionContext::for_object(&self.object);
        context.key = key.map(String::from);
        self.get_actions_in(context)
    }

    /// Actions for a richer context; the domain object is always this one
    pub fn get_actions_in(&self, mut context: ActionContext) -> FrameworkResult<Vec<Arc<dyn Action>>> {
        context.domain_object = Some(self.object.clone());
        Ok(self.actions.get()?.get_actions(&context))
    }

    /// Keys of the available actions
    pub fn keys(&self) -> FrameworkResult<Vec<String>> {
        Ok(self
            .get_actions(None)?
            .iter()
            .map(|a| a.metadata().key.clone())
            .collect())
    }

    /// Perform the first action with `key`; `false` when none applies
    pub async fn perform(&self, key: &str) -> FrameworkResult<bool> {
        match self.get_actions(Some(key))?.into_iter().next() {
            Some(action) => action.perform().await,
            None => Ok(false),
        }
    }
}

/// Views able to show an object
pub struct ViewCapability {
    object: DomainObject,
    views: Lazy<Arc<dyn ViewService>>,
}

impl ViewCapability {
    /// Views of `object`
    pub fn new(object: DomainObject, views: Lazy<Arc<dyn ViewService>>) -> Self {
        Self { object, views }
    }

    /// Applicable views in priority order
    pub fn views(&self) -> FrameworkResult<Vec<ViewDefinition>> {
        Ok(self.views.get()?.get_views(&self.object))
    }
}

/// Factory for [`ActionCapability`]
pub struct ActionFactoryCapability {
    actions: Lazy<Arc<dyn ActionService>>,
}

impl ActionFactoryCapability {
    /// Factory listing actions from `actions`
    pub fn new(actions: Lazy<Arc<dyn ActionService>>) -> Self {
        Self { actions }
    }
}

impl CapabilityFactory for ActionFactoryCapability {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Action(Arc::new(ActionCapability::new(
            object.clone(),
            self.actions.clone(),
        )))
    }
}

/// Factory for [`ViewCapability`]
pub struct ViewFactory {
    views: Lazy<Arc<dyn ViewService>>,
}

impl ViewFactory {
    /// Factory listing views from `views`
    pub fn new(views: Lazy<Arc<dyn ViewService>>) -> Self {
        Self { views }
    }
}

impl CapabilityFactory for ViewFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::View(Arc::new(ViewCapability::new(object.clone(), self.views.clone())))
    }
}
