// Copyright 2025 Cowboy AI, LLC.

//! Policy-filtered action and view services

use super::service::PolicyService;
use crate::core::services::{Action, ActionContext, ActionService, ViewDefinition, ViewService};
use crate::core::DomainObject;
use std::sync::Arc;

/// Policy category consulted for actions
pub const ACTION_CATEGORY: &str = "action";

/// Policy category consulted for views
pub const VIEW_CATEGORY: &str = "view";

/// Drops actions the `action` policies deny
///
/// Policies receive the `Arc<dyn Action>` as candidate and the
/// [`ActionContext`] as context.
pub struct PolicyActionDecorator {
    policy: Arc<dyn PolicyService>,
    inner: Arc<dyn ActionService>,
}

impl PolicyActionDecorator {
    /// Decorate `inner`
    pub fn new(policy: Arc<dyn PolicyService>, inner: Arc<dyn ActionService>) -> Self {
        Self { policy, inner }
    }
}

impl ActionService for PolicyActionDecorator {
    fn get_actions(&self, context: &ActionContext) -> Vec<Arc<dyn Action>> {
        self.inner
            .get_actions(context)
            .into_iter()
            .filter(|action| self.policy.allow(ACTION_CATEGORY, action, context))
            .collect()
    }
}

/// Drops views the `view` policies deny
///
/// Policies receive the [`ViewDefinition`] as candidate and the
/// [`DomainObject`] as context.
pub struct PolicyViewDecorator {
    policy: Arc<dyn PolicyService>,
    inner: Arc<dyn ViewService>,
}

impl PolicyViewDecorator {
    /// Decorate `inner`
    pub fn new(policy: Arc<dyn PolicyService>, inner: Arc<dyn ViewService>) -> Self {
        Self { policy, inner }
    }
}

impl ViewService for PolicyViewDecorator {
    fn get_views(&self, object: &DomainObject) -> Vec<ViewDefinition> {
        self.inner
            .get_views(object)
            .into_iter()
            .filter(|view| self.policy.allow(VIEW_CATEGORY, view, object))
            .collect()
    }
}
