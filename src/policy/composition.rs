// Copyright 2025 Cowboy AI, LLC.

//! Rules for what may be placed in a composition

use super::service::Policy;
use crate::core::services::TypeService;
use crate::core::DomainObject;
use std::any::Any;
use std::sync::Arc;

/// Policy category consulted before adding a child to a parent
pub const COMPOSITION_CATEGORY: &str = "composition";

/// Allows a child into a parent when the parent can hold a composition and
/// its type's `contains` list, if any, names the child's type
///
/// Candidate: the child [`DomainObject`]. Context: the parent [`DomainObject`].
pub struct CompositionPolicy {
    types: Arc<TypeService>,
}

impl CompositionPolicy {
    /// Policy reading type definitions from `types`
    pub fn new(types: Arc<TypeService>) -> Self {
        Self { types }
    }
}

impl Policy for CompositionPolicy {
    fn allow(&self, candidate: &dyn Any, context: &dyn Any) -> bool {
        let (Some(child), Some(parent)) = (
            candidate.downcast_ref::<DomainObject>(),
            context.downcast_ref::<DomainObject>(),
        ) else {
            return true;
        };
        if child.same_as(parent) {
            return false;
        }

        let parent_type = parent.model_str("type").and_then(|t| self.types.get_type(&t));
        let holds_composition = match &parent_type {
            Some(definition) => definition.holds_composition() || parent.has_capability("composition"),
            None => parent.has_capability("composition"),
        };
        if !holds_composition {
            return false;
        }
        parent_type.map_or(true, |definition| {
            definition.may_contain(child.model_str("type").as_deref())
        })
    }
}
