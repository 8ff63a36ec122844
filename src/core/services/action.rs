// Copyright 2025 Cowboy AI, LLC.

//! Actions (`actionService`)

use crate::core::domain_object::DomainObject;
use crate::errors::FrameworkResult;
use crate::framework::ResolvedExtension;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Where an action is requested
///
/// `domain_object` is the object the action is performed on behalf of;
/// `selected_object` is a second object involved, such as the object being
/// dropped into a new parent.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    /// Only actions with this key
    pub key: Option<String>,
    /// Only actions in this category
    pub category: Option<String>,
    /// Object acted upon
    pub domain_object: Option<DomainObject>,
    /// Secondary object
    pub selected_object: Option<DomainObject>,
}

impl ActionContext {
    /// Context for an object
    pub fn for_object(object: &DomainObject) -> Self {
        Self {
            domain_object: Some(object.clone()),
            ..Self::default()
        }
    }

    /// Restrict to a key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Restrict to a category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the secondary object
    pub fn with_selected(mut self, selected: &DomainObject) -> Self {
        self.selected_object = Some(selected.clone());
        self
    }
}

/// Declared action properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// Action key
    pub key: String,
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Categories the action is listed under
    pub categories: Vec<String>,
}

impl ActionMetadata {
    fn from_extension(extension: &ResolvedExtension) -> Option<Self> {
        let key = extension.key()?.to_string();
        let text = |field: &str| {
            extension
                .metadata(field)
                .and_then(Value::as_str)
                .map(String::from)
        };
        let categories = match extension.metadata("category") {
            Some(Value::String(category)) => vec![category.clone()],
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        Some(Self {
            key,
            name: text("name"),
            description: text("description"),
            categories,
        })
    }
}

/// A performable action bound to its context
#[async_trait]
pub trait Action: Send + Sync {
    /// Declared properties
    fn metadata(&self) -> &ActionMetadata;

    /// Perform the action; `false` when nothing happened
    async fn perform(&self) -> FrameworkResult<bool>;
}

/// Builds actions for contexts it applies to
pub trait ActionFactory: Send + Sync {
    /// Whether the action makes sense in this context
    fn applies_to(&self, _context: &ActionContext) -> bool {
        true
    }

    /// Bind the action to a context
    fn create(&self, metadata: ActionMetadata, context: &ActionContext) -> Arc<dyn Action>;
}

/// Lists actions available in a context
pub trait ActionService: Send + Sync {
    /// Actions matching the context's key and category that apply to it
    fn get_actions(&self, context: &ActionContext) -> Vec<Arc<dyn Action>>;
}

/// Action service over the `actions` category
pub struct ActionProvider {
    actions: Vec<(ActionMetadata, Arc<dyn ActionFactory>)>,
}

impl ActionProvider {
    /// Build from resolved `actions[]` extensions
    pub fn new(extensions: &[ResolvedExtension]) -> FrameworkResult<Self> {
        let mut actions = Vec::new();
        for extension in extensions {
            let Some(metadata) = ActionMetadata::from_extension(extension) else {
                warn!(extension = %extension.extension().log_name(), "Action without key; skipping");
                continue;
            };
            if !extension.has_implementation() {
                warn!(extension = %extension.extension().log_name(), "Action without implementation; skipping");
                continue;
            }
            actions.push((metadata, extension.implementation::<Arc<dyn ActionFactory>>()?));
        }
        Ok(Self { actions })
    }

    /// Provider over explicit factories
    pub fn from_factories(actions: Vec<(ActionMetadata, Arc<dyn ActionFactory>)>) -> Self {
        Self { actions }
    }
}

impl ActionService for ActionProvider {
    fn get_actions(&self, context: &ActionContext) -> Vec<Arc<dyn Action>> {
        self.actions
            .iter()
            .filter(|(metadata, _)| context.key.as_ref().map_or(true, |k| *k == metadata.key))
            .filter(|(metadata, _)| {
                context
                    .category
                    .as_ref()
                    .map_or(true, |c| metadata.categories.contains(c))
            })
            .filter(|(_, factory)| factory.applies_to(context))
            .map(|(metadata, factory)| factory.create(metadata.clone(), context))
            .collect()
    }
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.metadata().key)
    }
}
