// Copyright 2025 Cowboy AI, LLC.

//! Views (`viewService`)

use crate::core::domain_object::DomainObject;
use crate::framework::ResolvedExtension;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A declared view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    /// View key
    pub key: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Only for objects of this type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_key: Option<String>,

    /// Capabilities the object must have
    #[serde(default)]
    pub needs: Vec<String>,

    /// Whether delegated capabilities satisfy `needs`
    #[serde(default)]
    pub delegation: bool,

    /// Whether the view supports editing
    #[serde(default)]
    pub editable: bool,
}

impl ViewDefinition {
    /// Whether this view can show `object`
    pub fn applies_to(&self, object: &DomainObject) -> bool {
        if let Some(type_key) = &self.type_key {
            let matches = object
                .type_capability()
                .is_some_and(|t| t.instance_of(type_key));
            if !matches {
                return false;
            }
        }
        if self.needs.is_empty() {
            return true;
        }
        let delegation = if self.delegation {
            object.delegation()
        } else {
            None
        };
        self.needs.iter().all(|need| {
            object.has_capability(need)
                || delegation.as_ref().is_some_and(|d| d.does_delegate(need))
        })
    }
}

/// Lists views applicable to an object
pub trait ViewService: Send + Sync {
    /// Views able to show the object
    fn get_views(&self, object: &DomainObject) -> Vec<ViewDefinition>;
}

/// View service over the `views` category
#[derive(Debug, Default)]
pub struct ViewProvider {
    views: Vec<ViewDefinition>,
}

impl ViewProvider {
    /// Build from resolved `views[]` extensions
    pub fn new(extensions: &[ResolvedExtension]) -> Self {
        let views = extensions
            .iter()
            .filter_map(|extension| match extension.definition_as::<ViewDefinition>() {
                Ok(view) if !view.key.is_empty() => Some(view),
                Ok(_) => {
                    warn!(extension = %extension.extension().log_name(), "View without key; skipping");
                    None
                }
                Err(e) => {
                    warn!(extension = %extension.extension().log_name(), error = %e, "Malformed view; skipping");
                    None
                }
            })
            .collect();
        Self { views }
    }

    /// Provider over explicit views
    pub fn from_views(views: Vec<ViewDefinition>) -> Self {
        Self { views }
    }
}

impl ViewService for ViewProvider {
    fn get_views(&self, object: &DomainObject) -> Vec<ViewDefinition> {
        self.views
            .iter()
            .filter(|view| view.applies_to(object))
            .cloned()
            .collect()
    }
}
