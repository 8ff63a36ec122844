// Copyright 2025 Cowboy AI, LLC.

//! Extension registry
//!
//! Explicit, process-scoped context holding every extension contributed by
//! registered bundles. Nothing here is global; a registry is built at
//! startup and handed to the injector.

use super::bundle::Bundle;
use super::extension::{ComponentKind, Extension};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of extensions, indexed by category
#[derive(Debug, Default, Clone)]
pub struct ExtensionRegistry {
    categories: IndexMap<String, Vec<Arc<Extension>>>,
    bundles: Vec<String>,
    sequence: usize,
}

impl ExtensionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every extension a bundle declares
    pub fn register_bundle(&mut self, bundle: &Bundle) {
        let log_name = bundle.log_name();
        debug!(bundle = %log_name, "Registering bundle");

        for category in bundle.categories() {
            for definition in bundle.extensions(category) {
                let implementation_path = definition
                    .implementation
                    .as_deref()
                    .map(|path| bundle.source_path(Some(path)));
                let extension = Extension::new(
                    log_name.clone(),
                    category.to_string(),
                    implementation_path,
                    definition.clone(),
                    self.sequence,
                );
                self.sequence += 1;
                self.categories
                    .entry(category.to_string())
                    .or_default()
                    .push(Arc::new(extension));
            }
        }
        self.bundles.push(log_name);
    }

    /// Log names of registered bundles, in registration order
    pub fn bundles(&self) -> &[String] {
        &self.bundles
    }

    /// Non-component extensions of a category, sorted by priority then declaration
    pub fn extensions(&self, category: &str) -> Vec<Arc<Extension>> {
        let mut found: Vec<Arc<Extension>> = self
            .categories
            .get(category)
            .map(|all| {
                all.iter()
                    .filter(|e| e.component_kind().is_none())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort(&mut found);
        found
    }

    /// Components contributing to a service, sorted by priority then declaration
    pub fn components(&self, service: &str) -> Vec<Arc<Extension>> {
        let mut found: Vec<Arc<Extension>> = self
            .categories
            .values()
            .flatten()
            .filter(|e| e.component_kind().is_some() && e.provided_service() == service)
            .cloned()
            .collect();
        sort(&mut found);
        found
    }

    /// Components of one kind contributing to a service
    pub fn components_of(&self, service: &str, kind: ComponentKind) -> Vec<Arc<Extension>> {
        self.components(service)
            .into_iter()
            .filter(|e| e.component_kind() == Some(kind))
            .collect()
    }

    /// Every service name with at least one component, in first-declaration order
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for extension in self.categories.values().flatten() {
            if extension.component_kind().is_some() {
                let service = extension.provided_service().to_string();
                if !names.contains(&service) {
                    names.push(service);
                }
            }
        }
        names
    }

    /// Whether a category has any extensions at all
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Find a non-component extension by category and key
    pub fn find(&self, category: &str, key: &str) -> Option<Arc<Extension>> {
        self.extensions(category)
            .into_iter()
            .find(|e| e.key() == Some(key))
    }
}

fn sort(extensions: &mut [Arc<Extension>]) {
    extensions.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then(a.sequence().cmp(&b.sequence()))
    });
}
