// Copyright 2025 Cowboy AI, LLC.

//! Model loading (`modelService`)
//!
//! Composition of the model service in the core bundle:
//! - providers: [`PersistedModelProvider`], [`StaticModelProvider`]
//! - aggregator: [`ModelAggregator`], keeping the most recently modified model
//! - decorators: [`CachingModelDecorator`] (mandatory) and
//!   [`MissingModelDecorator`] (fallback)

use super::cache::ModelCache;
use super::identifier::IdentifierService;
use super::persistence::PersistenceService;
use crate::core::capabilities::now_millis;
use crate::errors::{FrameworkError, FrameworkResult, PersistenceError};
use crate::framework::ResolvedExtension;
use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Models by object id
pub type Models = IndexMap<String, Value>;

/// Loads models for object ids
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Models for the ids that could be found
    async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models>;
}

const PLACEHOLDER_TYPE: &str = "unknown";

/// Model standing in for an object that could not be loaded
pub fn placeholder(id: &str) -> Value {
    json!({
        "type": PLACEHOLDER_TYPE,
        "name": format!("Missing: {id}")
    })
}

/// Whether a model is a stand-in from [`placeholder`]
pub fn is_placeholder(model: &Value) -> bool {
    model.get("type").and_then(Value::as_str) == Some(PLACEHOLDER_TYPE)
}

fn modified(model: &Value) -> Option<i64> {
    model.get("modified").and_then(Value::as_i64)
}

/// Models read from the persistence service
pub struct PersistedModelProvider {
    persistence: Arc<dyn PersistenceService>,
    identifiers: Arc<IdentifierService>,
}

impl PersistedModelProvider {
    /// Provider over a persistence service
    pub fn new(persistence: Arc<dyn PersistenceService>, identifiers: Arc<IdentifierService>) -> Self {
        Self {
            persistence,
            identifiers,
        }
    }

    async fn load(&self, id: &str) -> Option<Value> {
        let identifier = self.identifiers.parse(id);
        let space = self.identifiers.space_of(&identifier);
        match self.persistence.read_object(&space, identifier.key()).await {
            Ok(Some(mut model)) => {
                if let Value::Object(fields) = &mut model {
                    if !fields.contains_key("persisted") {
                        let stamp = fields
                            .get("modified")
                            .and_then(Value::as_i64)
                            .unwrap_or_else(now_millis);
                        fields.insert("persisted".to_string(), json!(stamp));
                    }
                }
                Some(model)
            }
            Ok(None) => None,
            Err(FrameworkError::Persistence(PersistenceError::UnknownSpace(space))) => {
                debug!(id = %id, space = %space, "No persistence for space");
                None
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to read model");
                None
            }
        }
    }
}

#[async_trait]
impl ModelService for PersistedModelProvider {
    async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models> {
        let loaded = join_all(ids.iter().map(|id| self.load(id))).await;
        Ok(ids
            .iter()
            .zip(loaded)
            .filter_map(|(id, model)| model.map(|m| (id.clone(), m)))
            .collect())
    }
}

/// Models declared by bundles in the `models` category
#[derive(Debug, Default)]
pub struct StaticModelProvider {
    models: Models,
}

impl StaticModelProvider {
    /// Provider from resolved `models[]` extensions (`key` = id, `model` = model)
    pub fn new(extensions: &[ResolvedExtension]) -> Self {
        let mut models = Models::new();
        for extension in extensions {
            match (extension.key(), extension.metadata("model")) {
                (Some(id), Some(model)) => {
                    if !models.contains_key(id) {
                        models.insert(id.to_string(), model.clone());
                    }
                }
                _ => warn!(
                    extension = %extension.extension().log_name(),
                    "Static model needs key and model; skipping"
                ),
            }
        }
        Self { models }
    }

    /// Provider over explicit models
    pub fn from_models(models: Models) -> Self {
        Self { models }
    }
}

#[async_trait]
impl ModelService for StaticModelProvider {
    async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models> {
        Ok(ids
            .iter()
            .filter_map(|id| self.models.get(id).map(|m| (id.clone(), m.clone())))
            .collect())
    }
}

/// Merges providers, preferring the most recently modified model
///
/// Ties go to the higher-priority provider.
pub struct ModelAggregator {
    providers: Vec<Arc<dyn ModelService>>,
}

impl ModelAggregator {
    /// Aggregate providers, highest priority first
    pub fn new(providers: Vec<Arc<dyn ModelService>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ModelService for ModelAggregator {
    async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models> {
        let results = join_all(self.providers.iter().map(|p| p.get_models(ids))).await;
        let mut merged = Models::new();
        for result in results {
            for (id, model) in result? {
                let newer = match merged.get(&id) {
                    Some(existing) => modified(&model).unwrap_or(i64::MIN) > modified(existing).unwrap_or(i64::MIN),
                    None => true,
                };
                if newer {
                    merged.insert(id, model);
                }
            }
        }
        Ok(ids
            .iter()
            .filter_map(|id| merged.shift_remove(id).map(|m| (id.clone(), m)))
            .collect())
    }
}

/// Serves cached models and caches whatever it loads
pub struct CachingModelDecorator {
    cache: Arc<ModelCache>,
    inner: Arc<dyn ModelService>,
}

impl CachingModelDecorator {
    /// Decorate `inner` with `cache`
    pub fn new(cache: Arc<ModelCache>, inner: Arc<dyn ModelService>) -> Self {
        Self { cache, inner }
    }
}

#[async_trait]
impl ModelService for CachingModelDecorator {
    async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models> {
        let uncached: Vec<String> = ids
            .iter()
            .filter(|id| !self.cache.contains(id))
            .cloned()
            .collect();
        let mut loaded = if uncached.is_empty() {
            Models::new()
        } else {
            self.inner.get_models(&uncached).await?
        };
        for (id, model) in &loaded {
            self.cache.attach(id, model.clone());
        }

        let mut models = Models::new();
        for id in ids {
            if let Some(model) = self.cache.model(id).or_else(|| loaded.shift_remove(id)) {
                models.insert(id.clone(), model);
            }
        }
        Ok(models)
    }
}

/// Fills in placeholders for ids nothing could load
pub struct MissingModelDecorator {
    inner: Arc<dyn ModelService>,
}

impl MissingModelDecorator {
    /// Decorate `inner`
    pub fn new(inner: Arc<dyn ModelService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ModelService for MissingModelDecorator {
    async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models> {
        let mut found = self.inner.get_models(ids).await?;
        Ok(ids
            .iter()
            .map(|id| {
                let model = found.shift_remove(id).unwrap_or_else(|| placeholder(id));
                (id.clone(), model)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::persistence::InMemoryPersistenceProvider;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        inner: StaticModelProvider,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelService for Counting {
        async fn get_models(&self, ids: &[String]) -> FrameworkResult<Models> {
            self.calls.fetch_add(ids.len(), Ordering::SeqCst);
            self.inner.get_models(ids).await
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn models(entries: Vec<(&str, Value)>) -> Models {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[tokio::test]
    async fn test_aggregator_prefers_latest_modified() {
        let older: Arc<dyn ModelService> = Arc::new(StaticModelProvider::from_models(models(vec![
            ("a", json!({"modified": 10, "name": "old"})),
            ("b", json!({"name": "only"})),
        ])));
        let newer: Arc<dyn ModelService> = Arc::new(StaticModelProvider::from_models(models(vec![
            ("a", json!({"modified": 20, "name": "new"})),
        ])));
        let aggregator = ModelAggregator::new(vec![older, newer]);

        let result = aggregator.get_models(&ids(&["b", "a", "c"])).await.unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(result["a"]["name"], "new");
    }

    #[tokio::test]
    async fn test_persisted_models_gain_persisted_stamp() {
        let store = Arc::new(InMemoryPersistenceProvider::new(["mct"]));
        store
            .create_object("mct", "a", &json!({"modified": 42}))
            .await
            .unwrap();
        let provider = PersistedModelProvider::new(store, Arc::new(IdentifierService::new("mct")));

        let result = provider
            .get_models(&ids(&["mct:a", "a", "lab:a", "mct:none"]))
            .await
            .unwrap();
        assert_eq!(result["mct:a"], json!({"modified": 42, "persisted": 42}));
        assert_eq!(result["a"], json!({"modified": 42, "persisted": 42}));
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_caching_and_missing_decorators() {
        let counting = Arc::new(Counting {
            inner: StaticModelProvider::from_models(models(vec![("a", json!({"name": "A"}))])),
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(ModelCache::new(16));
        let service = CachingModelDecorator::new(
            cache.clone(),
            Arc::new(MissingModelDecorator::new(counting.clone())),
        );

        let first = service.get_models(&ids(&["a", "gone"])).await.unwrap();
        assert_eq!(first["a"], json!({"name": "A"}));
        assert!(is_placeholder(&first["gone"]));
        assert!(cache.contains("a"));
        assert!(!cache.contains("gone"));

        service.get_models(&ids(&["a", "gone"])).await.unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
    }
}
