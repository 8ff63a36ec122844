// Copyright 2025 Cowboy AI, LLC.

//! Persistence providers (`persistenceService`)
//!
//! The persistence service is the opaque backing store behind the
//! persistence capability. Providers serve one or more spaces; the
//! aggregator routes each call to the provider owning the space.

use crate::errors::{FrameworkError, FrameworkResult, PersistenceError};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Backing store for object models
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Spaces this service can store to
    async fn list_spaces(&self) -> FrameworkResult<Vec<String>>;

    /// Keys stored in a space
    async fn list_objects(&self, space: &str) -> FrameworkResult<Vec<String>>;

    /// Store a new object
    async fn create_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool>;

    /// Read an object; `None` when absent
    async fn read_object(&self, space: &str, key: &str) -> FrameworkResult<Option<Value>>;

    /// Replace an existing object
    async fn update_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool>;

    /// Delete an object; `false` when it was absent
    async fn delete_object(&self, space: &str, key: &str) -> FrameworkResult<bool>;
}

/// In-process store serving a fixed set of spaces
#[derive(Debug, Default)]
pub struct InMemoryPersistenceProvider {
    spaces: RwLock<IndexMap<String, HashMap<String, Value>>>,
}

impl InMemoryPersistenceProvider {
    /// Store serving the given spaces
    pub fn new<I, S>(spaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            spaces: RwLock::new(
                spaces
                    .into_iter()
                    .map(|s| (s.into(), HashMap::new()))
                    .collect(),
            ),
        }
    }

    fn unknown(space: &str) -> PersistenceError {
        PersistenceError::UnknownSpace(space.to_string())
    }
}

#[async_trait]
impl PersistenceService for InMemoryPersistenceProvider {
    async fn list_spaces(&self) -> FrameworkResult<Vec<String>> {
        Ok(self.spaces.read().keys().cloned().collect())
    }

    async fn list_objects(&self, space: &str) -> FrameworkResult<Vec<String>> {
        let spaces = self.spaces.read();
        let objects = spaces.get(space).ok_or_else(|| Self::unknown(space))?;
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn create_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool> {
        let mut spaces = self.spaces.write();
        let objects = spaces.get_mut(space).ok_or_else(|| Self::unknown(space))?;
        if objects.contains_key(key) {
            return Err(PersistenceError::AlreadyExists {
                space: space.to_string(),
                key: key.to_string(),
            }
            .into());
        }
        objects.insert(key.to_string(), model.clone());
        debug!(space = %space, key = %key, "Created object");
        Ok(true)
    }

    async fn read_object(&self, space: &str, key: &str) -> FrameworkResult<Option<Value>> {
        let spaces = self.spaces.read();
        let objects = spaces.get(space).ok_or_else(|| Self::unknown(space))?;
        Ok(objects.get(key).cloned())
    }

    async fn update_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool> {
        let mut spaces = self.spaces.write();
        let objects = spaces.get_mut(space).ok_or_else(|| Self::unknown(space))?;
        match objects.get_mut(key) {
            Some(stored) => {
                *stored = model.clone();
                debug!(space = %space, key = %key, "Updated object");
                Ok(true)
            }
            None => Err(PersistenceError::NotFound {
                space: space.to_string(),
                key: key.to_string(),
            }
            .into()),
        }
    }

    async fn delete_object(&self, space: &str, key: &str) -> FrameworkResult<bool> {
        let mut spaces = self.spaces.write();
        let objects = spaces.get_mut(space).ok_or_else(|| Self::unknown(space))?;
        Ok(objects.remove(key).is_some())
    }
}

/// Routes calls to the provider serving each space
///
/// Routes are computed on first use; when two providers claim a space the
/// higher-priority one keeps it.
pub struct PersistenceAggregator {
    providers: Vec<Arc<dyn PersistenceService>>,
    routes: OnceCell<IndexMap<String, usize>>,
}

impl PersistenceAggregator {
    /// Aggregate providers, highest priority first
    pub fn new(providers: Vec<Arc<dyn PersistenceService>>) -> Self {
        Self {
            providers,
            routes: OnceCell::new(),
        }
    }

    async fn routes(&self) -> FrameworkResult<&IndexMap<String, usize>> {
        self.routes
            .get_or_try_init(|| async {
                let mut routes = IndexMap::new();
                for (index, provider) in self.providers.iter().enumerate() {
                    for space in provider.list_spaces().await? {
                        if routes.contains_key(&space) {
                            warn!(space = %space, "Space served by several providers; keeping the first");
                        } else {
                            routes.insert(space, index);
                        }
                    }
                }
                Ok::<_, FrameworkError>(routes)
            })
            .await
    }

    async fn provider(&self, space: &str) -> FrameworkResult<&Arc<dyn PersistenceService>> {
        let index = *self
            .routes()
            .await?
            .get(space)
            .ok_or_else(|| PersistenceError::UnknownSpace(space.to_string()))?;
        Ok(&self.providers[index])
    }
}

#[async_trait]
impl PersistenceService for PersistenceAggregator {
    async fn list_spaces(&self) -> FrameworkResult<Vec<String>> {
        Ok(self.routes().await?.keys().cloned().collect())
    }

    async fn list_objects(&self, space: &str) -> FrameworkResult<Vec<String>> {
        self.provider(space).await?.list_objects(space).await
    }

    async fn create_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool> {
        self.provider(space).await?.create_object(space, key, model).await
    }

    async fn read_object(&self, space: &str, key: &str) -> FrameworkResult<Option<Value>> {
        self.provider(space).await?.read_object(space, key).await
    }

    async fn update_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool> {
        self.provider(space).await?.update_object(space, key, model).await
    }

    async fn delete_object(&self, space: &str, key: &str) -> FrameworkResult<bool> {
        self.provider(space).await?.delete_object(space, key).await
    }
}
