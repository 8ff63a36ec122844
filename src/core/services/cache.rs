// Copyright 2025 Cowboy AI, LLC.

//! Shared model cache (`cacheService`)
//!
//! Objects built for the same id share one model handle while it stays
//! cached, so a mutation through one object is seen by all of them.

use crate::core::domain_object::{model_handle, ModelHandle};
use crate::core::services::model::is_placeholder;
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use std::num::NonZeroUsize;
use tracing::debug;

/// Bounded cache of model handles keyed by object id
pub struct ModelCache {
    entries: Mutex<LruCache<String, ModelHandle>>,
}

impl ModelCache {
    /// Cache holding at most `capacity` models
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached handle
    pub fn get(&self, id: &str) -> Option<ModelHandle> {
        self.entries.lock().get(id).cloned()
    }

    /// Snapshot of a cached model
    pub fn model(&self, id: &str) -> Option<Value> {
        self.get(id).map(|handle| handle.read().clone())
    }

    /// Whether an id is cached
    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains(id)
    }

    /// Existing handle for `id`, or a new cached one holding `model`
    ///
    /// Placeholder models get a detached handle and are never cached.
    pub fn attach(&self, id: &str, model: Value) -> ModelHandle {
        if is_placeholder(&model) {
            return model_handle(model);
        }
        let mut entries = self.entries.lock();
        if let Some(handle) = entries.get(id) {
            return handle.clone();
        }
        let handle = model_handle(model);
        entries.put(id.to_string(), handle.clone());
        handle
    }

    /// Store `model`, writing through any existing handle
    pub fn put(&self, id: &str, model: Value) -> ModelHandle {
        if is_placeholder(&model) {
            return model_handle(model);
        }
        let mut entries = self.entries.lock();
        if let Some(handle) = entries.get(id) {
            *handle.write() = model;
            return handle.clone();
        }
        let handle = model_handle(model);
        entries.put(id.to_string(), handle.clone());
        handle
    }

    /// Forget a cached model
    pub fn invalidate(&self, id: &str) -> bool {
        let removed = self.entries.lock().pop(id).is_some();
        if removed {
            debug!(id = %id, "Invalidated cached model");
        }
        removed
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
