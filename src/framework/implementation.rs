// Copyright 2025 Cowboy AI, LLC.

//! Implementation registry
//!
//! Bundles refer to implementations by source path. The registry maps
//! those bundle-resolved paths to constructors, so wiring is decided
//! explicitly at startup instead of by runtime reflection.

use super::injector::Injection;
use crate::errors::FrameworkResult;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased instance produced by a constructor
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Builds an instance from its injected dependencies
pub type Constructor = Arc<dyn Fn(&Injection) -> FrameworkResult<Instance> + Send + Sync>;

/// Erase a value into an [`Instance`]
///
/// Services are stored as the handle their consumers ask for, e.g.
/// `instance(Arc::new(provider) as Arc<dyn ModelService>)`.
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    Arc::new(value)
}

/// Constructors keyed by implementation path
#[derive(Clone, Default)]
pub struct ImplementationRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ImplementationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a bundle-resolved path
    pub fn register<F>(&mut self, path: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&Injection) -> FrameworkResult<Instance> + Send + Sync + 'static,
    {
        self.constructors.insert(path.into(), Arc::new(constructor));
        self
    }

    /// Constructor for a path
    pub fn get(&self, path: &str) -> Option<Constructor> {
        self.constructors.get(path).cloned()
    }

    /// Whether a path is registered
    pub fn contains(&self, path: &str) -> bool {
        self.constructors.contains_key(path)
    }

    /// Take every constructor from another registry, replacing duplicates
    pub fn extend(&mut self, other: ImplementationRegistry) {
        self.constructors.extend(other.constructors);
    }

    /// Number of registered constructors
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for ImplementationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.constructors.keys().collect();
        paths.sort();
        f.debug_struct("ImplementationRegistry")
            .field("paths", &paths)
            .finish()
    }
}
