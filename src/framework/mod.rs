// Copyright 2025 Cowboy AI, LLC.

//! Extension framework
//!
//! Bundles contribute extensions by category. The registry indexes them,
//! and the injector composes named services from provider, aggregator and
//! decorator components at startup.

mod bundle;
mod extension;
mod implementation;
mod injector;
mod loader;
mod priority;
mod registry;

pub use bundle::{Bundle, BundleDefinition};
pub use extension::{ComponentKind, Extension, ExtensionDefinition};
pub use implementation::{instance, Constructor, ImplementationRegistry, Instance};
pub use injector::{
    Injected, Injection, Injector, Lazy, ResolvedExtension, CONSTANTS, INJECTOR, RUNS,
};
pub use loader::{BundleLoader, BUNDLE_FILE};
pub use priority::{Priority, PrioritySpec};
pub use registry::ExtensionRegistry;
