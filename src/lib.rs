// Copyright 2025 Cowboy AI, LLC.

//! # CIM Capability
//!
//! Extension composition, capability-based domain objects and
//! transactional persistence for the Composable Information Machine.
//!
//! The crate is organised around a few building blocks:
//! - **Bundles**: Declarative units contributing extensions by category
//! - **Composition**: Services assembled from providers, aggregators and decorators by priority
//! - **Domain Objects**: Identified JSON models whose behaviour comes from capabilities
//! - **Policies**: Pluggable allow/deny decisions consulted before actions, views and composition
//! - **Transactions**: Deferred writes committed in order or discarded on cancel
//! - **Persistence Queue**: Serialized writes with user-mediated retry
//! - **Entanglement**: Objects linked, moved or copied between containers
//!
//! ## Getting started
//!
//! ```no_run
//! use cim_capability::Platform;
//!
//! # async fn run() -> cim_capability::FrameworkResult<()> {
//! let platform = Platform::builder().build()?;
//! if let Some(root) = platform.root().await? {
//!     println!("root has {} children", root.composition().map(|c| c.ids().len()).unwrap_or(0));
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod entanglement;
pub mod errors;
pub mod framework;
pub mod identifiers;
pub mod persistence;
pub mod platform;
pub mod policy;
pub mod transaction;

pub use config::FrameworkConfig;
pub use core::{Capability, CapabilityFactory, CapabilityService, DomainObject};
pub use errors::{
    CapabilityError, CompositionError, FrameworkError, FrameworkResult, PersistenceError,
    PolicyDenial, TransactionError,
};
pub use framework::{
    Bundle, BundleDefinition, ExtensionDefinition, ExtensionRegistry, ImplementationRegistry,
    Injector, Priority,
};
pub use identifiers::Identifier;
pub use platform::{Platform, PlatformBuilder};
