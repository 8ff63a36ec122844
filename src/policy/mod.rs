// Copyright 2025 Cowboy AI, LLC.

//! Policies and the decorators that consult them

pub mod bundle;
mod composition;
mod decorators;
mod service;

pub use composition::{CompositionPolicy, COMPOSITION_CATEGORY};
pub use decorators::{PolicyActionDecorator, PolicyViewDecorator, ACTION_CATEGORY, VIEW_CATEGORY};
pub use service::{Policy, PolicyProvider, PolicyService};
