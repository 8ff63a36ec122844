// Copyright 2025 Cowboy AI, LLC.

//! Domain objects, capabilities and the services behind them

pub mod bundle;
pub mod capabilities;
mod capability;
mod domain_object;
pub mod services;

pub use capability::{Capability, CapabilityFactory, CapabilityService, CoreCapabilityService, Invoked};
pub use domain_object::{model_handle, DomainObject, ModelHandle};
