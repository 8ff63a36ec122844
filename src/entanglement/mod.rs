// Copyright 2025 Cowboy AI, LLC.

//! Objects in more than one place
//!
//! An object has one primary location and may be linked into any number
//! of other parents. This module tells the two apart and implements
//! link, move and copy under policy control.

mod actions;
pub mod bundle;
mod location;
mod policy;
mod services;

pub use actions::{ComposeActionFactory, RemoveActionFactory};
pub use location::{LocationCapability, LocationFactory};
pub use policy::CrossSpacePolicy;
pub use services::{
    CopyService, EntanglementOperation, EntanglementRequest, EntanglementService, LinkService,
    MoveService, ENTANGLEMENT_CATEGORY,
};
