// Copyright 2025 Cowboy AI, LLC.

//! Persistence queue
//!
//! Serializes writes to the backing store and hands failures to a
//! dialog service instead of dropping them.

pub mod bundle;
mod decorator;
mod dialog;
mod queue;

pub use decorator::{QueuedPersistence, QueuingCapabilityDecorator};
pub use dialog::{
    DialogService, FailureDecision, HeadlessDialogService, PersistenceFailure, PersistenceOperation,
};
pub use queue::PersistenceQueue;
