// Copyright 2025 Cowboy AI, LLC.

//! Transactions and edit sessions
//!
//! While an edit session is open, persistence is buffered in a
//! transaction; saving commits it, cancelling discards it and restores
//! every touched model.

pub mod bundle;
mod decorator;
mod editor;
mod manager;
mod service;

pub use decorator::{TransactionCapabilityDecorator, TransactionalMutation, TransactionalPersistence};
pub use editor::{EditorCapability, EditorFactory};
pub use manager::TransactionManager;
pub use service::{CancelFn, CommitFn, CommitReport, EntryHandle, TransactionService};
