// Copyright 2025 Cowboy AI, LLC.

//! Failure resolution for queued writes (`dialogService`)

use crate::errors::FrameworkError;
use async_trait::async_trait;
use std::fmt;
use tracing::warn;

/// Kind of queued write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistenceOperation {
    /// Create or update the stored model
    Persist,
    /// Delete the stored model
    Remove,
}

impl fmt::Display for PersistenceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceOperation::Persist => write!(f, "persist"),
            PersistenceOperation::Remove => write!(f, "remove"),
        }
    }
}

/// A queued write that failed
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceFailure {
    /// Queue entry label
    pub label: String,
    /// What was being written
    pub operation: PersistenceOperation,
    /// Attempts made so far
    pub attempts: u32,
    /// Why the last attempt failed
    pub error: FrameworkError,
}

/// What to do about a failed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    /// Run the write again
    Retry,
    /// Give up on the write and move on
    Discard,
}

/// Asks someone whether a failed write should be retried
///
/// The queue holds every later write until this returns.
#[async_trait]
pub trait DialogService: Send + Sync {
    /// Decide the fate of a failed write
    async fn resolve_failure(&self, failure: &PersistenceFailure) -> FailureDecision;
}

/// Dialog for processes with nobody to ask: logs and discards
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessDialogService;

#[async_trait]
impl DialogService for HeadlessDialogService {
    async fn resolve_failure(&self, failure: &PersistenceFailure) -> FailureDecision {
        warn!(
            label = %failure.label,
            operation = %failure.operation,
            attempts = failure.attempts,
            error = %failure.error,
            "Discarding failed write; no dialog available"
        );
        FailureDecision::Discard
    }
}
