// Copyright 2025 Cowboy AI, LLC.

//! Serialized write stream (`persistenceQueue`)
//!
//! Writes run one at a time in the order they were queued. A failed or
//! hung write holds the queue while the dialog service decides whether
//! to retry it; the number of attempts per write is bounded.

use super::dialog::{DialogService, FailureDecision, PersistenceFailure, PersistenceOperation};
use crate::config::QueueConfig;
use crate::errors::{FrameworkResult, PersistenceError};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// FIFO queue of persistence writes
pub struct PersistenceQueue {
    lane: Mutex<()>,
    dialog: Arc<dyn DialogService>,
    debounce: Duration,
    timeout: Option<Duration>,
    max_attempts: u32,
    waiting: AtomicUsize,
}

struct Waiting<'a>(&'a AtomicUsize);

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PersistenceQueue {
    /// Queue resolving failures through `dialog`
    ///
    /// A zero operation timeout disables the timeout.
    pub fn new(dialog: Arc<dyn DialogService>, settings: &QueueConfig) -> Self {
        let timeout = settings.operation_timeout();
        Self {
            lane: Mutex::new(()),
            dialog,
            debounce: settings.debounce(),
            timeout: (!timeout.is_zero()).then_some(timeout),
            max_attempts: settings.max_attempts.max(1),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Writes queued or running
    pub fn len(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Whether nothing is queued or running
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue a write and wait for it to settle
    ///
    /// `action` is called once per attempt. Resolves with the write's own
    /// result, or `Discarded` once the dialog gives up on it or the
    /// attempts run out.
    pub async fn put<F, Fut>(
        &self,
        label: impl Into<String>,
        operation: PersistenceOperation,
        mut action: F,
    ) -> Result<bool, PersistenceError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = FrameworkResult<bool>> + Send,
    {
        let label = label.into();
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let _waiting = Waiting(&self.waiting);
        let _lane = self.lane.lock().await;

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(label = %label, operation = %operation, attempt = attempts, "Running queued write");
            let outcome = match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, action()).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(PersistenceError::Timeout {
                        label: label.clone(),
                        millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    }
                    .into()),
                },
                None => action().await,
            };

            let failure = match outcome {
                Ok(done) => return Ok(done),
                Err(e) => PersistenceFailure {
                    label: label.clone(),
                    operation,
                    attempts,
                    error: e,
                },
            };
            warn!(label = %label, attempt = attempts, error = %failure.error, "Queued write failed");

            if attempts >= self.max_attempts {
                error!(label = %label, attempts = attempts, "Giving up on queued write");
                return Err(discarded(failure));
            }
            match self.dialog.resolve_failure(&failure).await {
                FailureDecision::Retry => info!(label = %label, "Retrying queued write"),
                FailureDecision::Discard => {
                    info!(label = %label, "Queued write discarded");
                    return Err(discarded(failure));
                }
            }
        }
    }
}

fn discarded(failure: PersistenceFailure) -> PersistenceError {
    PersistenceError::Discarded {
        label: failure.label,
        attempts: failure.attempts,
        reason: failure.error.to_string(),
    }
}
