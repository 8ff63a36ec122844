// Copyright 2025 Cowboy AI, LLC.

//! Transactions (`transactionService`)
//!
//! A transaction is an ordered list of deferred writes. Commit runs them
//! one at a time in insertion order and stops at the first failure;
//! cancel runs every cancel callback and performs no I/O.
//!
//! Starting a transaction while one is active nests it: only the commit
//! matching the outermost start runs the entries. Cancel at any depth
//! discards the whole transaction.

use crate::errors::{FrameworkResult, TransactionError};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use tracing::{debug, error, info};

/// Deferred write run at commit
pub type CommitFn = Box<dyn FnOnce() -> BoxFuture<'static, FrameworkResult<()>> + Send>;

/// Callback run when the transaction is cancelled
pub type CancelFn = Box<dyn FnOnce() + Send>;

/// Handle to a queued entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(u64);

struct Entry {
    handle: EntryHandle,
    label: String,
    commit: Option<CommitFn>,
    cancel: Option<CancelFn>,
}

#[derive(Default)]
struct State {
    depth: usize,
    generation: u64,
    next_handle: u64,
    entries: Vec<Entry>,
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Labels of the entries that ran, in order
    pub committed: Vec<String>,
    /// Whether this commit only closed a nested start
    pub nested: bool,
}

/// Buffers writes while editing
#[derive(Default)]
pub struct TransactionService {
    state: Mutex<State>,
}

impl TransactionService {
    /// Service with no active transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Start, or nest into, a transaction; returns the new depth
    pub fn start_transaction(&self) -> usize {
        let mut state = self.state.lock();
        if state.depth == 0 {
            state.generation += 1;
            info!(generation = state.generation, "Transaction started");
        }
        state.depth += 1;
        state.depth
    }

    /// Whether a transaction is active
    pub fn is_active(&self) -> bool {
        self.state.lock().depth > 0
    }

    /// Nesting depth
    pub fn depth(&self) -> usize {
        self.state.lock().depth
    }

    /// Counter incremented by every outermost start
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Number of queued entries
    pub fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn push(
        &self,
        label: String,
        commit: Option<CommitFn>,
        cancel: Option<CancelFn>,
    ) -> Result<EntryHandle, TransactionError> {
        let mut state = self.state.lock();
        if state.depth == 0 {
            return Err(TransactionError::NoActiveTransaction);
        }
        let handle = EntryHandle(state.next_handle);
        state.next_handle += 1;
        debug!(label = %label, position = state.entries.len(), "Queued transaction entry");
        state.entries.push(Entry {
            handle,
            label,
            commit,
            cancel,
        });
        Ok(handle)
    }

    /// Queue a write, with an optional callback for cancel
    pub fn add_to_transaction<C, Fut>(
        &self,
        label: impl Into<String>,
        commit: C,
        cancel: Option<CancelFn>,
    ) -> Result<EntryHandle, TransactionError>
    where
        C: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = FrameworkResult<()>> + Send + 'static,
    {
        self.push(label.into(), Some(Box::new(move || commit().boxed())), cancel)
    }

    /// Queue a callback that only runs on cancel
    pub fn on_cancel(&self, label: impl Into<String>, cancel: CancelFn) -> Result<EntryHandle, TransactionError> {
        self.push(label.into(), None, Some(cancel))
    }

    /// Drop an entry without running either callback
    pub fn release(&self, handle: EntryHandle) -> bool {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|e| e.handle != handle);
        state.entries.len() != before
    }

    /// Drop an entry but hand back its cancel callback
    ///
    /// `None` when the entry is gone or had no cancel callback.
    pub fn take_cancel(&self, handle: EntryHandle) -> Option<CancelFn> {
        let mut state = self.state.lock();
        let position = state.entries.iter().position(|e| e.handle == handle)?;
        state.entries.remove(position).cancel
    }

    /// Close the current start; the outermost one runs every write in order
    ///
    /// Fails fast: the first failing write stops the commit and later
    /// writes never run. Writes that already ran are not rolled back.
    pub async fn commit(&self) -> Result<CommitReport, TransactionError> {
        let entries = {
            let mut state = self.state.lock();
            if state.depth == 0 {
                return Err(TransactionError::NoActiveTransaction);
            }
            state.depth -= 1;
            if state.depth > 0 {
                debug!(depth = state.depth, "Closed nested transaction");
                return Ok(CommitReport {
                    committed: Vec::new(),
                    nested: true,
                });
            }
            std::mem::take(&mut state.entries)
        };

        let writes: Vec<(String, CommitFn)> = entries
            .into_iter()
            .filter_map(|e| e.commit.map(|commit| (e.label, commit)))
            .collect();
        let total = writes.len();
        let mut committed = Vec::with_capacity(total);
        let mut remaining = writes.into_iter();

        while let Some((label, commit)) = remaining.next() {
            if let Err(e) = commit().await {
                let not_run: Vec<String> = remaining.map(|(label, _)| label).collect();
                error!(
                    failed = %label,
                    committed = committed.len(),
                    not_run = not_run.len(),
                    error = %e,
                    "Transaction commit failed"
                );
                return Err(TransactionError::CommitFailed {
                    committed,
                    failed: label,
                    not_run,
                    reason: e.to_string(),
                });
            }
            committed.push(label);
        }

        info!(entries = total, "Transaction committed");
        Ok(CommitReport {
            committed,
            nested: false,
        })
    }

    /// Discard the transaction at any depth; returns the number of entries dropped
    ///
    /// Cancel callbacks run once each, most recent first.
    pub fn cancel(&self) -> Result<usize, TransactionError> {
        let entries = {
            let mut state = self.state.lock();
            if state.depth == 0 {
                return Err(TransactionError::NoActiveTransaction);
            }
            state.depth = 0;
            std::mem::take(&mut state.entries)
        };
        let count = entries.len();
        for entry in entries.into_iter().rev() {
            if let Some(cancel) = entry.cancel {
                cancel();
            }
        }
        info!(entries = count, "Transaction cancelled");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PersistenceError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str, bool) -> CommitFn) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &str, ok: bool| -> CommitFn {
            let sink = sink.clone();
            let label = label.to_string();
            Box::new(move || {
                async move {
                    sink.lock().push(label.clone());
                    if ok {
                        Ok(())
                    } else {
                        Err(PersistenceError::Storage(format!("{label} failed")).into())
                    }
                }
                .boxed()
            })
        };
        (log, make)
    }

    #[tokio::test]
    async fn test_commit_is_fifo_and_fail_fast() {
        let service = TransactionService::new();
        let (log, make) = recorder();
        service.start_transaction();
        for (label, ok) in [("m1", true), ("m2", false), ("m3", true)] {
            let commit = make(label, ok);
            service.add_to_transaction(label, commit, None).unwrap();
        }

        let err = service.commit().await.unwrap_err();

        assert_eq!(*log.lock(), vec!["m1", "m2"]);
        assert_eq!(
            err,
            TransactionError::CommitFailed {
                committed: vec!["m1".to_string()],
                failed: "m2".to_string(),
                not_run: vec!["m3".to_string()],
                reason: "Storage error: m2 failed".to_string(),
            }
        );
        assert!(!service.is_active());
        assert_eq!(service.size(), 0);
    }

    #[tokio::test]
    async fn test_cancel_runs_each_cancel_once_and_nothing_else() {
        let service = TransactionService::new();
        let (log, make) = recorder();
        let cancelled = Arc::new(AtomicUsize::new(0));
        service.start_transaction();
        for i in 0..4 {
            let counter = cancelled.clone();
            service
                .add_to_transaction(
                    format!("m{i}"),
                    make("write", true),
                    Some(Box::new(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })),
                )
                .unwrap();
        }

        assert_eq!(service.cancel().unwrap(), 4);
        assert_eq!(cancelled.load(Ordering::SeqCst), 4);
        assert!(log.lock().is_empty());
        assert_eq!(service.cancel(), Err(TransactionError::NoActiveTransaction));
    }

    #[tokio::test]
    async fn test_nested_start_commits_once() {
        let service = TransactionService::new();
        let (log, make) = recorder();
        assert_eq!(service.start_transaction(), 1);
        assert_eq!(service.start_transaction(), 2);
        let generation = service.generation();
        service.add_to_transaction("a", make("a", true), None).unwrap();

        let inner = service.commit().await.unwrap();
        assert!(inner.nested);
        assert!(log.lock().is_empty());
        assert!(service.is_active());

        let outer = service.commit().await.unwrap();
        assert_eq!(outer.committed, vec!["a"]);
        assert_eq!(*log.lock(), vec!["a"]);

        service.start_transaction();
        assert_eq!(service.generation(), generation + 1);
    }

    #[tokio::test]
    async fn test_release_and_cancel_only_entries() {
        let service = TransactionService::new();
        let (log, make) = recorder();
        assert_eq!(
            service.add_to_transaction("x", make("x", true), None),
            Err(TransactionError::NoActiveTransaction)
        );

        service.start_transaction();
        let dropped = service.add_to_transaction("dropped", make("dropped", true), None).unwrap();
        service.on_cancel("restore", Box::new(|| {})).unwrap();
        service.add_to_transaction("kept", make("kept", true), None).unwrap();
        assert!(service.release(dropped));
        assert!(!service.release(dropped));
        assert_eq!(service.size(), 2);

        let report = service.commit().await.unwrap();
        assert_eq!(report.committed, vec!["kept"]);
        assert_eq!(*log.lock(), vec!["kept"]);
    }
}
