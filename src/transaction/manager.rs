// Copyright 2025 Cowboy AI, LLC.

//! Per-object bookkeeping on top of [`TransactionService`]
//!
//! At most one pending write is kept per object, and the model an object
//! had when the transaction started is restored on cancel.

use super::service::{CancelFn, EntryHandle, TransactionService};
use crate::core::DomainObject;
use crate::errors::{FrameworkResult, TransactionError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct Scheduled {
    generation: u64,
    handles: HashMap<String, EntryHandle>,
}

impl Scheduled {
    fn current(&mut self, generation: u64) -> &mut HashMap<String, EntryHandle> {
        if self.generation != generation {
            self.generation = generation;
            self.handles.clear();
        }
        &mut self.handles
    }
}

#[derive(Default)]
struct Pristine {
    generation: u64,
    recorded: HashSet<String>,
}

/// Tracks which objects have writes pending (`transactionManager`)
pub struct TransactionManager {
    service: Arc<TransactionService>,
    scheduled: Arc<Mutex<Scheduled>>,
    pristine: Mutex<Pristine>,
}

impl TransactionManager {
    /// Manager over `service`
    pub fn new(service: Arc<TransactionService>) -> Self {
        Self {
            service,
            scheduled: Arc::new(Mutex::new(Scheduled::default())),
            pristine: Mutex::new(Pristine::default()),
        }
    }

    /// Underlying transaction service
    pub fn service(&self) -> &Arc<TransactionService> {
        &self.service
    }

    /// Whether a transaction is active
    pub fn is_active(&self) -> bool {
        self.service.is_active()
    }

    /// Whether a write is pending for `id`
    pub fn is_scheduled(&self, id: &str) -> bool {
        if !self.service.is_active() {
            return false;
        }
        let generation = self.service.generation();
        self.scheduled.lock().current(generation).contains_key(id)
    }

    /// Queue the write for `id`, replacing any write already pending for it
    ///
    /// The replaced write never commits, but its cancel callback still runs
    /// on cancel, after the new one.
    pub fn add_to_transaction<C, Fut>(
        &self,
        id: &str,
        label: impl Into<String>,
        commit: C,
        cancel: Option<CancelFn>,
    ) -> Result<EntryHandle, TransactionError>
    where
        C: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = FrameworkResult<()>> + Send + 'static,
    {
        let generation = self.service.generation();
        let mut scheduled = self.scheduled.lock();
        let handles = scheduled.current(generation);
        let mut cancel = cancel;
        if let Some(previous) = handles.remove(id) {
            if let Some(earlier) = self.service.take_cancel(previous) {
                cancel = Some(match cancel {
                    Some(later) => Box::new(move || {
                        later();
                        earlier();
                    }) as CancelFn,
                    None => earlier,
                });
            }
            debug!(id = %id, "Replaced pending write");
        }

        let registry = self.scheduled.clone();
        let object_id = id.to_string();
        let handle = self.service.add_to_transaction(
            label,
            move || {
                registry.lock().handles.remove(&object_id);
                commit()
            },
            cancel,
        )?;
        handles.insert(id.to_string(), handle);
        Ok(handle)
    }

    /// Drop the pending write for `id`, if any
    pub fn clear_transactions_for(&self, id: &str) -> bool {
        let generation = self.service.generation();
        let removed = self.scheduled.lock().current(generation).remove(id);
        match removed {
            Some(handle) => self.service.release(handle),
            None => false,
        }
    }

    /// Remember `object`'s model so cancel can restore it
    ///
    /// Only the first call per object in a transaction records anything.
    pub fn record_pristine(&self, object: &DomainObject) -> Result<bool, TransactionError> {
        if !self.service.is_active() {
            return Err(TransactionError::NoActiveTransaction);
        }
        let generation = self.service.generation();
        let id = object.id();
        {
            let mut pristine = self.pristine.lock();
            if pristine.generation != generation {
                pristine.generation = generation;
                pristine.recorded.clear();
            }
            if !pristine.recorded.insert(id.clone()) {
                return Ok(false);
            }
        }

        let snapshot = object.model();
        let handle = object.model_handle().clone();
        self.service.on_cancel(
            format!("restore {id}"),
            Box::new(move || {
                *handle.write() = snapshot;
            }),
        )?;
        debug!(id = %id, "Recorded pristine model");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{model_handle, CoreCapabilityService};
    use crate::identifiers::Identifier;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager() -> TransactionManager {
        TransactionManager::new(Arc::new(TransactionService::new()))
    }

    #[tokio::test]
    async fn test_one_pending_write_per_object() {
        let manager = manager();
        let runs = Arc::new(AtomicUsize::new(0));
        manager.service().start_transaction();

        for label in ["first", "second"] {
            let runs = runs.clone();
            manager
                .add_to_transaction("mct:a", label, move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }, None)
                .unwrap();
        }
        assert!(manager.is_scheduled("mct:a"));
        assert_eq!(manager.service().size(), 1);

        let report = manager.service().commit().await.unwrap();
        assert_eq!(report.committed, vec!["second"]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!manager.is_scheduled("mct:a"));
    }

    #[test]
    fn test_replaced_write_still_cancels() {
        let manager = manager();
        let cancelled = Arc::new(parking_lot::Mutex::new(Vec::new()));
        manager.service().start_transaction();

        for label in ["first", "second", "third"] {
            let sink = cancelled.clone();
            let cancel: Option<CancelFn> = (label != "second").then(|| {
                Box::new(move || sink.lock().push(label)) as CancelFn
            });
            manager
                .add_to_transaction("mct:a", label, || async { Ok(()) }, cancel)
                .unwrap();
        }
        assert_eq!(manager.service().size(), 1);

        assert_eq!(manager.service().cancel().unwrap(), 1);
        assert_eq!(*cancelled.lock(), vec!["third", "first"]);
    }

    #[tokio::test]
    async fn test_clear_transactions_for_object() {
        let manager = manager();
        manager.service().start_transaction();
        manager
            .add_to_transaction("mct:a", "write", || async { Ok(()) }, None)
            .unwrap();

        assert!(manager.clear_transactions_for("mct:a"));
        assert!(!manager.clear_transactions_for("mct:a"));
        assert_eq!(manager.service().size(), 0);
    }

    #[test]
    fn test_pristine_restored_on_cancel() {
        let manager = manager();
        let object = DomainObject::new(
            Identifier::local("a"),
            model_handle(json!({"name": "before"})),
            Arc::new(CoreCapabilityService::from_factories(Vec::new())),
        );
        assert_eq!(
            manager.record_pristine(&object),
            Err(TransactionError::NoActiveTransaction)
        );

        manager.service().start_transaction();
        assert_eq!(manager.record_pristine(&object), Ok(true));
        object.replace_model(json!({"name": "during"}));
        assert_eq!(manager.record_pristine(&object), Ok(false));
        object.replace_model(json!({"name": "later"}));

        manager.service().cancel().unwrap();
        assert_eq!(object.model(), json!({"name": "before"}));

        manager.service().start_transaction();
        assert_eq!(manager.record_pristine(&object), Ok(true));
    }
}
