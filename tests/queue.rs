// Copyright 2025 Cowboy AI, LLC.

//! Queued writes with user-mediated retry

mod common;

use async_trait::async_trait;
use cim_capability::config::FrameworkConfig;
use cim_capability::core::services::{InMemoryPersistenceProvider, PersistenceService};
use cim_capability::errors::{FrameworkError, FrameworkResult, PersistenceError};
use cim_capability::framework::{instance, ComponentKind};
use cim_capability::persistence::{DialogService, FailureDecision, PersistenceFailure, PersistenceOperation};
use cim_capability::{Bundle, BundleDefinition, ExtensionDefinition, Platform};
use common::{folder, rename};
use futures::future::join_all;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SPACE: &str = "flaky";

/// Store whose first writes fail
struct FlakyStore {
    failures_left: AtomicUsize,
    writes: Mutex<Vec<String>>,
    inner: InMemoryPersistenceProvider,
}

impl FlakyStore {
    fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicUsize::new(failures),
            writes: Mutex::new(Vec::new()),
            inner: InMemoryPersistenceProvider::new([SPACE]),
        })
    }

    fn attempt(&self, key: &str) -> FrameworkResult<()> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PersistenceError::Storage("connection reset".to_string()).into());
        }
        self.writes.lock().push(key.to_string());
        Ok(())
    }
}

#[async_trait]
impl PersistenceService for FlakyStore {
    async fn list_spaces(&self) -> FrameworkResult<Vec<String>> {
        self.inner.list_spaces().await
    }

    async fn list_objects(&self, space: &str) -> FrameworkResult<Vec<String>> {
        self.inner.list_objects(space).await
    }

    async fn create_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool> {
        self.attempt(key)?;
        self.inner.create_object(space, key, model).await
    }

    async fn read_object(&self, space: &str, key: &str) -> FrameworkResult<Option<Value>> {
        self.inner.read_object(space, key).await
    }

    async fn update_object(&self, space: &str, key: &str, model: &Value) -> FrameworkResult<bool> {
        self.attempt(key)?;
        self.inner.update_object(space, key, model).await
    }

    async fn delete_object(&self, space: &str, key: &str) -> FrameworkResult<bool> {
        self.attempt(key)?;
        self.inner.delete_object(space, key).await
    }
}

/// Dialog that always gives the same answer and remembers what it was asked
struct Answering {
    decision: FailureDecision,
    asked: Mutex<Vec<(String, u32)>>,
}

impl Answering {
    fn new(decision: FailureDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            asked: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DialogService for Answering {
    async fn resolve_failure(&self, failure: &PersistenceFailure) -> FailureDecision {
        assert_eq!(failure.operation, PersistenceOperation::Persist);
        self.asked.lock().push((failure.label.clone(), failure.attempts));
        self.decision
    }
}

fn platform(store: Arc<FlakyStore>, dialog: Arc<Answering>, config: FrameworkConfig) -> Platform {
    let bundle = Bundle::new(
        "test/flaky",
        BundleDefinition::named("Flaky Store").extension(
            "components",
            ExtensionDefinition::default()
                .implementation("store")
                .component(ComponentKind::Provider, "persistenceService"),
        ),
    );
    Platform::builder()
        .with_config(config)
        .bundle(bundle)
        .implementation("test/flaky/src/store", move |_| {
            let service: Arc<dyn PersistenceService> = store.clone();
            Ok(instance(service))
        })
        .dialog_service(dialog)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_failed_persist_is_retried_when_the_user_asks() {
    let store = FlakyStore::new(2);
    let dialog = Answering::new(FailureDecision::Retry);
    let platform = platform(store.clone(), dialog.clone(), FrameworkConfig::default());
    let object = folder(&platform, "flaky:doc", None);

    assert!(object.persistence().unwrap().persist().await.unwrap());

    assert_eq!(*store.writes.lock(), vec!["doc"]);
    assert_eq!(
        *dialog.asked.lock(),
        vec![("persist flaky:doc".to_string(), 1), ("persist flaky:doc".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_retries_stop_at_the_configured_limit() {
    let store = FlakyStore::new(usize::MAX);
    let dialog = Answering::new(FailureDecision::Retry);
    let mut config = FrameworkConfig::default();
    config.queue.max_attempts = 3;
    let platform = platform(store, dialog.clone(), config);
    let object = folder(&platform, "flaky:doc", None);

    let err = object.persistence().unwrap().persist().await.unwrap_err();

    assert!(matches!(
        err,
        FrameworkError::Persistence(PersistenceError::Discarded { attempts: 3, .. })
    ));
    assert_eq!(dialog.asked.lock().len(), 2);
}

#[tokio::test]
async fn test_discarded_write_lets_later_writes_through() {
    let store = FlakyStore::new(1);
    let dialog = Answering::new(FailureDecision::Discard);
    let platform = platform(store.clone(), dialog, FrameworkConfig::default());
    let first = folder(&platform, "flaky:first", None);
    let second = folder(&platform, "flaky:second", None);

    assert!(first.persistence().unwrap().persist().await.is_err());
    assert!(second.persistence().unwrap().persist().await.unwrap());

    assert_eq!(*store.writes.lock(), vec!["second"]);
}

#[tokio::test]
async fn test_concurrent_persists_reach_the_store_in_order() {
    let store = FlakyStore::new(0);
    let dialog = Answering::new(FailureDecision::Discard);
    let platform = platform(store.clone(), dialog, FrameworkConfig::default());
    let objects: Vec<_> = (0..5)
        .map(|i| folder(&platform, &format!("flaky:o{i}"), None))
        .collect();
    for object in &objects {
        rename(object, "renamed");
    }

    let results = join_all(
        objects
            .iter()
            .map(|object| async move { object.persistence().unwrap().persist().await }),
    )
    .await;

    assert!(results.iter().all(|r| matches!(r, Ok(true))));
    assert_eq!(*store.writes.lock(), vec!["o0", "o1", "o2", "o3", "o4"]);
    assert!(platform.queue().unwrap().is_empty());
}
