// Copyright 2025 Cowboy AI, LLC.

//! Routes the persistence capability through the queue

use super::dialog::PersistenceOperation;
use super::queue::PersistenceQueue;
use crate::core::capabilities::PersistenceCapability;
use crate::core::{Capability, CapabilityFactory, CapabilityService, DomainObject};
use crate::errors::FrameworkResult;
use crate::identifiers::Identifier;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Capability service decorator whose `persistence` writes go through a [`PersistenceQueue`]
pub struct QueuingCapabilityDecorator {
    queue: Arc<PersistenceQueue>,
    inner: Arc<dyn CapabilityService>,
}

impl QueuingCapabilityDecorator {
    /// Decorate `inner`
    pub fn new(queue: Arc<PersistenceQueue>, inner: Arc<dyn CapabilityService>) -> Self {
        Self { queue, inner }
    }
}

impl CapabilityService for QueuingCapabilityDecorator {
    fn get_capabilities(&self, object: &DomainObject) -> IndexMap<String, Arc<dyn CapabilityFactory>> {
        let mut capabilities = self.inner.get_capabilities(object);
        if let Some(factory) = capabilities.get_mut("persistence") {
            let wrapped: Arc<dyn CapabilityFactory> = Arc::new(QueuingFactory {
                inner: factory.clone(),
                queue: self.queue.clone(),
            });
            *factory = wrapped;
        }
        capabilities
    }
}

struct QueuingFactory {
    inner: Arc<dyn CapabilityFactory>,
    queue: Arc<PersistenceQueue>,
}

impl CapabilityFactory for QueuingFactory {
    fn applies_to(&self, model: &Value, id: &Identifier) -> bool {
        self.inner.applies_to(model, id)
    }

    fn instantiate(&self, object: &DomainObject) -> Capability {
        match self.inner.instantiate(object) {
            Capability::Persistence(inner) => Capability::Persistence(Arc::new(QueuedPersistence {
                inner,
                queue: self.queue.clone(),
            })),
            other => other,
        }
    }
}

/// Persistence whose writes wait their turn in the queue
pub struct QueuedPersistence {
    inner: Arc<dyn PersistenceCapability>,
    queue: Arc<PersistenceQueue>,
}

#[async_trait]
impl PersistenceCapability for QueuedPersistence {
    fn object(&self) -> &DomainObject {
        self.inner.object()
    }

    async fn persist(&self) -> FrameworkResult<bool> {
        let inner = self.inner.clone();
        let label = format!("persist {}", self.object().id());
        Ok(self
            .queue
            .put(label, PersistenceOperation::Persist, move || {
                let inner = inner.clone();
                async move { inner.persist().await }
            })
            .await?)
    }

    async fn refresh(&self) -> FrameworkResult<bool> {
        self.inner.refresh().await
    }

    async fn remove(&self) -> FrameworkResult<bool> {
        let inner = self.inner.clone();
        let label = format!("remove {}", self.object().id());
        Ok(self
            .queue
            .put(label, PersistenceOperation::Remove, move || {
                let inner = inner.clone();
                async move { inner.remove().await }
            })
            .await?)
    }

    fn space(&self) -> String {
        self.inner.space()
    }

    fn is_persisted(&self) -> bool {
        self.inner.is_persisted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use crate::core::capabilities::{MutationFactory, PersistenceFactory};
    use crate::core::services::{
        IdentifierService, InMemoryPersistenceProvider, ModelCache, PersistenceService, TopicService,
    };
    use crate::core::{model_handle, CoreCapabilityService};
    use crate::errors::{FrameworkError, PersistenceError};
    use crate::persistence::HeadlessDialogService;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(spaces: &[&str]) -> (DomainObject, Arc<InMemoryPersistenceProvider>) {
        let store = Arc::new(InMemoryPersistenceProvider::new(spaces.iter().copied()));
        let persistence: Arc<dyn PersistenceService> = store.clone();
        let core = CoreCapabilityService::from_factories(vec![
            (
                "mutation".to_string(),
                Arc::new(MutationFactory::new(Arc::new(TopicService::new()))) as Arc<dyn CapabilityFactory>,
            ),
            (
                "persistence".to_string(),
                Arc::new(PersistenceFactory::new(
                    persistence,
                    Arc::new(IdentifierService::new("mct")),
                    Arc::new(ModelCache::new(8)),
                )),
            ),
        ]);
        let queue = Arc::new(PersistenceQueue::new(
            Arc::new(HeadlessDialogService),
            &QueueConfig::default(),
        ));
        let service: Arc<dyn CapabilityService> =
            Arc::new(QueuingCapabilityDecorator::new(queue, Arc::new(core)));
        let object = DomainObject::new(Identifier::new("mct", "a"), model_handle(json!({"name": "A"})), service);
        (object, store)
    }

    #[tokio::test]
    async fn test_persist_and_remove_go_through_queue() {
        let (object, store) = object(&["mct"]);
        let persistence = object.persistence().unwrap();

        assert!(persistence.persist().await.unwrap());
        assert!(store.read_object("mct", "a").await.unwrap().is_some());
        assert!(persistence.remove().await.unwrap());
        assert_eq!(store.read_object("mct", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_write_is_reported_not_dropped() {
        let (object, _) = object(&["other"]);
        let err = object.persistence().unwrap().persist().await.unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::Persistence(PersistenceError::Discarded { attempts: 1, .. })
        ));
    }
}
