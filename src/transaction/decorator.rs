// Copyright 2025 Cowboy AI, LLC.

//! Transaction-aware capabilities
//!
//! Decorates the capability service so that, while a transaction is
//! active, `persist` is deferred to commit and the first mutation of an
//! object records its model for cancel.

use super::manager::TransactionManager;
use crate::core::capabilities::{MutationCapability, PersistenceCapability};
use crate::core::services::{Listener, Subscription};
use crate::core::{Capability, CapabilityFactory, CapabilityService, DomainObject};
use crate::errors::FrameworkResult;
use crate::identifiers::Identifier;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Capability service decorator installing the transactional wrappers
pub struct TransactionCapabilityDecorator {
    manager: Arc<TransactionManager>,
    inner: Arc<dyn CapabilityService>,
}

impl TransactionCapabilityDecorator {
    /// Decorate `inner`
    pub fn new(manager: Arc<TransactionManager>, inner: Arc<dyn CapabilityService>) -> Self {
        Self { manager, inner }
    }
}

impl CapabilityService for TransactionCapabilityDecorator {
    fn get_capabilities(&self, object: &DomainObject) -> IndexMap<String, Arc<dyn CapabilityFactory>> {
        let mut capabilities = self.inner.get_capabilities(object);
        for (key, factory) in capabilities.iter_mut() {
            if key == "persistence" || key == "mutation" {
                let wrapped: Arc<dyn CapabilityFactory> = Arc::new(TransactionalFactory {
                    inner: factory.clone(),
                    manager: self.manager.clone(),
                });
                *factory = wrapped;
            }
        }
        capabilities
    }
}

struct TransactionalFactory {
    inner: Arc<dyn CapabilityFactory>,
    manager: Arc<TransactionManager>,
}

impl CapabilityFactory for TransactionalFactory {
    fn applies_to(&self, model: &Value, id: &Identifier) -> bool {
        self.inner.applies_to(model, id)
    }

    fn instantiate(&self, object: &DomainObject) -> Capability {
        match self.inner.instantiate(object) {
            Capability::Persistence(inner) => Capability::Persistence(Arc::new(TransactionalPersistence {
                inner,
                manager: self.manager.clone(),
            })),
            Capability::Mutation(inner) => Capability::Mutation(Arc::new(TransactionalMutation {
                inner,
                manager: self.manager.clone(),
            })),
            other => other,
        }
    }
}

/// Persistence that defers writes while a transaction is active
pub struct TransactionalPersistence {
    inner: Arc<dyn PersistenceCapability>,
    manager: Arc<TransactionManager>,
}

#[async_trait]
impl PersistenceCapability for TransactionalPersistence {
    fn object(&self) -> &DomainObject {
        self.inner.object()
    }

    async fn persist(&self) -> FrameworkResult<bool> {
        if !self.manager.is_active() {
            return self.inner.persist().await;
        }
        let id = self.object().id();
        let inner = self.inner.clone();
        self.manager.add_to_transaction(
            &id,
            format!("persist {id}"),
            move || async move {
                inner.persist().await?;
                Ok(())
            },
            None,
        )?;
        debug!(id = %id, "Deferred persist until commit");
        Ok(true)
    }

    async fn refresh(&self) -> FrameworkResult<bool> {
        self.manager.clear_transactions_for(&self.object().id());
        self.inner.refresh().await
    }

    async fn remove(&self) -> FrameworkResult<bool> {
        self.inner.remove().await
    }

    fn space(&self) -> String {
        self.inner.space()
    }

    fn is_persisted(&self) -> bool {
        self.inner.is_persisted()
    }
}

/// Mutation that snapshots the model before the first change in a transaction
pub struct TransactionalMutation {
    inner: Arc<dyn MutationCapability>,
    manager: Arc<TransactionManager>,
}

impl MutationCapability for TransactionalMutation {
    fn mutate(&self, mutator: &mut dyn FnMut(&mut Value) -> bool, timestamp: Option<i64>) -> bool {
        if self.manager.is_active() {
            if let Err(e) = self.manager.record_pristine(self.inner.object()) {
                warn!(id = %self.inner.object().id(), error = %e, "Could not record pristine model");
            }
        }
        self.inner.mutate(mutator, timestamp)
    }

    fn listen(&self, listener: Listener) -> Subscription {
        self.inner.listen(listener)
    }

    fn object(&self) -> &DomainObject {
        self.inner.object()
    }
}
