// Copyright 2025 Cowboy AI, LLC.

//! Persistence capability

use super::now_millis;
use crate::core::capability::{Capability, CapabilityFactory};
use crate::core::domain_object::DomainObject;
use crate::core::services::{IdentifierService, ModelCache, PersistenceService};
use crate::errors::{CapabilityError, FrameworkResult, PersistenceError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Saves and reloads an object
#[async_trait]
pub trait PersistenceCapability: Send + Sync {
    /// Object being persisted
    fn object(&self) -> &DomainObject;

    /// Write the current model
    async fn persist(&self) -> FrameworkResult<bool>;

    /// Replace the model with the stored one; `false` when nothing is stored
    async fn refresh(&self) -> FrameworkResult<bool>;

    /// Delete the stored model
    async fn remove(&self) -> FrameworkResult<bool>;

    /// Space the object persists to
    fn space(&self) -> String;

    /// Whether the object has ever been persisted
    fn is_persisted(&self) -> bool {
        self.object().with_model(|m| m.get("persisted").is_some())
    }
}

/// Persistence through the `persistenceService`
pub struct CorePersistence {
    object: DomainObject,
    persistence: Arc<dyn PersistenceService>,
    identifiers: Arc<IdentifierService>,
    cache: Arc<ModelCache>,
}

impl CorePersistence {
    /// Persistence capability for `object`
    pub fn new(
        object: DomainObject,
        persistence: Arc<dyn PersistenceService>,
        identifiers: Arc<IdentifierService>,
        cache: Arc<ModelCache>,
    ) -> Self {
        Self {
            object,
            persistence,
            identifiers,
            cache,
        }
    }

    fn stamps(&self) -> (Option<i64>, Option<i64>) {
        self.object.with_model(|m| {
            (
                m.get("modified").and_then(Value::as_i64),
                m.get("persisted").and_then(Value::as_i64),
            )
        })
    }
}

#[async_trait]
impl PersistenceCapability for CorePersistence {
    fn object(&self) -> &DomainObject {
        &self.object
    }

    async fn persist(&self) -> FrameworkResult<bool> {
        let (modified, persisted) = self.stamps();
        if persisted.is_some() && persisted == modified {
            return Ok(true);
        }

        let stamp = modified.unwrap_or_else(now_millis);
        let mut model = self.object.model();
        match &mut model {
            Value::Object(fields) => {
                fields.insert("modified".to_string(), json!(stamp));
                fields.insert("persisted".to_string(), json!(stamp));
            }
            _ => return Err(CapabilityError::MutationCancelled(self.object.id()).into()),
        }

        // The live model is only stamped once the store accepted the write.
        let space = self.space();
        let key = self.object.identifier().key().to_string();
        let written = if persisted.is_some() {
            self.persistence.update_object(&space, &key, &model).await?
        } else {
            self.persistence.create_object(&space, &key, &model).await?
        };
        if !written {
            return Err(PersistenceError::Rejected(self.object.id()).into());
        }
        let mutation = self
            .object
            .mutation()
            .ok_or_else(|| self.object.unavailable("mutation"))?;
        let mut stamp_persisted = |model: &mut Value| match model {
            Value::Object(fields) => {
                fields.insert("persisted".to_string(), json!(stamp));
                true
            }
            _ => false,
        };
        let current = mutation.mutate(
            &mut |model: &mut Value| {
                model.get("modified").and_then(Value::as_i64) == modified && stamp_persisted(model)
            },
            Some(stamp),
        );
        if !current {
            // Edited during the write: `modified` moves past `persisted` so
            // the next persist writes again.
            mutation.mutate(&mut stamp_persisted, None);
            debug!(id = %self.object.id(), stamp = stamp, "Model changed while persisting");
        }
        debug!(id = %self.object.id(), space = %space, created = persisted.is_none(), "Persisted object");
        Ok(true)
    }

    async fn refresh(&self) -> FrameworkResult<bool> {
        let space = self.space();
        let stored = self
            .persistence
            .read_object(&space, self.object.identifier().key())
            .await?;
        let Some(stored) = stored else {
            return Ok(false);
        };
        let stamp = stored.get("modified").and_then(Value::as_i64);
        match self.object.mutation() {
            Some(mutation) => {
                let mut replacement = Some(stored);
                mutation.mutate(
                    &mut |model: &mut Value| match replacement.take() {
                        Some(stored) => {
                            *model = stored;
                            true
                        }
                        None => false,
                    },
                    stamp,
                );
            }
            None => self.object.replace_model(stored),
        }
        Ok(true)
    }

    async fn remove(&self) -> FrameworkResult<bool> {
        let space = self.space();
        let removed = self
            .persistence
            .delete_object(&space, self.object.identifier().key())
            .await?;
        self.cache.invalidate(&self.object.id());
        Ok(removed)
    }

    fn space(&self) -> String {
        self.identifiers.space_of(self.object.identifier())
    }
}

/// Factory for [`CorePersistence`]
pub struct PersistenceFactory {
    persistence: Arc<dyn PersistenceService>,
    identifiers: Arc<IdentifierService>,
    cache: Arc<ModelCache>,
}

impl PersistenceFactory {
    /// Factory writing through `persistence`
    pub fn new(
        persistence: Arc<dyn PersistenceService>,
        identifiers: Arc<IdentifierService>,
        cache: Arc<ModelCache>,
    ) -> Self {
        Self {
            persistence,
            identifiers,
            cache,
        }
    }
}

impl CapabilityFactory for PersistenceFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Persistence(Arc::new(CorePersistence::new(
            object.clone(),
            self.persistence.clone(),
            self.identifiers.clone(),
            self.cache.clone(),
        )))
    }
}
