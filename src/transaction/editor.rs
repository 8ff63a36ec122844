// Copyright 2025 Cowboy AI, LLC.

//! Editor capability

use super::manager::TransactionManager;
use super::service::{CommitReport, TransactionService};
use crate::core::{Capability, CapabilityFactory, DomainObject};
use crate::errors::FrameworkResult;
use std::sync::Arc;
use tracing::info;

/// Edit session over an object
///
/// `edit` starts a transaction, `save` persists the object and commits,
/// `cancel` discards every pending change.
pub struct EditorCapability {
    object: DomainObject,
    transactions: Arc<TransactionService>,
    manager: Arc<TransactionManager>,
}

impl EditorCapability {
    /// Editor for `object`
    pub fn new(
        object: DomainObject,
        transactions: Arc<TransactionService>,
        manager: Arc<TransactionManager>,
    ) -> Self {
        Self {
            object,
            transactions,
            manager,
        }
    }

    /// Object being edited
    pub fn object(&self) -> &DomainObject {
        &self.object
    }

    /// Begin editing
    pub fn edit(&self) {
        let depth = self.transactions.start_transaction();
        info!(id = %self.object.id(), depth = depth, "Editing");
    }

    /// Whether an edit session is open
    pub fn is_editing(&self) -> bool {
        self.transactions.is_active()
    }

    /// Whether anything is pending in the session
    pub fn is_dirty(&self) -> bool {
        self.transactions.size() > 0 || self.manager.is_scheduled(&self.object.id())
    }

    /// Persist the object and commit the session
    pub async fn save(&self) -> FrameworkResult<CommitReport> {
        if let Some(persistence) = self.object.persistence() {
            persistence.persist().await?;
        }
        Ok(self.transactions.commit().await?)
    }

    /// Abandon the session; returns the number of discarded entries
    pub fn cancel(&self) -> FrameworkResult<usize> {
        let discarded = self.transactions.cancel()?;
        info!(id = %self.object.id(), discarded = discarded, "Edit cancelled");
        Ok(discarded)
    }
}

/// Factory for [`EditorCapability`]
pub struct EditorFactory {
    transactions: Arc<TransactionService>,
    manager: Arc<TransactionManager>,
}

impl EditorFactory {
    /// Factory sharing one transaction service
    pub fn new(transactions: Arc<TransactionService>, manager: Arc<TransactionManager>) -> Self {
        Self {
            transactions,
            manager,
        }
    }
}

impl CapabilityFactory for EditorFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Editor(Arc::new(EditorCapability::new(
            object.clone(),
            self.transactions.clone(),
            self.manager.clone(),
        )))
    }
}
