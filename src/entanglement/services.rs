// Copyright 2025 Cowboy AI, LLC.

//! Link, move and copy
//!
//! Each service validates a request against the `composition` and
//! `entanglement` policies before touching any model. Parents are
//! persisted before the children they gained.

use crate::core::DomainObject;
use crate::errors::{FrameworkError, FrameworkResult};
use crate::policy::{PolicyService, COMPOSITION_CATEGORY};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Policy category consulted with an [`EntanglementRequest`]
pub const ENTANGLEMENT_CATEGORY: &str = "entanglement";

/// Ways an object can be placed into a new parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntanglementOperation {
    /// Add to the parent; stays where it was too
    Link,
    /// Add to the parent and leave the old one
    Move,
    /// Duplicate into the parent
    Copy,
}

impl fmt::Display for EntanglementOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntanglementOperation::Link => write!(f, "link"),
            EntanglementOperation::Move => write!(f, "move"),
            EntanglementOperation::Copy => write!(f, "copy"),
        }
    }
}

/// Candidate handed to `entanglement` policies; the context is the parent
#[derive(Debug, Clone)]
pub struct EntanglementRequest {
    /// Requested operation
    pub operation: EntanglementOperation,
    /// Object being placed
    pub object: DomainObject,
    /// Parent it is placed into
    pub parent: DomainObject,
}

/// Places objects into parents
#[async_trait]
pub trait EntanglementService: Send + Sync {
    /// Operation this service performs
    fn operation(&self) -> EntanglementOperation;

    /// Whether `object` may be placed into `parent`
    fn validate(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<()>;

    /// Place `object` into `parent`; returns the object as seen in `parent`
    async fn perform(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<DomainObject>;
}

fn check(
    policy: &dyn PolicyService,
    operation: EntanglementOperation,
    object: &DomainObject,
    parent: &DomainObject,
) -> FrameworkResult<()> {
    if !parent.has_capability("composition") {
        return Err(parent.unavailable("composition"));
    }
    if parent.path().contains(&object.id()) {
        return Err(FrameworkError::invalid(format!(
            "cannot {operation} {} into itself",
            object.id()
        )));
    }
    policy.check(COMPOSITION_CATEGORY, object, parent)?;
    let request = EntanglementRequest {
        operation,
        object: object.clone(),
        parent: parent.clone(),
    };
    policy.check(ENTANGLEMENT_CATEGORY, &request, parent)?;
    Ok(())
}

async fn persist(object: &DomainObject) -> FrameworkResult<()> {
    if let Some(persistence) = object.persistence() {
        persistence.persist().await?;
    }
    Ok(())
}

fn add(object: &DomainObject, parent: &DomainObject) -> FrameworkResult<DomainObject> {
    parent
        .composition()
        .ok_or_else(|| parent.unavailable("composition"))?
        .add(object, None)
}

/// Adds an object to another parent without leaving the current one
pub struct LinkService {
    policy: Arc<dyn PolicyService>,
}

impl LinkService {
    /// Link service consulting `policy`
    pub fn new(policy: Arc<dyn PolicyService>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl EntanglementService for LinkService {
    fn operation(&self) -> EntanglementOperation {
        EntanglementOperation::Link
    }

    fn validate(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<()> {
        check(self.policy.as_ref(), self.operation(), object, parent)?;
        let already = parent
            .composition()
            .is_some_and(|composition| composition.contains(&object.id()));
        if already {
            return Err(FrameworkError::invalid(format!(
                "{} already contains {}",
                parent.id(),
                object.id()
            )));
        }
        Ok(())
    }

    async fn perform(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<DomainObject> {
        self.validate(object, parent)?;
        let linked = add(object, parent)?;
        persist(parent).await?;
        info!(object = %object.id(), parent = %parent.id(), "Linked object");
        Ok(linked)
    }
}

/// Moves an object from its contextual parent to another
///
/// When the object is moved away from its primary location, the new
/// parent becomes its primary location.
pub struct MoveService {
    policy: Arc<dyn PolicyService>,
}

impl MoveService {
    /// Move service consulting `policy`
    pub fn new(policy: Arc<dyn PolicyService>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl EntanglementService for MoveService {
    fn operation(&self) -> EntanglementOperation {
        EntanglementOperation::Move
    }

    fn validate(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<()> {
        check(self.policy.as_ref(), self.operation(), object, parent)?;
        match object.parent() {
            None => Err(FrameworkError::invalid(format!(
                "{} has no parent to move it from",
                object.id()
            ))),
            Some(current) if current.same_as(parent) => Err(FrameworkError::invalid(format!(
                "{} is already in {}",
                object.id(),
                parent.id()
            ))),
            Some(_) => Ok(()),
        }
    }

    async fn perform(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<DomainObject> {
        self.validate(object, parent)?;
        let Some(previous) = object.parent() else {
            return Err(FrameworkError::invalid(format!("{} has no parent", object.id())));
        };
        let was_original = object
            .location()
            .map_or(true, |location| location.is_original());

        let moved = add(object, parent)?;
        persist(parent).await?;

        if was_original {
            if let Some(location) = moved.location() {
                location.set_primary_location(&parent.id())?;
                persist(&moved).await?;
            }
        }

        if let Some(composition) = previous.composition() {
            composition.remove(&object.id())?;
            persist(previous).await?;
        }
        info!(object = %object.id(), from = %previous.id(), to = %parent.id(), "Moved object");
        Ok(moved)
    }
}

/// Duplicates an object tree into a parent
///
/// Objects whose primary location is inside the tree are copied; links
/// found in the tree are linked again from the copies.
pub struct CopyService {
    policy: Arc<dyn PolicyService>,
}

impl CopyService {
    /// Copy service consulting `policy`
    pub fn new(policy: Arc<dyn PolicyService>) -> Self {
        Self { policy }
    }

    fn copy_into<'a>(
        &'a self,
        object: &'a DomainObject,
        parent: &'a DomainObject,
        created: &'a Mutex<HashSet<String>>,
    ) -> BoxFuture<'a, FrameworkResult<DomainObject>> {
        async move {
            let parent_id = parent.id();
            let mut model = object.model();
            if let Value::Object(fields) = &mut model {
                fields.remove("persisted");
                fields.remove("modified");
                fields.insert("location".to_string(), json!(parent_id));
                if let Some(Value::Array(children)) = fields.get_mut("composition") {
                    children.clear();
                }
            }

            let created_object = parent
                .instantiation()
                .ok_or_else(|| parent.unavailable("instantiation"))?
                .instantiate(model)?;
            created.lock().insert(created_object.id());
            let copy = add(&created_object, parent)?;
            persist(parent).await?;
            persist(&copy).await?;
            debug!(source = %object.id(), copy = %copy.id(), parent = %parent_id, "Copied object");

            if let Some(composition) = object.composition() {
                for child in composition.invoke().await? {
                    if created.lock().contains(&child.id()) {
                        continue;
                    }
                    let original = child
                        .location()
                        .map_or(true, |location| location.is_original());
                    if original {
                        self.copy_into(&child, &copy, created).await?;
                    } else {
                        add(&child, &copy)?;
                        persist(&copy).await?;
                    }
                }
            }
            Ok(copy)
        }
        .boxed()
    }
}

#[async_trait]
impl EntanglementService for CopyService {
    fn operation(&self) -> EntanglementOperation {
        EntanglementOperation::Copy
    }

    fn validate(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<()> {
        check(self.policy.as_ref(), self.operation(), object, parent)?;
        if !parent.has_capability("instantiation") {
            return Err(parent.unavailable("instantiation"));
        }
        Ok(())
    }

    async fn perform(&self, object: &DomainObject, parent: &DomainObject) -> FrameworkResult<DomainObject> {
        self.validate(object, parent)?;
        let created = Mutex::new(HashSet::new());
        let copy = self.copy_into(object, parent, &created).await?;
        info!(object = %object.id(), parent = %parent.id(), copy = %copy.id(), "Copied object tree");
        Ok(copy)
    }
}
