// Copyright 2025 Cowboy AI, LLC.

//! Location capability
//!
//! `model.location` names an object's primary parent. Seen through any
//! other parent, the object is a link.

use crate::core::services::ObjectService;
use crate::core::{Capability, CapabilityFactory, DomainObject};
use crate::errors::{CapabilityError, FrameworkResult};
use crate::framework::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;

/// Primary versus contextual location of an object
pub struct LocationCapability {
    object: DomainObject,
    objects: Lazy<Arc<ObjectService>>,
}

impl LocationCapability {
    /// Location of `object`
    pub fn new(object: DomainObject, objects: Lazy<Arc<ObjectService>>) -> Self {
        Self { object, objects }
    }

    /// Id of the primary parent, from `model.location`
    pub fn location(&self) -> Option<String> {
        self.object.model_str("location")
    }

    /// Id of the parent this object is being seen through
    pub fn contextual_location(&self) -> Option<String> {
        self.object.parent().map(DomainObject::id)
    }

    /// Whether the object is seen through a parent other than its primary one
    pub fn is_link(&self) -> bool {
        match self.contextual_location() {
            Some(parent) => self.location().as_deref() != Some(parent.as_str()),
            None => false,
        }
    }

    /// Whether the object is seen in its primary location
    pub fn is_original(&self) -> bool {
        !self.is_link()
    }

    /// Make `location` the primary parent
    pub fn set_primary_location(&self, location: &str) -> FrameworkResult<()> {
        let mutation = self
            .object
            .mutation()
            .ok_or_else(|| self.object.unavailable("mutation"))?;
        let done = mutation.mutate(
            &mut |model: &mut Value| match model {
                Value::Object(fields) => {
                    fields.insert("location".to_string(), json!(location));
                    true
                }
                _ => false,
            },
            None,
        );
        if done {
            Ok(())
        } else {
            Err(CapabilityError::MutationCancelled(self.object.id()).into())
        }
    }

    /// The object seen in its primary location
    ///
    /// `None` for a link whose model names no location.
    pub async fn get_original(&self) -> FrameworkResult<Option<DomainObject>> {
        if self.is_original() {
            return Ok(Some(self.object.clone()));
        }
        let Some(location) = self.location() else {
            return Ok(None);
        };
        let parent = self.objects.get()?.get_object(&location).await?;
        Ok(parent.map(|parent| self.object.contextualize(&parent)))
    }

    /// Whether the contextual parent no longer lists this object
    ///
    /// Happens when another client removed the object while it was
    /// being viewed here.
    pub fn is_orphan(&self) -> bool {
        let id = self.object.id();
        self.object.parent().is_some_and(|parent| {
            parent.with_model(|model| {
                !model
                    .get("composition")
                    .and_then(Value::as_array)
                    .is_some_and(|children| children.iter().any(|c| c.as_str() == Some(id.as_str())))
            })
        })
    }
}

/// Factory for [`LocationCapability`]
pub struct LocationFactory {
    objects: Lazy<Arc<ObjectService>>,
}

impl LocationFactory {
    /// Factory loading originals through `objects`
    pub fn new(objects: Lazy<Arc<ObjectService>>) -> Self {
        Self { objects }
    }
}

impl CapabilityFactory for LocationFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Location(Arc::new(LocationCapability::new(
            object.clone(),
            self.objects.clone(),
        )))
    }
}
