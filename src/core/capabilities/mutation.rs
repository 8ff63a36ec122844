// Copyright 2025 Cowboy AI, LLC.

//! Mutation capability

use super::now_millis;
use crate::core::capability::{Capability, CapabilityFactory};
use crate::core::domain_object::DomainObject;
use crate::core::services::{Listener, Subscription, TopicService};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::trace;

/// Topic notified after any object mutates, with `{id, model}`
pub const MUTATION_TOPIC: &str = "mutation";

/// Topic notified with the new model after a specific object mutates
pub fn mutation_topic(id: &str) -> String {
    format!("{MUTATION_TOPIC}:{id}")
}

/// Changes an object's model
pub trait MutationCapability: Send + Sync {
    /// Apply `mutator` to a copy of the model
    ///
    /// Returning `false` from the mutator abandons the change. Otherwise the
    /// copy replaces the model, `modified` is set to `timestamp` (or now)
    /// and listeners are notified. The mutator runs while the model is
    /// locked, so it must not read the object it mutates.
    fn mutate(&self, mutator: &mut dyn FnMut(&mut Value) -> bool, timestamp: Option<i64>) -> bool;

    /// Listen for changes to this object's model
    fn listen(&self, listener: Listener) -> Subscription;

    /// Object being mutated
    fn object(&self) -> &DomainObject;
}

/// Mutation through the `topic` service
pub struct CoreMutation {
    object: DomainObject,
    topics: Arc<TopicService>,
}

impl CoreMutation {
    /// Mutation capability for `object`
    pub fn new(object: DomainObject, topics: Arc<TopicService>) -> Self {
        Self { object, topics }
    }
}

impl MutationCapability for CoreMutation {
    fn mutate(&self, mutator: &mut dyn FnMut(&mut Value) -> bool, timestamp: Option<i64>) -> bool {
        // The mutator sees and replaces the model under one write guard.
        let (model, modified) = {
            let mut live = self.object.model_handle().write();
            let mut model = live.clone();
            let previous = model.get("modified").and_then(Value::as_i64);
            if !mutator(&mut model) {
                return false;
            }
            // Untimed changes always advance `modified`.
            let modified = timestamp.unwrap_or_else(|| match previous {
                Some(previous) => now_millis().max(previous + 1),
                None => now_millis(),
            });
            if let Value::Object(fields) = &mut model {
                fields.insert("modified".to_string(), json!(modified));
            }
            *live = model.clone();
            (model, modified)
        };

        let id = self.object.id();
        trace!(id = %id, modified = modified, "Mutated model");
        self.topics.topic(&mutation_topic(&id)).notify(&model);
        self.topics
            .topic(MUTATION_TOPIC)
            .notify(&json!({"id": id, "model": model}));
        true
    }

    fn listen(&self, listener: Listener) -> Subscription {
        self.topics
            .topic(&mutation_topic(&self.object.id()))
            .listen(listener)
    }

    fn object(&self) -> &DomainObject {
        &self.object
    }
}

/// Factory for [`CoreMutation`]
pub struct MutationFactory {
    topics: Arc<TopicService>,
}

impl MutationFactory {
    /// Factory notifying through `topics`
    pub fn new(topics: Arc<TopicService>) -> Self {
        Self { topics }
    }
}

impl CapabilityFactory for MutationFactory {
    fn instantiate(&self, object: &DomainObject) -> Capability {
        Capability::Mutation(Arc::new(CoreMutation::new(object.clone(), self.topics.clone())))
    }
}
