// Copyright 2025 Cowboy AI, LLC.

//! Named publish/subscribe topics

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Callback receiving published values
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

type Listeners = Mutex<Vec<(u64, Listener)>>;

/// A single topic
#[derive(Clone, Default)]
pub struct Topic {
    listeners: Arc<Listeners>,
    next_id: Arc<AtomicU64>,
}

impl Topic {
    /// Register a listener
    pub fn listen(&self, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Deliver a value to every current listener
    ///
    /// Listeners run outside the lock and may unsubscribe while notified.
    pub fn notify(&self, value: &Value) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Registration returned by [`Topic::listen`]
///
/// Dropping a subscription leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    listeners: Weak<Listeners>,
    id: u64,
}

impl Subscription {
    /// Remove the listener
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Shared registry of named topics (`topic` service)
#[derive(Default)]
pub struct TopicService {
    topics: Mutex<HashMap<String, Topic>>,
}

impl TopicService {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Topic by name, created on first use
    pub fn topic(&self, name: &str) -> Topic {
        self.topics.lock().entry(name.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_topics_are_shared() {
        let topics = TopicService::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = topics
            .topic("mutation")
            .listen(Arc::new(move |v| sink.lock().push(v.clone())));

        topics.topic("mutation").notify(&json!(1));
        topics.topic("other").notify(&json!(2));
        subscription.unsubscribe();
        topics.topic("mutation").notify(&json!(3));

        assert_eq!(*seen.lock(), vec![json!(1)]);
        assert_eq!(topics.topic("mutation").listener_count(), 0);
    }
}
