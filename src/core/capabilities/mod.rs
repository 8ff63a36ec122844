// Copyright 2025 Cowboy AI, LLC.

//! Built-in capability implementations

mod composition;
mod instantiation;
mod mutation;
mod persistence;
mod presentation;
mod typed;

pub use composition::{
    CompositionCapability, CompositionFactory, RelationshipCapability, RelationshipFactory,
};
pub use instantiation::{InstantiationCapability, InstantiationFactory};
pub use mutation::{mutation_topic, CoreMutation, MutationCapability, MutationFactory, MUTATION_TOPIC};
pub use persistence::{CorePersistence, PersistenceCapability, PersistenceFactory};
pub use presentation::{ActionCapability, ActionFactoryCapability, ViewCapability, ViewFactory};
pub use typed::{
    DelegationCapability, MetadataCapability, MetadataProperty, TypeCapability, TypedFactory,
    TypedKind,
};

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
