// Copyright 2025 Cowboy AI, LLC.

//! Services composed by the core bundle

pub mod action;
pub mod cache;
pub mod identifier;
pub mod model;
pub mod object;
pub mod persistence;
pub mod topic;
pub mod types;
pub mod view;

pub use action::{
    Action, ActionContext, ActionFactory, ActionMetadata, ActionProvider, ActionService,
};
pub use cache::ModelCache;
pub use identifier::IdentifierService;
pub use model::{
    is_placeholder, placeholder, CachingModelDecorator, MissingModelDecorator, ModelAggregator,
    ModelService, Models, PersistedModelProvider, StaticModelProvider,
};
pub use object::{Instantiator, ObjectService};
pub use persistence::{InMemoryPersistenceProvider, PersistenceAggregator, PersistenceService};
pub use topic::{Listener, Subscription, Topic, TopicService};
pub use types::{TypeDefinition, TypeService};
pub use view::{ViewDefinition, ViewProvider, ViewService};
