// Copyright 2025 Cowboy AI, LLC.

//! Error types for extension composition, capabilities and persistence

use thiserror::Error;

/// Errors raised while wiring the service graph at startup
///
/// Every variant is fatal: the platform refuses to start with a
/// partially composed graph.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompositionError {
    /// A declared dependency names nothing the injector can provide
    #[error("Missing dependency '{dependency}' required by {extension}")]
    MissingDependency {
        /// Name that could not be resolved
        dependency: String,
        /// Log name of the extension that declared it
        extension: String,
    },

    /// A constructor asked for a dependency it did not declare
    #[error("Undeclared dependency '{dependency}' requested by {extension}")]
    UndeclaredDependency {
        /// Name that was requested
        dependency: String,
        /// Log name of the extension that asked for it
        extension: String,
    },

    /// An extension names an implementation that was never registered
    #[error("No implementation registered at '{path}' for {extension}")]
    MissingImplementation {
        /// Bundle-resolved implementation path
        path: String,
        /// Log name of the extension
        extension: String,
    },

    /// Several providers for one service and nothing to merge them
    #[error("Service '{service}' has {count} providers but no aggregator")]
    MultipleProvidersWithoutAggregator {
        /// Service name
        service: String,
        /// Number of providers found
        count: usize,
    },

    /// More than one aggregator for one service
    #[error("Service '{service}' has {count} aggregators; exactly one is allowed")]
    MultipleAggregators {
        /// Service name
        service: String,
        /// Number of aggregators found
        count: usize,
    },

    /// Dependency cycle found during resolution
    #[error("Cyclic dependency: {}", chain.join(" -> "))]
    CyclicDependency {
        /// Resolution chain, ending with the repeated name
        chain: Vec<String>,
    },

    /// An instance did not have the type its consumer expected
    #[error("'{name}' is not a {expected}")]
    TypeMismatch {
        /// Name of the service or extension
        name: String,
        /// Expected Rust type
        expected: String,
    },

    /// A constructor failed while building an instance
    #[error("Failed to construct {extension}: {reason}")]
    ConstructionFailed {
        /// Log name of the extension
        extension: String,
        /// Why construction failed
        reason: String,
    },

    /// The injector was dropped while a lazy handle still referenced it
    #[error("Injector is no longer available to resolve '{0}'")]
    InjectorDropped(String),
}

/// Errors raised by persistence providers and the persistence queue
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceError {
    /// No provider serves the requested space
    #[error("Unknown persistence space: {0}")]
    UnknownSpace(String),

    /// Object already exists on create
    #[error("Object already exists: {space}/{key}")]
    AlreadyExists {
        /// Persistence space
        space: String,
        /// Object key
        key: String,
    },

    /// Object not found on update/delete
    #[error("Object not found: {space}/{key}")]
    NotFound {
        /// Persistence space
        space: String,
        /// Object key
        key: String,
    },

    /// Provider reported that the write did not take effect
    #[error("Persistence rejected for {0}")]
    Rejected(String),

    /// Backing store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Operation did not settle within the configured timeout
    #[error("Persistence of {label} timed out after {millis} ms")]
    Timeout {
        /// Queue entry label
        label: String,
        /// Timeout that elapsed
        millis: u64,
    },

    /// The user chose to discard a failed write
    #[error("Persistence of {label} discarded after {attempts} attempt(s): {reason}")]
    Discarded {
        /// Queue entry label
        label: String,
        /// Attempts made before discarding
        attempts: u32,
        /// Last failure
        reason: String,
    },
}

/// Errors raised by transactions
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransactionError {
    /// Commit, cancel or enqueue without an active transaction
    #[error("No transaction in progress")]
    NoActiveTransaction,

    /// An entry failed during commit; later entries did not run
    #[error("Commit failed at '{failed}': {reason} ({} committed, {} not run)", committed.len(), not_run.len())]
    CommitFailed {
        /// Labels of entries that completed
        committed: Vec<String>,
        /// Label of the entry that failed
        failed: String,
        /// Labels of entries that never ran
        not_run: Vec<String>,
        /// Failure message
        reason: String,
    },
}

/// Errors raised when using capabilities
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CapabilityError {
    /// The capability has no primary operation
    #[error("Capability '{0}' cannot be invoked")]
    NotInvocable(String),

    /// Arguments passed to `invoke` were not understood
    #[error("Invalid arguments for capability '{key}': {reason}")]
    InvalidArguments {
        /// Capability key
        key: String,
        /// What was wrong
        reason: String,
    },

    /// The object does not expose a required capability
    #[error("Object {id} has no '{key}' capability")]
    Unavailable {
        /// Object key string
        id: String,
        /// Capability key
        key: String,
    },

    /// A mutator declined the change
    #[error("Mutation of {0} was cancelled")]
    MutationCancelled(String),
}

/// A policy said no
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Denied by {category} policy: {message}")]
pub struct PolicyDenial {
    /// Policy category consulted
    pub category: String,
    /// Explanation shown to the user
    pub message: String,
}

/// Umbrella error for framework operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    /// Startup wiring failed
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// Persistence failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Transaction failed
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Capability misuse
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// A policy denied the operation
    #[error(transparent)]
    Denied(#[from] PolicyDenial),

    /// Invalid operation
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Reason why the operation is invalid
        reason: String,
    },

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for framework operations
pub type FrameworkResult<T> = Result<T, FrameworkError>;

impl From<serde_json::Error> for FrameworkError {
    fn from(err: serde_json::Error) -> Self {
        FrameworkError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for FrameworkError {
    fn from(err: std::io::Error) -> Self {
        FrameworkError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for FrameworkError {
    fn from(err: toml::de::Error) -> Self {
        FrameworkError::Configuration(err.to_string())
    }
}

impl FrameworkError {
    /// Create an invalid-operation error
    pub fn invalid(reason: impl Into<String>) -> Self {
        FrameworkError::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Check if this error must stop startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameworkError::Composition(_) | FrameworkError::Configuration(_))
    }

    /// Check if the user can recover by retrying or discarding
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameworkError::Persistence(_) | FrameworkError::Transaction(_)
        )
    }

    /// Check if this is a policy denial
    pub fn is_denial(&self) -> bool {
        matches!(self, FrameworkError::Denied(_))
    }
}
