// Copyright 2025 Cowboy AI, LLC.

//! Startup wiring
//!
//! [`Platform::builder`] registers the built-in bundles, the configuration
//! constants and any application bundles, then composes the service graph.
//! A platform that builds has every service composed; any composition
//! error is returned from [`PlatformBuilder::build`].

use crate::config::FrameworkConfig;
use crate::core::bundle::{
    ACTION_SERVICE, CACHE_SERVICE, CAPABILITY_SERVICE, IDENTIFIER_SERVICE, INSTANTIATE,
    MODEL_SERVICE, OBJECT_SERVICE, PERSISTENCE_SERVICE, TOPIC, TYPE_SERVICE, VIEW_SERVICE,
};
use crate::core::services::{
    ActionService, IdentifierService, Instantiator, ModelCache, ModelService, ObjectService,
    PersistenceService, TopicService, TypeService, ViewService,
};
use crate::core::{CapabilityService, DomainObject};
use crate::entanglement::bundle::{COPY_SERVICE, LINK_SERVICE, MOVE_SERVICE};
use crate::entanglement::EntanglementService;
use crate::errors::FrameworkResult;
use crate::framework::{
    instance, Bundle, BundleDefinition, BundleLoader, ExtensionDefinition, ExtensionRegistry,
    ImplementationRegistry, Injection, Injector, Instance, CONSTANTS,
};
use crate::persistence::bundle::{DIALOG_IMPLEMENTATION, PERSISTENCE_QUEUE};
use crate::persistence::{DialogService, PersistenceQueue};
use crate::policy::bundle::POLICY_SERVICE;
use crate::policy::PolicyService;
use crate::transaction::bundle::{TRANSACTION_MANAGER, TRANSACTION_SERVICE};
use crate::transaction::{TransactionManager, TransactionService};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Path of the bundle carrying configuration constants
pub const FRAMEWORK_BUNDLE: &str = "platform/framework";

/// Id of the root object
pub const ROOT: &str = "ROOT";

fn framework_bundle(config: &FrameworkConfig) -> Bundle {
    let definition = config.constants().into_iter().fold(
        BundleDefinition::named("Framework"),
        |definition, (key, value)| {
            definition.extension(CONSTANTS, ExtensionDefinition::keyed(key).with("value", value))
        },
    );
    Bundle::new(FRAMEWORK_BUNDLE, definition)
}

fn builtin_bundles() -> Vec<Bundle> {
    vec![
        crate::core::bundle::bundle(),
        crate::policy::bundle::bundle(),
        crate::transaction::bundle::bundle(),
        crate::persistence::bundle::bundle(),
        crate::entanglement::bundle::bundle(),
    ]
}

fn builtin_implementations() -> ImplementationRegistry {
    let mut registry = crate::core::bundle::implementations();
    registry.extend(crate::policy::bundle::implementations());
    registry.extend(crate::transaction::bundle::implementations());
    registry.extend(crate::persistence::bundle::implementations());
    registry.extend(crate::entanglement::bundle::implementations());
    registry
}

/// Collects configuration, bundles and implementations
#[derive(Default)]
pub struct PlatformBuilder {
    config: FrameworkConfig,
    bundles: Vec<Bundle>,
    implementations: ImplementationRegistry,
    dialog: Option<Arc<dyn DialogService>>,
}

impl PlatformBuilder {
    /// Use `config` instead of the defaults
    pub fn with_config(mut self, config: FrameworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Add an application bundle, registered after the built-in ones
    pub fn bundle(mut self, bundle: Bundle) -> Self {
        self.bundles.push(bundle);
        self
    }

    /// Register a constructor for a bundle-resolved implementation path
    ///
    /// Replaces a built-in constructor registered at the same path.
    pub fn implementation<F>(mut self, path: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Injection) -> FrameworkResult<Instance> + Send + Sync + 'static,
    {
        self.implementations.register(path, constructor);
        self
    }

    /// Register every constructor in `registry`
    pub fn implementations(mut self, registry: ImplementationRegistry) -> Self {
        self.implementations.extend(registry);
        self
    }

    /// Resolve persistence failures through `dialog` instead of discarding them
    pub fn dialog_service(mut self, dialog: Arc<dyn DialogService>) -> Self {
        self.dialog = Some(dialog);
        self
    }

    /// Add the bundles listed in the configuration's `bundles` section
    ///
    /// Bundles that cannot be read are skipped with a warning.
    pub fn load_bundles(mut self) -> Self {
        let root = self
            .config
            .bundles
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let loaded = BundleLoader::new(root).load(&self.config.bundles.list);
        self.bundles.extend(loaded);
        self
    }

    /// Compose the service graph
    pub fn build(self) -> FrameworkResult<Platform> {
        self.config.validate()?;

        let mut registry = ExtensionRegistry::new();
        registry.register_bundle(&framework_bundle(&self.config));
        for bundle in builtin_bundles().iter().chain(&self.bundles) {
            registry.register_bundle(bundle);
        }

        let mut implementations = builtin_implementations();
        implementations.extend(self.implementations);
        if let Some(dialog) = self.dialog {
            implementations.register(DIALOG_IMPLEMENTATION, move |_| Ok(instance(dialog.clone())));
        }

        let injector = Injector::new(registry, implementations);
        injector.bootstrap()?;
        info!(
            bundles = injector.registry().bundles().len(),
            application_bundles = self.bundles.len(),
            "Platform started"
        );
        Ok(Platform {
            config: self.config,
            injector,
        })
    }
}

/// A composed service graph
#[derive(Clone)]
pub struct Platform {
    config: FrameworkConfig,
    injector: Arc<Injector>,
}

impl Platform {
    /// Start configuring a platform
    pub fn builder() -> PlatformBuilder {
        PlatformBuilder::default()
    }

    /// Configuration the platform was built with
    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// Injector holding the composed services
    pub fn injector(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// A composed service as `T`
    pub fn service<T: Clone + 'static>(&self, name: &str) -> FrameworkResult<T> {
        self.injector.service(name)
    }

    /// A configuration constant
    pub fn constant(&self, key: &str) -> Option<&Value> {
        self.injector.constant(key)
    }

    /// Topic registry
    pub fn topics(&self) -> FrameworkResult<Arc<TopicService>> {
        self.service(TOPIC)
    }

    /// Identifier service
    pub fn identifiers(&self) -> FrameworkResult<Arc<IdentifierService>> {
        self.service(IDENTIFIER_SERVICE)
    }

    /// Model cache
    pub fn cache(&self) -> FrameworkResult<Arc<ModelCache>> {
        self.service(CACHE_SERVICE)
    }

    /// Persistence service
    pub fn persistence(&self) -> FrameworkResult<Arc<dyn PersistenceService>> {
        self.service(PERSISTENCE_SERVICE)
    }

    /// Model service
    pub fn models(&self) -> FrameworkResult<Arc<dyn ModelService>> {
        self.service(MODEL_SERVICE)
    }

    /// Capability service, with every decorator applied
    pub fn capabilities(&self) -> FrameworkResult<Arc<dyn CapabilityService>> {
        self.service(CAPABILITY_SERVICE)
    }

    /// Object instantiation
    pub fn instantiator(&self) -> FrameworkResult<Arc<Instantiator>> {
        self.service(INSTANTIATE)
    }

    /// Object service
    pub fn objects(&self) -> FrameworkResult<Arc<ObjectService>> {
        self.service(OBJECT_SERVICE)
    }

    /// Type service
    pub fn types(&self) -> FrameworkResult<Arc<TypeService>> {
        self.service(TYPE_SERVICE)
    }

    /// Action service
    pub fn actions(&self) -> FrameworkResult<Arc<dyn ActionService>> {
        self.service(ACTION_SERVICE)
    }

    /// View service
    pub fn views(&self) -> FrameworkResult<Arc<dyn ViewService>> {
        self.service(VIEW_SERVICE)
    }

    /// Policy service
    pub fn policies(&self) -> FrameworkResult<Arc<dyn PolicyService>> {
        self.service(POLICY_SERVICE)
    }

    /// Transaction service
    pub fn transactions(&self) -> FrameworkResult<Arc<TransactionService>> {
        self.service(TRANSACTION_SERVICE)
    }

    /// Transaction manager
    pub fn transaction_manager(&self) -> FrameworkResult<Arc<TransactionManager>> {
        self.service(TRANSACTION_MANAGER)
    }

    /// Persistence queue
    pub fn queue(&self) -> FrameworkResult<Arc<PersistenceQueue>> {
        self.service(PERSISTENCE_QUEUE)
    }

    /// Link service
    pub fn link_service(&self) -> FrameworkResult<Arc<dyn EntanglementService>> {
        self.service(LINK_SERVICE)
    }

    /// Move service
    pub fn move_service(&self) -> FrameworkResult<Arc<dyn EntanglementService>> {
        self.service(MOVE_SERVICE)
    }

    /// Copy service
    pub fn copy_service(&self) -> FrameworkResult<Arc<dyn EntanglementService>> {
        self.service(COPY_SERVICE)
    }

    /// Load an object by id
    pub async fn get_object(&self, id: &str) -> FrameworkResult<Option<DomainObject>> {
        self.objects()?.get_object(id).await
    }

    /// The root object
    pub async fn root(&self) -> FrameworkResult<Option<DomainObject>> {
        self.get_object(ROOT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PERSISTENCE_SPACE;
    use serde_json::json;

    #[tokio::test]
    async fn test_default_platform_composes() {
        let platform = Platform::builder().build().unwrap();

        assert_eq!(platform.constant(PERSISTENCE_SPACE), Some(&json!("mct")));
        let root = platform.root().await.unwrap().unwrap();
        assert_eq!(root.model_str("type").as_deref(), Some("root"));
        for key in ["composition", "mutation", "persistence", "location", "editor", "type"] {
            assert!(root.has_capability(key), "root lacks {key}");
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = FrameworkConfig::default();
        config.cache.capacity = 0;
        assert!(Platform::builder().with_config(config).build().is_err());
    }
}
