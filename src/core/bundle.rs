// Copyright 2025 Cowboy AI, LLC.

//! The `platform/core` bundle

use super::capabilities::{
    ActionFactoryCapability, CompositionFactory, InstantiationFactory, MutationFactory,
    PersistenceFactory, RelationshipFactory, TypedFactory, TypedKind, ViewFactory,
};
use super::capability::{CapabilityFactory, CapabilityService, CoreCapabilityService};
use super::services::{
    ActionProvider, ActionService, CachingModelDecorator, IdentifierService,
    InMemoryPersistenceProvider, Instantiator, MissingModelDecorator, ModelAggregator, ModelCache,
    ModelService, ObjectService, PersistedModelProvider, PersistenceAggregator,
    PersistenceService, StaticModelProvider, TopicService, TypeService, ViewProvider, ViewService,
};
use crate::config::{MODEL_CACHE_CAPACITY, PERSISTENCE_SPACE, PERSISTENCE_SPACES};
use crate::errors::FrameworkResult;
use crate::framework::{
    instance, Bundle, BundleDefinition, ComponentKind, ExtensionDefinition, ImplementationRegistry,
    Instance, INJECTOR,
};
use serde_json::json;
use std::sync::Arc;

/// Bundle path
pub const BUNDLE_PATH: &str = "platform/core";

/// Topic registry service
pub const TOPIC: &str = "topic";
/// Identifier service
pub const IDENTIFIER_SERVICE: &str = "identifierService";
/// Model cache service
pub const CACHE_SERVICE: &str = "cacheService";
/// Persistence service
pub const PERSISTENCE_SERVICE: &str = "persistenceService";
/// Model service
pub const MODEL_SERVICE: &str = "modelService";
/// Capability service
pub const CAPABILITY_SERVICE: &str = "capabilityService";
/// Instantiation service
pub const INSTANTIATE: &str = "instantiate";
/// Object service
pub const OBJECT_SERVICE: &str = "objectService";
/// Type service
pub const TYPE_SERVICE: &str = "typeService";
/// Action service
pub const ACTION_SERVICE: &str = "actionService";
/// View service
pub const VIEW_SERVICE: &str = "viewService";

/// Category of component extensions
pub const COMPONENTS: &str = "components";

/// Implementation path within this bundle
pub fn path(implementation: &str) -> String {
    format!("{BUNDLE_PATH}/src/{implementation}")
}

pub(crate) fn component<const N: usize>(
    kind: ComponentKind,
    service: &str,
    implementation: &str,
    depends: [&str; N],
) -> ExtensionDefinition {
    ExtensionDefinition::default()
        .implementation(implementation)
        .depends(depends)
        .component(kind, service)
}

fn capability<const N: usize>(key: &str, implementation: &str, depends: [&str; N]) -> ExtensionDefinition {
    ExtensionDefinition::keyed(key)
        .implementation(implementation)
        .depends(depends)
}

/// Bundle definition
pub fn bundle() -> Bundle {
    use ComponentKind::{Aggregator, Decorator, Provider};

    let definition = BundleDefinition::named("Core")
        .extension(COMPONENTS, component(Provider, TOPIC, "services/topic", []))
        .extension(
            COMPONENTS,
            component(Provider, IDENTIFIER_SERVICE, "services/identifier", [PERSISTENCE_SPACE]),
        )
        .extension(
            COMPONENTS,
            component(Provider, CACHE_SERVICE, "services/cache", [MODEL_CACHE_CAPACITY]),
        )
        .extension(
            COMPONENTS,
            component(Provider, PERSISTENCE_SERVICE, "persistence/memory", [PERSISTENCE_SPACES]),
        )
        .extension(
            COMPONENTS,
            component(Aggregator, PERSISTENCE_SERVICE, "persistence/aggregator", []),
        )
        .extension(
            COMPONENTS,
            component(
                Provider,
                MODEL_SERVICE,
                "models/persisted",
                [PERSISTENCE_SERVICE, IDENTIFIER_SERVICE],
            ),
        )
        .extension(
            COMPONENTS,
            component(Provider, MODEL_SERVICE, "models/static", ["models[]"]),
        )
        .extension(COMPONENTS, component(Aggregator, MODEL_SERVICE, "models/aggregator", []))
        .extension(
            COMPONENTS,
            component(Decorator, MODEL_SERVICE, "models/caching", [CACHE_SERVICE]).priority("mandatory"),
        )
        .extension(
            COMPONENTS,
            component(Decorator, MODEL_SERVICE, "models/missing", []).priority("fallback"),
        )
        .extension(
            COMPONENTS,
            component(Provider, CAPABILITY_SERVICE, "capabilities/provider", ["capabilities[]"]),
        )
        .extension(
            COMPONENTS,
            component(
                Provider,
                INSTANTIATE,
                "services/instantiate",
                [CAPABILITY_SERVICE, IDENTIFIER_SERVICE, CACHE_SERVICE],
            ),
        )
        .extension(
            COMPONENTS,
            component(Provider, OBJECT_SERVICE, "services/object", [MODEL_SERVICE, INSTANTIATE]),
        )
        .extension(COMPONENTS, component(Provider, TYPE_SERVICE, "types/provider", ["types[]"]))
        .extension(
            COMPONENTS,
            component(Provider, ACTION_SERVICE, "actions/provider", ["actions[]"]),
        )
        .extension(COMPONENTS, component(Provider, VIEW_SERVICE, "views/provider", ["views[]"]))
        .extension("capabilities", capability("composition", "capabilities/composition", [INJECTOR]))
        .extension("capabilities", capability("relationship", "capabilities/relationship", [INJECTOR]))
        .extension("capabilities", capability("type", "capabilities/type", [TYPE_SERVICE]))
        .extension("capabilities", capability("metadata", "capabilities/metadata", [TYPE_SERVICE]))
        .extension("capabilities", capability("delegation", "capabilities/delegation", [TYPE_SERVICE]))
        .extension("capabilities", capability("mutation", "capabilities/mutation", [TOPIC]))
        .extension(
            "capabilities",
            capability(
                "persistence",
                "capabilities/persistence",
                [PERSISTENCE_SERVICE, IDENTIFIER_SERVICE, CACHE_SERVICE],
            ),
        )
        .extension(
            "capabilities",
            capability("instantiation", "capabilities/instantiation", [INJECTOR, IDENTIFIER_SERVICE]),
        )
        .extension("capabilities", capability("action", "capabilities/action", [INJECTOR]))
        .extension("capabilities", capability("view", "capabilities/view", [INJECTOR]))
        .extension(
            "types",
            ExtensionDefinition::keyed("root")
                .with("name", json!("Root"))
                .with("model", json!({"composition": []})),
        )
        .extension(
            "types",
            ExtensionDefinition::keyed("folder")
                .with("name", json!("Folder"))
                .with("description", json!("A container for other objects"))
                .with("features", json!(["creation"]))
                .with("model", json!({"composition": []})),
        )
        .extension(
            "types",
            ExtensionDefinition::keyed("unknown")
                .with("name", json!("Unknown Type"))
                .priority("fallback"),
        )
        .extension(
            "models",
            ExtensionDefinition::keyed("ROOT").with(
                "model",
                json!({"type": "root", "name": "root", "composition": []}),
            ),
        );

    Bundle::new(BUNDLE_PATH, definition)
}

/// Constructors for every implementation the bundle names
pub fn implementations() -> ImplementationRegistry {
    let mut registry = ImplementationRegistry::new();
    registry
        .register(path("services/topic"), |_| Ok(instance(Arc::new(TopicService::new()))))
        .register(path("services/identifier"), |injection| {
            let space: String = injection.constant_as(PERSISTENCE_SPACE)?;
            Ok(instance(Arc::new(IdentifierService::new(space))))
        })
        .register(path("services/cache"), |injection| {
            let capacity: usize = injection.constant_as(MODEL_CACHE_CAPACITY)?;
            Ok(instance(Arc::new(ModelCache::new(capacity))))
        })
        .register(path("persistence/memory"), |injection| {
            let spaces: Vec<String> = injection.constant_as(PERSISTENCE_SPACES)?;
            let provider: Arc<dyn PersistenceService> = Arc::new(InMemoryPersistenceProvider::new(spaces));
            Ok(instance(provider))
        })
        .register(path("persistence/aggregator"), |injection| {
            let providers = injection.providers::<Arc<dyn PersistenceService>>()?;
            let service: Arc<dyn PersistenceService> = Arc::new(PersistenceAggregator::new(providers));
            Ok(instance(service))
        })
        .register(path("models/persisted"), |injection| {
            let service: Arc<dyn ModelService> = Arc::new(PersistedModelProvider::new(
                injection.service(PERSISTENCE_SERVICE)?,
                injection.service(IDENTIFIER_SERVICE)?,
            ));
            Ok(instance(service))
        })
        .register(path("models/static"), |injection| {
            let service: Arc<dyn ModelService> =
                Arc::new(StaticModelProvider::new(&injection.extensions("models[]")?));
            Ok(instance(service))
        })
        .register(path("models/aggregator"), |injection| {
            let service: Arc<dyn ModelService> =
                Arc::new(ModelAggregator::new(injection.providers::<Arc<dyn ModelService>>()?));
            Ok(instance(service))
        })
        .register(path("models/caching"), |injection| {
            let service: Arc<dyn ModelService> = Arc::new(CachingModelDecorator::new(
                injection.service(CACHE_SERVICE)?,
                injection.decorated()?,
            ));
            Ok(instance(service))
        })
        .register(path("models/missing"), |injection| {
            let service: Arc<dyn ModelService> =
                Arc::new(MissingModelDecorator::new(injection.decorated()?));
            Ok(instance(service))
        })
        .register(path("capabilities/provider"), |injection| {
            let service: Arc<dyn CapabilityService> =
                Arc::new(CoreCapabilityService::new(&injection.extensions("capabilities[]")?)?);
            Ok(instance(service))
        })
        .register(path("services/instantiate"), |injection| {
            Ok(instance(Arc::new(Instantiator::new(
                injection.service(CAPABILITY_SERVICE)?,
                injection.service(IDENTIFIER_SERVICE)?,
                injection.service(CACHE_SERVICE)?,
            ))))
        })
        .register(path("services/object"), |injection| {
            Ok(instance(Arc::new(ObjectService::new(
                injection.service(MODEL_SERVICE)?,
                injection.service(INSTANTIATE)?,
            ))))
        })
        .register(path("types/provider"), |injection| {
            Ok(instance(Arc::new(TypeService::new(&injection.extensions("types[]")?))))
        })
        .register(path("actions/provider"), |injection| {
            let service: Arc<dyn ActionService> =
                Arc::new(ActionProvider::new(&injection.extensions("actions[]")?)?);
            Ok(instance(service))
        })
        .register(path("views/provider"), |injection| {
            let service: Arc<dyn ViewService> =
                Arc::new(ViewProvider::new(&injection.extensions("views[]")?));
            Ok(instance(service))
        })
        .register(path("capabilities/composition"), |injection| {
            factory(CompositionFactory::new(injection.lazy(OBJECT_SERVICE)?))
        })
        .register(path("capabilities/relationship"), |injection| {
            factory(RelationshipFactory::new(injection.lazy(OBJECT_SERVICE)?))
        })
        .register(path("capabilities/type"), |injection| {
            factory(TypedFactory::new(TypedKind::Type, injection.service(TYPE_SERVICE)?))
        })
        .register(path("capabilities/metadata"), |injection| {
            factory(TypedFactory::new(TypedKind::Metadata, injection.service(TYPE_SERVICE)?))
        })
        .register(path("capabilities/delegation"), |injection| {
            factory(TypedFactory::new(TypedKind::Delegation, injection.service(TYPE_SERVICE)?))
        })
        .register(path("capabilities/mutation"), |injection| {
            factory(MutationFactory::new(injection.service(TOPIC)?))
        })
        .register(path("capabilities/persistence"), |injection| {
            factory(PersistenceFactory::new(
                injection.service(PERSISTENCE_SERVICE)?,
                injection.service(IDENTIFIER_SERVICE)?,
                injection.service(CACHE_SERVICE)?,
            ))
        })
        .register(path("capabilities/instantiation"), |injection| {
            factory(InstantiationFactory::new(
                injection.lazy(INSTANTIATE)?,
                injection.service(IDENTIFIER_SERVICE)?,
            ))
        })
        .register(path("capabilities/action"), |injection| {
            factory(ActionFactoryCapability::new(injection.lazy(ACTION_SERVICE)?))
        })
        .register(path("capabilities/view"), |injection| {
            factory(ViewFactory::new(injection.lazy(VIEW_SERVICE)?))
        });
    registry
}

/// Erase a capability factory into an instance
pub fn factory<F: CapabilityFactory + 'static>(factory: F) -> FrameworkResult<Instance> {
    let factory: Arc<dyn CapabilityFactory> = Arc::new(factory);
    Ok(instance(factory))
}
