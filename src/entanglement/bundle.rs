// Copyright 2025 Cowboy AI, LLC.

//! The `platform/entanglement` bundle

use super::actions::{ComposeActionFactory, RemoveActionFactory};
use super::location::LocationFactory;
use super::policy::CrossSpacePolicy;
use super::services::{
    CopyService, EntanglementService, LinkService, MoveService, ENTANGLEMENT_CATEGORY,
};
use crate::core::bundle::{component, factory, IDENTIFIER_SERVICE, OBJECT_SERVICE, COMPONENTS};
use crate::core::services::ActionFactory;
use crate::framework::{
    instance, Bundle, BundleDefinition, ComponentKind, ExtensionDefinition, ImplementationRegistry,
    Instance, INJECTOR,
};
use crate::policy::bundle::POLICY_SERVICE;
use crate::policy::Policy;
use serde_json::json;
use std::sync::Arc;

/// Bundle path
pub const BUNDLE_PATH: &str = "platform/entanglement";

/// Link service
pub const LINK_SERVICE: &str = "linkService";
/// Move service
pub const MOVE_SERVICE: &str = "moveService";
/// Copy service
pub const COPY_SERVICE: &str = "copyService";

fn path(implementation: &str) -> String {
    format!("{BUNDLE_PATH}/src/{implementation}")
}

fn action<const N: usize>(key: &str, name: &str, implementation: &str, depends: [&str; N]) -> ExtensionDefinition {
    ExtensionDefinition::keyed(key)
        .implementation(implementation)
        .depends(depends)
        .with("name", json!(name))
        .with("category", json!("contextual"))
}

/// Bundle definition
pub fn bundle() -> Bundle {
    let definition = BundleDefinition::named("Entanglement")
        .extension(
            COMPONENTS,
            component(ComponentKind::Provider, LINK_SERVICE, "services/link", [POLICY_SERVICE]),
        )
        .extension(
            COMPONENTS,
            component(ComponentKind::Provider, MOVE_SERVICE, "services/move", [POLICY_SERVICE]),
        )
        .extension(
            COMPONENTS,
            component(ComponentKind::Provider, COPY_SERVICE, "services/copy", [POLICY_SERVICE]),
        )
        .extension(
            "capabilities",
            ExtensionDefinition::keyed("location")
                .implementation("capabilities/location")
                .depends([INJECTOR]),
        )
        .extension(
            "policies",
            ExtensionDefinition::keyed("crossSpace")
                .implementation("policies/cross-space")
                .depends([IDENTIFIER_SERVICE])
                .with("category", json!(ENTANGLEMENT_CATEGORY))
                .with("message", json!("Objects cannot be linked or moved to another persistence space")),
        )
        .extension("actions", action("link", "Create Link", "actions/link", [LINK_SERVICE]))
        .extension("actions", action("move", "Move", "actions/move", [MOVE_SERVICE]))
        .extension("actions", action("copy", "Duplicate", "actions/copy", [COPY_SERVICE]))
        .extension("actions", action("remove", "Remove", "actions/remove", []));
    Bundle::new(BUNDLE_PATH, definition)
}

fn service<S: EntanglementService + 'static>(service: S) -> Instance {
    let service: Arc<dyn EntanglementService> = Arc::new(service);
    instance(service)
}

fn compose(service: Arc<dyn EntanglementService>) -> Instance {
    let factory: Arc<dyn ActionFactory> = Arc::new(ComposeActionFactory::new(service));
    instance(factory)
}

/// Constructors for every implementation the bundle names
pub fn implementations() -> ImplementationRegistry {
    let mut registry = ImplementationRegistry::new();
    registry
        .register(path("services/link"), |injection| {
            Ok(service(LinkService::new(injection.service(POLICY_SERVICE)?)))
        })
        .register(path("services/move"), |injection| {
            Ok(service(MoveService::new(injection.service(POLICY_SERVICE)?)))
        })
        .register(path("services/copy"), |injection| {
            Ok(service(CopyService::new(injection.service(POLICY_SERVICE)?)))
        })
        .register(path("capabilities/location"), |injection| {
            factory(LocationFactory::new(injection.lazy(OBJECT_SERVICE)?))
        })
        .register(path("policies/cross-space"), |injection| {
            let policy: Arc<dyn Policy> = Arc::new(CrossSpacePolicy::new(injection.service(IDENTIFIER_SERVICE)?));
            Ok(instance(policy))
        })
        .register(path("actions/link"), |injection| Ok(compose(injection.service(LINK_SERVICE)?)))
        .register(path("actions/move"), |injection| Ok(compose(injection.service(MOVE_SERVICE)?)))
        .register(path("actions/copy"), |injection| Ok(compose(injection.service(COPY_SERVICE)?)))
        .register(path("actions/remove"), |_| {
            let factory: Arc<dyn ActionFactory> = Arc::new(RemoveActionFactory);
            Ok(instance(factory))
        });
    registry
}
