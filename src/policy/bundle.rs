// Copyright 2025 Cowboy AI, LLC.

//! The `platform/policy` bundle

use super::composition::{CompositionPolicy, COMPOSITION_CATEGORY};
use super::decorators::{PolicyActionDecorator, PolicyViewDecorator};
use super::service::{Policy, PolicyProvider, PolicyService};
use crate::core::bundle::{component, ACTION_SERVICE, COMPONENTS, TYPE_SERVICE, VIEW_SERVICE};
use crate::core::services::{ActionService, ViewService};
use crate::framework::{
    instance, Bundle, BundleDefinition, ComponentKind, ExtensionDefinition, ImplementationRegistry,
};
use serde_json::json;
use std::sync::Arc;

/// Bundle path
pub const BUNDLE_PATH: &str = "platform/policy";

/// Policy service
pub const POLICY_SERVICE: &str = "policyService";

fn path(implementation: &str) -> String {
    format!("{BUNDLE_PATH}/src/{implementation}")
}

/// Bundle definition
pub fn bundle() -> Bundle {
    let definition = BundleDefinition::named("Policy Service")
        .extension(
            COMPONENTS,
            component(ComponentKind::Provider, POLICY_SERVICE, "provider", ["policies[]"]),
        )
        .extension(
            COMPONENTS,
            component(ComponentKind::Decorator, ACTION_SERVICE, "actions", [POLICY_SERVICE]),
        )
        .extension(
            COMPONENTS,
            component(ComponentKind::Decorator, VIEW_SERVICE, "views", [POLICY_SERVICE]),
        )
        .extension(
            "policies",
            ExtensionDefinition::keyed("composition")
                .implementation("composition")
                .depends([TYPE_SERVICE])
                .with("category", json!(COMPOSITION_CATEGORY))
                .with("message", json!("Objects of this type cannot be placed here")),
        );
    Bundle::new(BUNDLE_PATH, definition)
}

/// Constructors for every implementation the bundle names
pub fn implementations() -> ImplementationRegistry {
    let mut registry = ImplementationRegistry::new();
    registry
        .register(path("provider"), |injection| {
            let service: Arc<dyn PolicyService> =
                Arc::new(PolicyProvider::new(&injection.extensions("policies[]")?)?);
            Ok(instance(service))
        })
        .register(path("actions"), |injection| {
            let service: Arc<dyn ActionService> = Arc::new(PolicyActionDecorator::new(
                injection.service(POLICY_SERVICE)?,
                injection.decorated()?,
            ));
            Ok(instance(service))
        })
        .register(path("views"), |injection| {
            let service: Arc<dyn ViewService> = Arc::new(PolicyViewDecorator::new(
                injection.service(POLICY_SERVICE)?,
                injection.decorated()?,
            ));
            Ok(instance(service))
        })
        .register(path("composition"), |injection| {
            let policy: Arc<dyn Policy> = Arc::new(CompositionPolicy::new(injection.service(TYPE_SERVICE)?));
            Ok(instance(policy))
        });
    registry
}
