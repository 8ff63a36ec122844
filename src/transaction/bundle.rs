// Copyright 2025 Cowboy AI, LLC.

//! The `platform/commonUI/edit` bundle

use super::decorator::TransactionCapabilityDecorator;
use super::editor::EditorFactory;
use super::manager::TransactionManager;
use super::service::TransactionService;
use crate::core::bundle::{component, factory, CAPABILITY_SERVICE, COMPONENTS};
use crate::core::CapabilityService;
use crate::framework::{
    instance, Bundle, BundleDefinition, ComponentKind, ExtensionDefinition, ImplementationRegistry,
};
use std::sync::Arc;

/// Bundle path
pub const BUNDLE_PATH: &str = "platform/commonUI/edit";

/// Transaction service
pub const TRANSACTION_SERVICE: &str = "transactionService";
/// Transaction manager
pub const TRANSACTION_MANAGER: &str = "transactionManager";

fn path(implementation: &str) -> String {
    format!("{BUNDLE_PATH}/src/{implementation}")
}

/// Bundle definition
pub fn bundle() -> Bundle {
    let definition = BundleDefinition::named("Edit Mode")
        .extension(
            COMPONENTS,
            component(ComponentKind::Provider, TRANSACTION_SERVICE, "services/transaction", []),
        )
        .extension(
            COMPONENTS,
            component(
                ComponentKind::Provider,
                TRANSACTION_MANAGER,
                "services/manager",
                [TRANSACTION_SERVICE],
            ),
        )
        .extension(
            COMPONENTS,
            component(
                ComponentKind::Decorator,
                CAPABILITY_SERVICE,
                "capabilities/transactional",
                [TRANSACTION_MANAGER],
            ),
        )
        .extension(
            "capabilities",
            ExtensionDefinition::keyed("editor")
                .implementation("capabilities/editor")
                .depends([TRANSACTION_SERVICE, TRANSACTION_MANAGER]),
        );
    Bundle::new(BUNDLE_PATH, definition)
}

/// Constructors for every implementation the bundle names
pub fn implementations() -> ImplementationRegistry {
    let mut registry = ImplementationRegistry::new();
    registry
        .register(path("services/transaction"), |_| {
            Ok(instance(Arc::new(TransactionService::new())))
        })
        .register(path("services/manager"), |injection| {
            Ok(instance(Arc::new(TransactionManager::new(
                injection.service(TRANSACTION_SERVICE)?,
            ))))
        })
        .register(path("capabilities/transactional"), |injection| {
            let service: Arc<dyn CapabilityService> = Arc::new(TransactionCapabilityDecorator::new(
                injection.service(TRANSACTION_MANAGER)?,
                injection.decorated()?,
            ));
            Ok(instance(service))
        })
        .register(path("capabilities/editor"), |injection| {
            factory(EditorFactory::new(
                injection.service(TRANSACTION_SERVICE)?,
                injection.service(TRANSACTION_MANAGER)?,
            ))
        });
    registry
}
