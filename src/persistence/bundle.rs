// Copyright 2025 Cowboy AI, LLC.

//! The `platform/persistence/queue` bundle

use super::decorator::QueuingCapabilityDecorator;
use super::dialog::{DialogService, HeadlessDialogService};
use super::queue::PersistenceQueue;
use crate::config::{QueueConfig, QUEUE_DEBOUNCE_MS, QUEUE_MAX_ATTEMPTS, QUEUE_OPERATION_TIMEOUT_MS};
use crate::core::bundle::{component, CAPABILITY_SERVICE, COMPONENTS};
use crate::core::CapabilityService;
use crate::framework::{instance, Bundle, BundleDefinition, ComponentKind, ImplementationRegistry};
use std::sync::Arc;

/// Bundle path
pub const BUNDLE_PATH: &str = "platform/persistence/queue";

/// Persistence queue
pub const PERSISTENCE_QUEUE: &str = "persistenceQueue";
/// Failure dialog
pub const DIALOG_SERVICE: &str = "dialogService";

/// Implementation path of the built-in dialog service; register over it to replace the dialog
pub const DIALOG_IMPLEMENTATION: &str = "platform/persistence/queue/src/dialog/headless";

fn path(implementation: &str) -> String {
    format!("{BUNDLE_PATH}/src/{implementation}")
}

/// Bundle definition
pub fn bundle() -> Bundle {
    let definition = BundleDefinition::named("Persistence Queue")
        .extension(
            COMPONENTS,
            component(ComponentKind::Provider, DIALOG_SERVICE, "dialog/headless", []),
        )
        .extension(
            COMPONENTS,
            component(
                ComponentKind::Provider,
                PERSISTENCE_QUEUE,
                "queue",
                [
                    DIALOG_SERVICE,
                    QUEUE_DEBOUNCE_MS,
                    QUEUE_OPERATION_TIMEOUT_MS,
                    QUEUE_MAX_ATTEMPTS,
                ],
            ),
        )
        .extension(
            COMPONENTS,
            component(
                ComponentKind::Decorator,
                CAPABILITY_SERVICE,
                "capabilities/queuing",
                [PERSISTENCE_QUEUE],
            )
            .priority("fallback"),
        );
    Bundle::new(BUNDLE_PATH, definition)
}

/// Constructors for every implementation the bundle names
pub fn implementations() -> ImplementationRegistry {
    let mut registry = ImplementationRegistry::new();
    registry
        .register(DIALOG_IMPLEMENTATION, |_| {
            let dialog: Arc<dyn DialogService> = Arc::new(HeadlessDialogService);
            Ok(instance(dialog))
        })
        .register(path("queue"), |injection| {
            let settings = QueueConfig {
                debounce_ms: injection.constant_as(QUEUE_DEBOUNCE_MS)?,
                operation_timeout_ms: injection.constant_as(QUEUE_OPERATION_TIMEOUT_MS)?,
                max_attempts: injection.constant_as(QUEUE_MAX_ATTEMPTS)?,
            };
            Ok(instance(Arc::new(PersistenceQueue::new(
                injection.service(DIALOG_SERVICE)?,
                &settings,
            ))))
        })
        .register(path("capabilities/queuing"), |injection| {
            let service: Arc<dyn CapabilityService> = Arc::new(QueuingCapabilityDecorator::new(
                injection.service(PERSISTENCE_QUEUE)?,
                injection.decorated()?,
            ));
            Ok(instance(service))
        });
    registry
}
