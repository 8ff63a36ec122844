// Copyright 2025 Cowboy AI, LLC.

//! Policy decisions over the composed graph

mod common;

use cim_capability::core::services::{Action, ActionContext, ActionMetadata};
use cim_capability::framework::instance;
use cim_capability::policy::{Policy, PolicyProvider, PolicyService};
use cim_capability::{Bundle, BundleDefinition, ExtensionDefinition, FrameworkResult, Platform};
use common::{folder, place};
use proptest::prelude::*;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

struct Fixed(bool);

impl Policy for Fixed {
    fn allow(&self, _: &dyn Any, _: &dyn Any) -> bool {
        self.0
    }
}

proptest! {
    #[test]
    fn prop_allow_is_the_conjunction_of_five_policies(answers in prop::array::uniform5(any::<bool>())) {
        let provider = PolicyProvider::from_policies(
            answers
                .iter()
                .map(|&answer| ("action".to_string(), None, Arc::new(Fixed(answer)) as Arc<dyn Policy>))
                .collect(),
        );

        prop_assert_eq!(provider.allow("action", &(), &()), answers.iter().all(|&a| a));
        prop_assert!(provider.allow("view", &(), &()));
    }
}

/// Denies one action key
struct NoCopies;

impl Policy for NoCopies {
    fn allow(&self, candidate: &dyn Any, _context: &dyn Any) -> bool {
        candidate
            .downcast_ref::<Arc<dyn Action>>()
            .map_or(true, |action| action.metadata().key != "copy")
    }
}

fn platform_without_copies() -> Platform {
    let bundle = Bundle::new(
        "test/no-copies",
        BundleDefinition::named("No Copies").extension(
            "policies",
            ExtensionDefinition::keyed("noCopies")
                .implementation("policy")
                .with("category", json!("action"))
                .with("message", json!("Copies are disabled")),
        ),
    );
    Platform::builder()
        .bundle(bundle)
        .implementation("test/no-copies/src/policy", |_| {
            let policy: Arc<dyn Policy> = Arc::new(NoCopies);
            Ok(instance(policy))
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_action_policies_filter_available_actions() {
    let platform = platform_without_copies();
    let a = folder(&platform, "mct:a", None);
    let b = folder(&platform, "mct:b", None);
    let child = place(&a, &folder(&platform, "mct:c", Some("mct:a")));

    let context = ActionContext::for_object(&b)
        .with_selected(&child)
        .with_category("contextual");
    let mut keys: Vec<String> = platform
        .actions()
        .unwrap()
        .get_actions(&context)
        .iter()
        .map(|action| action.metadata().key.clone())
        .collect();
    keys.sort();

    assert_eq!(keys, vec!["link", "move"]);
}

#[tokio::test]
async fn test_composition_policy_respects_contains() {
    let bundle = Bundle::new(
        "test/types",
        BundleDefinition::named("Types")
            .extension(
                "types",
                ExtensionDefinition::keyed("notebook")
                    .with("name", json!("Notebook"))
                    .with("contains", json!(["note"]))
                    .with("model", json!({"composition": []})),
            )
            .extension("types", ExtensionDefinition::keyed("note").with("name", json!("Note"))),
    );
    let platform = Platform::builder().bundle(bundle).build().unwrap();
    let instantiator = platform.instantiator().unwrap();
    let notebook = instantiator.instantiate(json!({"type": "notebook", "composition": []}), Some("mct:nb"));
    let note = instantiator.instantiate(json!({"type": "note"}), Some("mct:note"));
    let other = folder(&platform, "mct:f", None);
    let policies = platform.policies().unwrap();

    assert!(policies.allow("composition", &note, &notebook));
    let denial = policies.check("composition", &other, &notebook).unwrap_err();
    assert_eq!(denial.message, "Objects of this type cannot be placed here");
    assert!(!policies.allow("composition", &notebook, &note));
    assert!(platform.link_service().unwrap().validate(&other, &notebook).is_err());
}

struct Named(ActionMetadata);

#[async_trait::async_trait]
impl Action for Named {
    fn metadata(&self) -> &ActionMetadata {
        &self.0
    }

    async fn perform(&self) -> FrameworkResult<bool> {
        Ok(false)
    }
}

#[test]
fn test_denials_carry_the_declared_message() {
    let platform = platform_without_copies();
    let policies = platform.policies().unwrap();
    let copy: Arc<dyn Action> = Arc::new(Named(ActionMetadata {
        key: "copy".to_string(),
        ..Default::default()
    }));

    let denial = policies.check("action", &copy, &ActionContext::default()).unwrap_err();

    assert_eq!(denial.category, "action");
    assert_eq!(denial.message, "Copies are disabled");
}
