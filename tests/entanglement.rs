// Copyright 2025 Cowboy AI, LLC.

//! Linking, moving and copying objects between containers

mod common;

use cim_capability::core::services::ActionContext;
use cim_capability::errors::FrameworkError;
use common::{folder, place, platform};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn test_link_detection_follows_primary_location() {
    let platform = platform();
    let parent = folder(&platform, "mct:A", None);
    let child = folder(&platform, "mct:c", Some("mct:A"));
    let seen = place(&parent, &child);

    let location = seen.location().unwrap();
    assert_eq!(location.contextual_location().as_deref(), Some("mct:A"));
    assert!(location.is_original());
    assert!(!location.is_link());

    seen.mutation().unwrap().mutate(
        &mut |model: &mut Value| {
            model["location"] = json!("mct:B");
            true
        },
        None,
    );

    assert!(!location.is_original());
    assert!(location.is_link());
}

#[tokio::test]
async fn test_link_keeps_object_in_both_parents() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let b = folder(&platform, "mct:b", None);
    let child = place(&a, &folder(&platform, "mct:c", Some("mct:a")));
    let links = platform.link_service().unwrap();

    let linked = links.perform(&child, &b).await.unwrap();

    assert!(a.composition().unwrap().contains("mct:c"));
    assert!(b.composition().unwrap().contains("mct:c"));
    assert!(linked.location().unwrap().is_link());
    assert!(child.location().unwrap().is_original());
    assert!(matches!(
        links.validate(&child, &b),
        Err(FrameworkError::InvalidOperation { .. })
    ));

    let stored = platform.persistence().unwrap().read_object("mct", "b").await.unwrap().unwrap();
    assert_eq!(stored["composition"], json!(["mct:c"]));
}

#[tokio::test]
async fn test_move_transfers_original_and_updates_location() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let b = folder(&platform, "mct:b", None);
    let child = place(&a, &folder(&platform, "mct:c", Some("mct:a")));

    let moved = platform.move_service().unwrap().perform(&child, &b).await.unwrap();

    assert!(!a.composition().unwrap().contains("mct:c"));
    assert!(b.composition().unwrap().contains("mct:c"));
    let location = moved.location().unwrap();
    assert_eq!(location.location().as_deref(), Some("mct:b"));
    assert!(location.is_original());

    let persistence = platform.persistence().unwrap();
    let stored_a = persistence.read_object("mct", "a").await.unwrap().unwrap();
    let stored_c = persistence.read_object("mct", "c").await.unwrap().unwrap();
    assert_eq!(stored_a["composition"], json!([]));
    assert_eq!(stored_c["location"], "mct:b");
}

#[tokio::test]
async fn test_moving_a_link_keeps_primary_location() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let b = folder(&platform, "mct:b", None);
    let d = folder(&platform, "mct:d", None);
    place(&a, &folder(&platform, "mct:c", Some("mct:a")));
    let link = place(&b, &platform.get_object("mct:c").await.unwrap().unwrap());
    assert!(link.location().unwrap().is_link());

    let moved = platform.move_service().unwrap().perform(&link, &d).await.unwrap();

    assert!(!b.composition().unwrap().contains("mct:c"));
    assert!(d.composition().unwrap().contains("mct:c"));
    assert!(a.composition().unwrap().contains("mct:c"));
    assert_eq!(moved.location().unwrap().location().as_deref(), Some("mct:a"));
}

#[tokio::test]
async fn test_move_rejects_missing_or_same_parent() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let loose = folder(&platform, "mct:loose", None);
    let child = place(&a, &folder(&platform, "mct:c", Some("mct:a")));
    let moves = platform.move_service().unwrap();

    assert!(moves.validate(&loose, &a).is_err());
    assert!(moves.validate(&child, &a).is_err());
}

#[tokio::test]
async fn test_cannot_place_an_object_inside_itself() {
    let platform = platform();
    let root = folder(&platform, "mct:root", None);
    let a = place(&root, &folder(&platform, "mct:a", Some("mct:root")));
    let inner = place(&a, &folder(&platform, "mct:inner", Some("mct:a")));

    let result = platform.link_service().unwrap().validate(&a, &inner);

    assert!(matches!(result, Err(FrameworkError::InvalidOperation { .. })));
}

#[tokio::test]
async fn test_copy_duplicates_originals_and_relinks_links() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let b = folder(&platform, "mct:b", None);
    place(&a, &folder(&platform, "mct:c", Some("mct:a")));
    place(&a, &folder(&platform, "mct:l", Some("mct:elsewhere")));

    let copy = platform.copy_service().unwrap().perform(&a, &b).await.unwrap();

    assert_ne!(copy.id(), "mct:a");
    assert_eq!(b.composition().unwrap().ids(), vec![copy.id()]);
    assert_eq!(copy.model_str("location"), Some(b.id()));

    let children = copy.composition().unwrap().ids();
    assert_eq!(children.len(), 2);
    assert_ne!(children[0], "mct:c");
    assert_eq!(children[1], "mct:l");

    let copied_child = platform.get_object(&children[0]).await.unwrap().unwrap();
    assert_eq!(copied_child.model_str("name").as_deref(), Some("mct:c"));
    assert_eq!(copied_child.model_str("location"), Some(copy.id()));

    let persistence = platform.persistence().unwrap();
    let stored = persistence
        .read_object("mct", copy.identifier().key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["composition"], json!(children));
    assert_eq!(a.composition().unwrap().ids(), vec!["mct:c", "mct:l"]);
}

#[tokio::test]
async fn test_cross_space_link_and_move_are_denied() {
    let platform = platform();
    let foreign_parent = folder(&platform, "other:p", None);
    let foreign = place(&foreign_parent, &folder(&platform, "other:x", Some("other:p")));
    let target = folder(&platform, "mct:b", None);

    let link = platform.link_service().unwrap().validate(&foreign, &target);
    let moved = platform.move_service().unwrap().validate(&foreign, &target);

    assert!(matches!(link, Err(FrameworkError::Denied(ref d)) if d.category == "entanglement"));
    assert!(matches!(moved, Err(FrameworkError::Denied(_))));
    assert!(platform.copy_service().unwrap().validate(&foreign, &target).is_ok());
}

#[tokio::test]
async fn test_compose_actions_follow_validation() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let b = folder(&platform, "mct:b", None);
    let child = place(&a, &folder(&platform, "mct:c", Some("mct:a")));
    let actions = platform.actions().unwrap();

    let context = ActionContext::for_object(&b)
        .with_selected(&child)
        .with_category("contextual");
    let mut keys: Vec<String> = actions
        .get_actions(&context)
        .iter()
        .map(|action| action.metadata().key.clone())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["copy", "link", "move"]);

    let link = actions.get_actions(&context.clone().with_key("link"));
    assert!(link[0].perform().await.unwrap());
    assert!(b.composition().unwrap().contains("mct:c"));

    let after: Vec<String> = actions
        .get_actions(&context)
        .iter()
        .map(|action| action.metadata().key.clone())
        .collect();
    assert!(!after.contains(&"link".to_string()));
}

#[tokio::test]
async fn test_remove_action_takes_object_out_of_its_parent() {
    let platform = platform();
    let a = folder(&platform, "mct:a", None);
    let child = place(&a, &folder(&platform, "mct:c", Some("mct:a")));

    let remove = platform
        .actions()
        .unwrap()
        .get_actions(&ActionContext::for_object(&child).with_key("remove"));
    assert_eq!(remove.len(), 1);
    assert!(remove[0].perform().await.unwrap());

    assert!(!a.composition().unwrap().contains("mct:c"));
    assert!(child.location().unwrap().is_orphan());
}
