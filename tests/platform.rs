// Copyright 2025 Cowboy AI, LLC.

//! Platform assembly from configuration and bundles on disk

mod common;

use cim_capability::core::services::is_placeholder;
use cim_capability::errors::FrameworkError;
use cim_capability::FrameworkConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

fn scratch() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("platform-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_bundle(root: &Path, path: &str, definition: &str) {
    let dir = root.join(path);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("bundle.json"), definition).unwrap();
}

const NOTEBOOKS: &str = r#"{
    "name": "Notebooks",
    "extensions": {
        "types": [
            {"key": "notebook", "name": "Notebook", "model": {"composition": []}}
        ],
        "views": [
            {"key": "pages", "name": "Pages", "type": "notebook", "needs": ["composition"]}
        ]
    }
}"#;

#[tokio::test]
async fn test_capabilities_follow_the_model() {
    let platform = common::platform();
    let note = platform
        .instantiator()
        .unwrap()
        .instantiate(json!({"type": "note", "name": "n"}), Some("mct:n"));

    assert!(!note.has_capability("composition"));

    let mutated = note.mutation().unwrap().mutate(
        &mut |model: &mut Value| {
            model["composition"] = json!([]);
            true
        },
        None,
    );

    assert!(mutated);
    assert!(note.has_capability("composition"));
    assert!(note.composition().is_some());
}

#[test]
fn test_configuration_file_lists_bundles_to_load() {
    let root = scratch();
    write_bundle(&root, "apps/notebooks", NOTEBOOKS);
    write_bundle(&root, "apps/broken", "{ this is not json");
    let config_file = root.join("platform.toml");
    fs::write(
        &config_file,
        format!(
            r#"
            [persistence]
            default_space = "notes"
            spaces = ["notes"]

            [bundles]
            root = {root:?}
            list = ["apps/notebooks", "apps/broken", "apps/missing"]
            "#,
            root = root.display().to_string(),
        ),
    )
    .unwrap();

    let config = FrameworkConfig::load(&config_file).unwrap();
    let platform = cim_capability::Platform::builder()
        .with_config(config)
        .load_bundles()
        .build()
        .unwrap();

    let notebook = platform.types().unwrap().get_type("notebook").unwrap();
    assert_eq!(notebook.name.as_deref(), Some("Notebook"));

    let object = platform
        .instantiator()
        .unwrap()
        .instantiate(json!({"type": "notebook", "composition": []}), None);
    assert!(object.id().starts_with("notes:"));
    let views: Vec<String> = platform
        .views()
        .unwrap()
        .get_views(&object)
        .into_iter()
        .map(|view| view.key)
        .collect();
    assert!(views.contains(&"pages".to_string()), "{views:?}");
}

#[test]
fn test_missing_configuration_file_is_a_configuration_error() {
    let err = FrameworkConfig::load(scratch().join("absent.toml")).unwrap_err();
    assert!(matches!(err, FrameworkError::Configuration(_)));
}

#[test]
fn test_invalid_configuration_stops_the_builder() {
    let root = scratch();
    let config_file = root.join("platform.toml");
    fs::write(&config_file, "[queue]\nmax_attempts = 0\n").unwrap();

    assert!(matches!(
        FrameworkConfig::load(&config_file),
        Err(FrameworkError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_objects_round_trip_through_the_object_service() {
    let platform = common::platform();
    let object = common::folder(&platform, "mct:saved", None);
    object.persistence().unwrap().persist().await.unwrap();
    assert!(platform.cache().unwrap().invalidate("mct:saved"));

    let loaded = platform.get_object("mct:saved").await.unwrap().unwrap();

    assert_eq!(loaded.model_str("name").as_deref(), Some("mct:saved"));
    assert!(loaded.persistence().unwrap().is_persisted());

    let missing = platform.get_object("mct:nobody").await.unwrap().unwrap();
    assert!(is_placeholder(&missing.model()));
}
