// Copyright 2025 Cowboy AI, LLC.

//! Fixtures shared by the integration tests

#![allow(dead_code)]

use cim_capability::core::DomainObject;
use cim_capability::Platform;
use serde_json::{json, Value};

/// A platform with only the built-in bundles
pub fn platform() -> Platform {
    Platform::builder().build().unwrap()
}

/// A folder model, optionally with a primary location
pub fn folder_model(name: &str, location: Option<&str>) -> Value {
    let mut model = json!({"type": "folder", "name": name, "composition": []});
    if let Some(location) = location {
        model["location"] = json!(location);
    }
    model
}

/// Instantiate a folder with a fixed id
pub fn folder(platform: &Platform, id: &str, location: Option<&str>) -> DomainObject {
    platform
        .instantiator()
        .unwrap()
        .instantiate(folder_model(id, location), Some(id))
}

/// Put `child` into `parent`, returning the child as seen through `parent`
pub fn place(parent: &DomainObject, child: &DomainObject) -> DomainObject {
    parent.composition().unwrap().add(child, None).unwrap()
}

/// Rename an object through its mutation capability
pub fn rename(object: &DomainObject, name: &str) -> bool {
    object.mutation().unwrap().mutate(
        &mut |model: &mut Value| {
            model["name"] = json!(name);
            true
        },
        None,
    )
}
