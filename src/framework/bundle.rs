// Copyright 2025 Cowboy AI, LLC.

//! Bundles: packaged extension contributions

use super::extension::ExtensionDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SEPARATOR: &str = "/";

fn default_sources() -> String {
    "src".to_string()
}

fn default_resources() -> String {
    "res".to_string()
}

fn default_libraries() -> String {
    "lib".to_string()
}

fn default_tests() -> String {
    "test".to_string()
}

/// Bundle definition as read from `bundle.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleDefinition {
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Source folder, relative to the bundle
    #[serde(default = "default_sources")]
    pub sources: String,

    /// Resource folder, relative to the bundle
    #[serde(default = "default_resources")]
    pub resources: String,

    /// Library folder, relative to the bundle
    #[serde(default = "default_libraries")]
    pub libraries: String,

    /// Test folder, relative to the bundle
    #[serde(default = "default_tests")]
    pub tests: String,

    /// Free-form bundle configuration
    #[serde(default)]
    pub configuration: Value,

    /// Extensions by category, in declaration order
    #[serde(default)]
    pub extensions: IndexMap<String, Vec<ExtensionDefinition>>,
}

impl Default for BundleDefinition {
    fn default() -> Self {
        Self {
            name: None,
            sources: default_sources(),
            resources: default_resources(),
            libraries: default_libraries(),
            tests: default_tests(),
            configuration: Value::Object(Default::default()),
            extensions: IndexMap::new(),
        }
    }
}

impl BundleDefinition {
    /// Start a named definition
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Append an extension to a category
    pub fn extension(mut self, category: impl Into<String>, definition: ExtensionDefinition) -> Self {
        self.extensions
            .entry(category.into())
            .or_default()
            .push(definition);
        self
    }
}

/// A registered bundle
#[derive(Debug, Clone)]
pub struct Bundle {
    path: String,
    definition: BundleDefinition,
}

fn resolve_path(elements: &[&str]) -> String {
    elements
        .iter()
        .map(|e| e.trim_end_matches(SEPARATOR))
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

impl Bundle {
    /// Wrap a definition found at `path`
    pub fn new(path: impl Into<String>, definition: BundleDefinition) -> Self {
        Self {
            path: path.into(),
            definition,
        }
    }

    /// Parse a definition from JSON text
    pub fn from_json(path: impl Into<String>, json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(path, serde_json::from_str(json)?))
    }

    /// Bundle path
    pub fn path(&self) -> &str {
        &self.path
    }

    fn subpath(&self, folder: &str, file: Option<&str>) -> String {
        match file {
            Some(file) => resolve_path(&[&self.path, folder, file]),
            None => resolve_path(&[&self.path, folder]),
        }
    }

    /// Path of the source folder, or of a file within it
    pub fn source_path(&self, file: Option<&str>) -> String {
        self.subpath(&self.definition.sources, file)
    }

    /// Path of the resource folder, or of a file within it
    pub fn resource_path(&self, file: Option<&str>) -> String {
        self.subpath(&self.definition.resources, file)
    }

    /// Path of the library folder, or of a file within it
    pub fn library_path(&self, file: Option<&str>) -> String {
        self.subpath(&self.definition.libraries, file)
    }

    /// Path of the test folder, or of a file within it
    pub fn test_path(&self, file: Option<&str>) -> String {
        self.subpath(&self.definition.tests, file)
    }

    /// Name used in log messages
    pub fn log_name(&self) -> String {
        match &self.definition.name {
            Some(name) => format!("{name} ({})", self.path),
            None => self.path.clone(),
        }
    }

    /// Categories with at least one declared extension
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.definition.extensions.keys().map(String::as_str)
    }

    /// Extensions declared for a category
    pub fn extensions(&self, category: &str) -> &[ExtensionDefinition] {
        self.definition
            .extensions
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Raw definition
    pub fn definition(&self) -> &BundleDefinition {
        &self.definition
    }

    /// Bundle configuration
    pub fn configuration(&self) -> &Value {
        &self.definition.configuration
    }
}
