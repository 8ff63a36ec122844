// Copyright 2025 Cowboy AI, LLC.

//! Reading bundle definitions from disk

use super::bundle::Bundle;
use crate::errors::{FrameworkError, FrameworkResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File holding a bundle definition, relative to the bundle path
pub const BUNDLE_FILE: &str = "bundle.json";

/// Loads bundles relative to a root directory
#[derive(Debug, Clone)]
pub struct BundleLoader {
    root: PathBuf,
}

impl BundleLoader {
    /// Loader for bundles under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load one bundle; `None` when it cannot be read or parsed
    pub fn load_bundle(&self, path: &str) -> Option<Bundle> {
        let file = self.root.join(path).join(BUNDLE_FILE);
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) => {
                warn!(bundle = %path, file = %file.display(), error = %e, "Cannot read bundle; skipping");
                return None;
            }
        };
        match Bundle::from_json(path, &text) {
            Ok(bundle) => {
                debug!(bundle = %bundle.log_name(), "Loaded bundle");
                Some(bundle)
            }
            Err(e) => {
                warn!(bundle = %path, error = %e, "Malformed bundle definition; skipping");
                None
            }
        }
    }

    /// Load the listed bundles, skipping any that fail
    pub fn load(&self, paths: &[String]) -> Vec<Bundle> {
        paths.iter().filter_map(|p| self.load_bundle(p)).collect()
    }

    /// Load bundles named in a JSON array file, e.g. `bundles.json`
    ///
    /// Unlike individual bundles, an unreadable list is an error.
    pub fn load_list(&self, list_file: impl AsRef<Path>) -> FrameworkResult<Vec<Bundle>> {
        let file = self.root.join(list_file.as_ref());
        let text = fs::read_to_string(&file).map_err(|e| {
            FrameworkError::Configuration(format!("cannot read bundle list {}: {e}", file.display()))
        })?;
        let paths: Vec<String> = serde_json::from_str(&text)?;
        Ok(self.load(&paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bundle-loader-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_bundle(root: &Path, path: &str, json: &str) {
        let dir = root.join(path);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(BUNDLE_FILE), json).unwrap();
    }

    #[test]
    fn test_bad_bundles_are_skipped() {
        let root = scratch();
        write_bundle(&root, "good", r#"{"name": "Good", "extensions": {"types": [{"key": "a"}]}}"#);
        write_bundle(&root, "broken", "{ not json");

        let loader = BundleLoader::new(&root);
        let bundles = loader.load(&[
            "good".to_string(),
            "broken".to_string(),
            "absent".to_string(),
        ]);

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].log_name(), "Good (good)");
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_bundle_list_must_exist() {
        let root = scratch();
        let loader = BundleLoader::new(&root);
        assert!(matches!(
            loader.load_list("bundles.json"),
            Err(FrameworkError::Configuration(_))
        ));

        write_bundle(&root, "one", r#"{}"#);
        fs::write(root.join("bundles.json"), r#"["one"]"#).unwrap();
        assert_eq!(loader.load_list("bundles.json").unwrap().len(), 1);
        fs::remove_dir_all(root).unwrap();
    }
}
