//! Installed dependency state
//!
//! The package installer only needs to run when the declared dependencies
//! differ from what was installed last. The manifest carries a hash of its
//! dependencies in the shadow record; the install state file inside
//! `node_modules` remembers the hash of the last successful install.

use crate::errors::ManifestError;
use crate::manifest_writer::{read_json_object, to_pretty_json, write_if_changed};
use crate::types::{ManifestState, PackageManifest, Section, HASH_KEY};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// blake3 hex digest of the visible dependencies of both sections
///
/// Entries are hashed in name order, so reordering keys in `package.json`
/// does not change the hash.
pub fn dependencies_hash(state: &ManifestState) -> String {
    let mut hasher = blake3::Hasher::new();
    for section in Section::ALL {
        hasher.update(section.key().as_bytes());
        hasher.update(b"\0");

        let mut entries: Vec<(&String, &String)> = state.section(section).visible.iter().collect();
        entries.sort();
        for (name, version) in entries {
            hasher.update(name.as_bytes());
            hasher.update(b"\0");
            hasher.update(version.as_bytes());
            hasher.update(b"\n");
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Contents of the install state file
#[derive(Debug, Clone, PartialEq)]
pub struct InstallState {
    path: PathBuf,
    content: Map<String, Value>,
}

impl InstallState {
    /// Load the state file, empty when it does not exist yet
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        Ok(InstallState {
            path: path.to_path_buf(),
            content: read_json_object(path)?.unwrap_or_default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn hash(&self) -> Option<&str> {
        self.content.get(HASH_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }

    /// Set entries, keeping any other keys already in the file
    pub fn merge<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.content.insert(key.into(), value.into());
        }
    }

    /// Write the state file if its content changed
    pub fn save(&self) -> Result<bool, ManifestError> {
        write_if_changed(&self.path, &to_pretty_json(&self.content)?)
    }
}

/// Whether the installer has to run for this manifest
pub fn needs_install(node_modules: &Path, manifest: &PackageManifest, state: &InstallState) -> bool {
    if !node_modules.is_dir() {
        return true;
    }
    state.hash() != manifest.hash()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DependencyMap, SectionState};
    use std::fs;
    use tempfile::TempDir;

    fn state_with(dependencies: &[(&str, &str)]) -> ManifestState {
        ManifestState {
            dependencies: SectionState {
                visible: dependencies
                    .iter()
                    .map(|(name, version)| ((*name).to_string(), (*version).to_string()))
                    .collect::<DependencyMap>(),
                pinned: DependencyMap::new(),
            },
            dev_dependencies: SectionState::default(),
        }
    }

    #[test]
    fn test_hash_ignores_key_order() {
        let first = dependencies_hash(&state_with(&[("lit", "3.1.0"), ("react", "18.2.0")]));
        let second = dependencies_hash(&state_with(&[("react", "18.2.0"), ("lit", "3.1.0")]));
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_hash_changes_with_versions() {
        let first = dependencies_hash(&state_with(&[("lit", "3.1.0")]));
        let second = dependencies_hash(&state_with(&[("lit", "3.1.1")]));
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_separates_sections() {
        let runtime = state_with(&[("lit", "3.1.0")]);
        let mut dev = ManifestState::default();
        dev.dev_dependencies.visible = runtime.dependencies.visible.clone();
        assert_ne!(dependencies_hash(&runtime), dependencies_hash(&dev));
    }

    #[test]
    fn test_merge_keeps_unrelated_keys() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(".vaadin").join("vaadin.json");
        fs::create_dir_all(temp_dir.path().join(".vaadin"))?;
        fs::write(&path, r#"{ "projectFolder": "/work/app" }"#)?;

        let mut state = InstallState::load(&path)?;
        state.merge([(HASH_KEY, "abc")]);
        assert!(state.save()?);
        assert!(!state.save()?);

        let reloaded = InstallState::load(&path)?;
        assert_eq!(reloaded.hash(), Some("abc"));
        assert_eq!(
            reloaded.get("projectFolder").and_then(Value::as_str),
            Some("/work/app")
        );
        Ok(())
    }

    #[test]
    fn test_needs_install() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let node_modules = temp_dir.path().join("node_modules");
        let mut manifest = PackageManifest::skeleton("vaadin");
        let mut state = InstallState::load(&node_modules.join(".vaadin").join("vaadin.json"))?;

        assert!(needs_install(&node_modules, &manifest, &state));

        fs::create_dir_all(&node_modules)?;
        manifest = PackageManifest::from_document(manifest.document().clone(), "vaadin")?;
        manifest.set_hash("abc")?;
        assert!(needs_install(&node_modules, &manifest, &state));

        state.merge([(HASH_KEY, "abc")]);
        assert!(!needs_install(&node_modules, &manifest, &state));
        Ok(())
    }
}
