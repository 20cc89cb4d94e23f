//! Manifest operations - loading, saving and the visible/pinned state view
//!
//! The document is kept as an ordered JSON object so that keys this crate
//! does not manage (`name`, `scripts`, `overrides`, ...) survive a
//! reconciliation pass untouched and in place.

use crate::errors::ManifestError;
use crate::manifest_writer::{read_json_object, to_pretty_json, write_if_changed};
use crate::types::{DependencyMap, ManifestState, PackageManifest, Section, HASH_KEY};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

impl PackageManifest {
    /// Wrap an already parsed document, adding any missing sections
    pub fn from_document(
        document: Map<String, Value>,
        shadow_key: &str,
    ) -> Result<Self, ManifestError> {
        let mut manifest = PackageManifest {
            document,
            shadow_key: shadow_key.to_string(),
        };
        manifest.ensure_defaults()?;
        Ok(manifest)
    }

    /// Load `package.json`, or a default document when the file is missing
    pub fn load_from_path(path: &Path, shadow_key: &str) -> Result<Self, ManifestError> {
        match read_json_object(path)? {
            Some(document) => {
                debug!("Loaded manifest from {}", path.display());
                Self::from_document(document, shadow_key)
            }
            None => {
                info!("No manifest at {}, starting from defaults", path.display());
                let mut manifest = Self::skeleton(shadow_key);
                manifest.ensure_defaults()?;
                Ok(manifest)
            }
        }
    }

    /// Persist to `path` only if the serialized document changed
    pub fn save_to_path(&self, path: &Path) -> Result<bool, ManifestError> {
        let content = self.to_json_string()?;
        write_if_changed(path, &content)
    }

    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        to_pretty_json(&self.document)
    }

    /// Extract the visible and pinned maps of both sections
    pub fn state(&self) -> Result<ManifestState, ManifestError> {
        let mut state = ManifestState::default();
        for section in Section::ALL {
            let target = state.section_mut(section);
            target.visible = self.visible(section)?;
            target.pinned = self.pinned(section)?;
        }
        Ok(state)
    }

    /// Write a (reconciled) state back into the document
    ///
    /// Existing keys keep their position in the document.
    pub fn apply_state(&mut self, state: &ManifestState) -> Result<(), ManifestError> {
        for section in Section::ALL {
            let source = state.section(section);
            self.document
                .insert(section.key().to_string(), to_object(&source.visible));
            self.shadow_mut()?
                .insert(section.key().to_string(), to_object(&source.pinned));
        }
        Ok(())
    }

    /// Entries of a section as the user sees them
    pub fn visible(&self, section: Section) -> Result<DependencyMap, ManifestError> {
        string_map(self.document.get(section.key()), section.key())
    }

    /// Platform versions recorded in the shadow record for a section
    pub fn pinned(&self, section: Section) -> Result<DependencyMap, ManifestError> {
        let context = format!("{}.{}", self.shadow_key, section.key());
        string_map(self.shadow()?.get(section.key()), &context)
    }

    pub fn hash(&self) -> Option<&str> {
        self.document
            .get(&self.shadow_key)
            .and_then(|shadow| shadow.get(HASH_KEY))
            .and_then(Value::as_str)
    }

    pub fn set_hash(&mut self, hash: &str) -> Result<(), ManifestError> {
        self.shadow_mut()?
            .insert(HASH_KEY.to_string(), Value::from(hash));
        Ok(())
    }

    fn shadow(&self) -> Result<&Map<String, Value>, ManifestError> {
        self.document
            .get(&self.shadow_key)
            .and_then(Value::as_object)
            .ok_or_else(|| not_an_object(&self.shadow_key))
    }

    fn shadow_mut(&mut self) -> Result<&mut Map<String, Value>, ManifestError> {
        object_entry(&mut self.document, &self.shadow_key)
    }

    fn ensure_defaults(&mut self) -> Result<(), ManifestError> {
        for section in Section::ALL {
            object_entry(&mut self.document, section.key())?;
        }

        let shadow = object_entry(&mut self.document, &self.shadow_key)?;
        for section in Section::ALL {
            object_entry(shadow, section.key())?;
        }
        shadow
            .entry(HASH_KEY)
            .or_insert_with(|| Value::from(""));
        Ok(())
    }
}

fn object_entry<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>, ManifestError> {
    map.entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| not_an_object(key))
}

fn not_an_object(key: &str) -> ManifestError {
    ManifestError::Malformed(format!("'{}' must be a JSON object", key))
}

fn string_map(value: Option<&Value>, context: &str) -> Result<DependencyMap, ManifestError> {
    let Some(value) = value else {
        return Ok(DependencyMap::new());
    };
    let object = value.as_object().ok_or_else(|| not_an_object(context))?;

    object
        .iter()
        .map(|(name, version)| match version.as_str() {
            Some(version) => Ok((name.clone(), version.to_string())),
            None => Err(ManifestError::Malformed(format!(
                "version of '{}' in '{}' is not a string",
                name, context
            ))),
        })
        .collect()
}

fn to_object(map: &DependencyMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(name, version)| (name.clone(), Value::from(version.as_str())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_SHADOW_KEY;
    use serde_json::json;
    use tempfile::TempDir;

    fn manifest_from(value: Value) -> Result<PackageManifest, ManifestError> {
        match value {
            Value::Object(document) => PackageManifest::from_document(document, DEFAULT_SHADOW_KEY),
            _ => Err(ManifestError::Malformed("test input".to_string())),
        }
    }

    #[test]
    fn test_missing_file_loads_skeleton() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let manifest =
            PackageManifest::load_from_path(&temp_dir.path().join("package.json"), "vaadin")?;

        let keys: Vec<&str> = manifest.document().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["name", "license", "type", "dependencies", "devDependencies", "vaadin"]
        );
        assert_eq!(manifest.document()["name"], "no-name");
        assert_eq!(manifest.document()["license"], "UNLICENSED");
        assert_eq!(manifest.hash(), Some(""));
        Ok(())
    }

    #[test]
    fn test_unmanaged_keys_keep_their_position() -> Result<(), Box<dyn std::error::Error>> {
        let mut manifest = manifest_from(json!({
            "name": "app",
            "dependencies": { "lit": "3.1.0" },
            "scripts": { "build": "vite build" },
            "devDependencies": {},
            "overrides": { "lit": "$lit" }
        }))?;

        let mut state = manifest.state()?;
        state
            .dependencies
            .visible
            .insert("@vaadin/router".to_string(), "1.7.5".to_string());
        manifest.apply_state(&state)?;

        let keys: Vec<&str> = manifest.document().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["name", "dependencies", "scripts", "devDependencies", "overrides", "vaadin"]
        );
        let deps: Vec<&str> = manifest.document()["dependencies"]
            .as_object()
            .map(|deps| deps.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(deps, ["lit", "@vaadin/router"]);
        Ok(())
    }

    #[test]
    fn test_state_reads_visible_and_pinned() -> Result<(), Box<dyn std::error::Error>> {
        let manifest = manifest_from(json!({
            "dependencies": { "lit": "3.1.0" },
            "vaadin": { "dependencies": { "lit": "3.0.0" }, "devDependencies": { "vite": "5.0.0" } }
        }))?;

        let state = manifest.state()?;
        assert_eq!(state.dependencies.visible.get("lit").map(String::as_str), Some("3.1.0"));
        assert_eq!(state.dependencies.pinned.get("lit").map(String::as_str), Some("3.0.0"));
        assert!(state.dev_dependencies.visible.is_empty());
        assert_eq!(
            state.dev_dependencies.pinned.get("vite").map(String::as_str),
            Some("5.0.0")
        );
        Ok(())
    }

    #[test]
    fn test_non_string_version_is_malformed() -> Result<(), Box<dyn std::error::Error>> {
        let manifest = manifest_from(json!({ "dependencies": { "lit": 3 } }))?;
        assert!(matches!(manifest.state(), Err(ManifestError::Malformed(_))));
        Ok(())
    }

    #[test]
    fn test_non_object_section_is_malformed() {
        let result = manifest_from(json!({ "devDependencies": ["vite"] }));
        assert!(matches!(result, Err(ManifestError::Malformed(_))));
    }

    #[test]
    fn test_save_round_trip_is_stable() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("frontend").join("package.json");

        let manifest = PackageManifest::load_from_path(&path, "vaadin")?;
        assert!(manifest.save_to_path(&path)?);

        let reloaded = PackageManifest::load_from_path(&path, "vaadin")?;
        assert_eq!(reloaded, manifest);
        assert!(!reloaded.save_to_path(&path)?);
        Ok(())
    }

    #[test]
    fn test_set_hash() -> Result<(), Box<dyn std::error::Error>> {
        let mut manifest = manifest_from(json!({}))?;
        manifest.set_hash("abc123")?;
        assert_eq!(manifest.hash(), Some("abc123"));
        Ok(())
    }
}
