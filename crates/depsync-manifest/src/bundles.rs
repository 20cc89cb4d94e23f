//! Default dependency bundles
//!
//! A bundle is a small `package.json` fragment shipped with the platform,
//! identified by a path-like id (`default`, `vite`, `hilla/components/lit`).
//! Which bundles apply depends on the project flavor, see `BundleSelection`.

use crate::errors::ManifestError;
use crate::types::{DependencyMap, Section};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// One bundle's dependency sections; a missing section is `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub dependencies: Option<DependencyMap>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: Option<DependencyMap>,
}

impl Bundle {
    pub fn section(&self, section: Section) -> Option<&DependencyMap> {
        match section {
            Section::Dependencies => self.dependencies.as_ref(),
            Section::DevDependencies => self.dev_dependencies.as_ref(),
        }
    }
}

/// Source of bundles and platform version files
pub trait BundleProvider {
    /// Load a bundle by id, `None` if it is not shipped
    fn bundle(&self, id: &str) -> Result<Option<Bundle>, ManifestError>;

    /// Load a flat name-to-version file by name, `None` if it is not shipped
    fn platform_versions(&self, name: &str) -> Result<Option<DependencyMap>, ManifestError>;
}

impl<P: BundleProvider + ?Sized> BundleProvider for &P {
    fn bundle(&self, id: &str) -> Result<Option<Bundle>, ManifestError> {
        (**self).bundle(id)
    }

    fn platform_versions(&self, name: &str) -> Result<Option<DependencyMap>, ManifestError> {
        (**self).platform_versions(name)
    }
}

// =============================================================================
// PROVIDERS
// =============================================================================

/// Bundles laid out on disk
///
/// ```text
/// <root>/dependencies/<id>/package.json
/// <root>/<name>.json
/// ```
#[derive(Debug, Clone)]
pub struct DirBundleProvider {
    root: PathBuf,
}

impl DirBundleProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirBundleProvider { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bundle_path(&self, id: &str) -> PathBuf {
        id.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.join("dependencies"), |path, part| path.join(part))
            .join("package.json")
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ManifestError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl BundleProvider for DirBundleProvider {
    fn bundle(&self, id: &str) -> Result<Option<Bundle>, ManifestError> {
        let path = self.bundle_path(id);
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        debug!("Reading bundle '{}' from {}", id, path.display());
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ManifestError::Parse { path, source })
    }

    fn platform_versions(&self, name: &str) -> Result<Option<DependencyMap>, ManifestError> {
        let path = self.root.join(format!("{}.json", name));
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ManifestError::Parse { path, source })
    }
}

/// In-memory bundles, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticBundleProvider {
    bundles: HashMap<String, Bundle>,
    versions: HashMap<String, DependencyMap>,
}

impl StaticBundleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, id: &str, bundle: Bundle) -> Self {
        self.bundles.insert(id.to_string(), bundle);
        self
    }

    pub fn with_platform_versions(mut self, name: &str, versions: DependencyMap) -> Self {
        self.versions.insert(name.to_string(), versions);
        self
    }
}

impl BundleProvider for StaticBundleProvider {
    fn bundle(&self, id: &str) -> Result<Option<Bundle>, ManifestError> {
        Ok(self.bundles.get(id).cloned())
    }

    fn platform_versions(&self, name: &str) -> Result<Option<DependencyMap>, ManifestError> {
        Ok(self.versions.get(name).cloned())
    }
}

// =============================================================================
// SELECTION
// =============================================================================

/// A bundle to read; optional bundles may be absent without complaint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub id: String,
    pub optional: bool,
}

impl BundleRequest {
    fn required(id: &str) -> Self {
        BundleRequest {
            id: id.to_string(),
            optional: false,
        }
    }

    fn optional(id: &str) -> Self {
        BundleRequest {
            id: id.to_string(),
            optional: true,
        }
    }
}

/// Project flavor deciding which bundles make up the defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSelection {
    pub react: bool,
    pub hilla: bool,
    pub extra: Vec<String>,
}

impl Default for BundleSelection {
    fn default() -> Self {
        BundleSelection {
            react: true,
            hilla: false,
            extra: Vec::new(),
        }
    }
}

impl BundleSelection {
    /// Bundles for `dependencies`, later entries win on conflicts
    pub fn dependency_bundles(&self) -> Vec<BundleRequest> {
        let mut requests = vec![BundleRequest::required("default")];
        if self.react {
            requests.push(BundleRequest::required("react-router"));
        } else {
            requests.push(BundleRequest::required("vaadin-router"));
        }
        requests.extend(self.hilla_components());
        requests.extend(self.extra.iter().map(|id| BundleRequest::required(id)));
        requests
    }

    /// Bundles for `devDependencies`, later entries win on conflicts
    pub fn dev_dependency_bundles(&self) -> Vec<BundleRequest> {
        let mut requests = vec![
            BundleRequest::required("default"),
            BundleRequest::required("vite"),
        ];
        requests.extend(self.hilla_components());
        if self.react {
            requests.push(BundleRequest::required("react-router"));
        }
        requests.extend(self.extra.iter().map(|id| BundleRequest::required(id)));
        requests
    }

    fn hilla_components(&self) -> Option<BundleRequest> {
        match (self.hilla, self.react) {
            (false, _) => None,
            (true, true) => Some(BundleRequest::optional("hilla/components/react")),
            (true, false) => Some(BundleRequest::optional("hilla/components/lit")),
        }
    }
}

/// Merged default requirements for both sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultDependencies {
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
}

/// Read and merge every selected bundle
///
/// Missing bundles and missing sections are logged and contribute nothing;
/// a bundle that exists but does not parse is an error.
pub fn collect_defaults<P: BundleProvider>(
    provider: &P,
    selection: &BundleSelection,
) -> Result<DefaultDependencies, ManifestError> {
    Ok(DefaultDependencies {
        dependencies: merge_bundles(
            provider,
            &selection.dependency_bundles(),
            Section::Dependencies,
        )?,
        dev_dependencies: merge_bundles(
            provider,
            &selection.dev_dependency_bundles(),
            Section::DevDependencies,
        )?,
    })
}

fn merge_bundles<P: BundleProvider>(
    provider: &P,
    requests: &[BundleRequest],
    section: Section,
) -> Result<DependencyMap, ManifestError> {
    let mut merged = DependencyMap::new();
    for request in requests {
        let Some(bundle) = provider.bundle(&request.id)? else {
            if !request.optional {
                error!("Unable to find package.json from '{}'", request.id);
            }
            continue;
        };
        match bundle.section(section) {
            Some(entries) => {
                for (name, version) in entries {
                    merged.insert(name.clone(), version.clone());
                }
            }
            None => warn!("Unable to find {} from '{}'", section.key(), request.id),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::deps;
    use tempfile::TempDir;

    fn ids(requests: &[BundleRequest]) -> Vec<&str> {
        requests.iter().map(|request| request.id.as_str()).collect()
    }

    #[test]
    fn test_react_selection() {
        let selection = BundleSelection::default();
        assert_eq!(
            ids(&selection.dependency_bundles()),
            ["default", "react-router"]
        );
        assert_eq!(
            ids(&selection.dev_dependency_bundles()),
            ["default", "vite", "react-router"]
        );
    }

    #[test]
    fn test_lit_selection_with_hilla() {
        let selection = BundleSelection {
            react: false,
            hilla: true,
            extra: vec!["charts".to_string()],
        };
        assert_eq!(
            ids(&selection.dependency_bundles()),
            ["default", "vaadin-router", "hilla/components/lit", "charts"]
        );
        assert_eq!(
            ids(&selection.dev_dependency_bundles()),
            ["default", "vite", "hilla/components/lit", "charts"]
        );
    }

    #[test]
    fn test_later_bundles_override_earlier_ones() -> Result<(), ManifestError> {
        let provider = StaticBundleProvider::new()
            .with_bundle(
                "default",
                Bundle {
                    dependencies: Some(deps(&[("lit", "3.0.0"), ("@polymer/polymer", "3.5.1")])),
                    dev_dependencies: Some(deps(&[("typescript", "5.3.0")])),
                },
            )
            .with_bundle(
                "react-router",
                Bundle {
                    dependencies: Some(deps(&[("lit", "3.1.0"), ("react-router-dom", "6.22.0")])),
                    dev_dependencies: None,
                },
            )
            .with_bundle(
                "vite",
                Bundle {
                    dependencies: None,
                    dev_dependencies: Some(deps(&[("vite", "5.1.0")])),
                },
            );

        let defaults = collect_defaults(&provider, &BundleSelection::default())?;
        assert_eq!(
            defaults.dependencies,
            deps(&[
                ("lit", "3.1.0"),
                ("@polymer/polymer", "3.5.1"),
                ("react-router-dom", "6.22.0")
            ])
        );
        assert_eq!(
            defaults.dev_dependencies,
            deps(&[("typescript", "5.3.0"), ("vite", "5.1.0")])
        );
        Ok(())
    }

    #[test]
    fn test_missing_bundles_are_empty() -> Result<(), ManifestError> {
        let defaults = collect_defaults(&StaticBundleProvider::new(), &BundleSelection::default())?;
        assert!(defaults.dependencies.is_empty());
        assert!(defaults.dev_dependencies.is_empty());
        Ok(())
    }

    #[test]
    fn test_dir_provider_reads_nested_ids() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let bundle_dir = temp_dir
            .path()
            .join("dependencies")
            .join("hilla")
            .join("components")
            .join("lit");
        fs::create_dir_all(&bundle_dir)?;
        fs::write(
            bundle_dir.join("package.json"),
            r#"{ "name": "hilla-lit", "dependencies": { "@vaadin/hilla-lit-form": "24.4.0" } }"#,
        )?;

        let provider = DirBundleProvider::new(temp_dir.path());
        let bundle = provider.bundle("hilla/components/lit")?;
        assert_eq!(
            bundle.and_then(|bundle| bundle.dependencies),
            Some(deps(&[("@vaadin/hilla-lit-form", "24.4.0")]))
        );
        assert!(provider.bundle("hilla/components/react")?.is_none());
        Ok(())
    }

    #[test]
    fn test_dir_provider_corrupt_bundle_is_error() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let bundle_dir = temp_dir.path().join("dependencies").join("default");
        fs::create_dir_all(&bundle_dir)?;
        fs::write(bundle_dir.join("package.json"), "{ not json")?;

        let provider = DirBundleProvider::new(temp_dir.path());
        assert!(matches!(
            provider.bundle("default"),
            Err(ManifestError::Parse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_dir_provider_platform_versions() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        fs::write(
            temp_dir.path().join("core-versions.json"),
            r#"{ "@vaadin/button": "24.4.0", "@vaadin/grid": "24.4.0" }"#,
        )?;

        let provider = DirBundleProvider::new(temp_dir.path());
        let versions = provider.platform_versions("core-versions")?;
        assert_eq!(versions.map(|versions| versions.len()), Some(2));
        assert!(provider.platform_versions("versions")?.is_none());
        Ok(())
    }
}
