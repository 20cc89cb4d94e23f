//! Versions lock generation
//!
//! The lock is a flat name-to-version map used to pin transitive
//! dependency versions. It starts from the platform version files and
//! falls back to the manifest's own `dependencies` for anything the
//! platform does not pin.

use crate::bundles::BundleProvider;
use crate::errors::ManifestError;
use crate::manifest_writer::{to_pretty_json, write_if_changed};
use crate::types::{DependencyMap, SectionState};
use std::path::Path;
use tracing::info;

/// Core platform versions, always expected
pub const CORE_VERSIONS: &str = "core-versions";

/// Full platform versions, overlaid on the core ones when present
pub const PLATFORM_VERSIONS: &str = "versions";

/// Platform pins that the user has not overridden in `dependencies`
pub fn platform_pinned_versions<P: BundleProvider>(
    provider: &P,
    dependencies: &SectionState,
) -> Result<DependencyMap, ManifestError> {
    let Some(mut versions) = provider.platform_versions(CORE_VERSIONS)? else {
        info!(
            "Couldn't find {}.json file to pin dependency versions for core components. \
             Transitive dependencies won't be pinned.",
            CORE_VERSIONS
        );
        return Ok(DependencyMap::new());
    };

    if let Some(overlay) = provider.platform_versions(PLATFORM_VERSIONS)? {
        versions.extend(overlay);
    }

    Ok(without_user_overrides(versions, dependencies))
}

/// Drop entries the user has set to something other than the platform pin
fn without_user_overrides(versions: DependencyMap, dependencies: &SectionState) -> DependencyMap {
    versions
        .into_iter()
        .filter(|(name, _)| match dependencies.visible.get(name) {
            Some(user) => dependencies.pinned.get(name) == Some(user),
            None => true,
        })
        .collect()
}

/// Combine platform pins with the manifest's dependencies
pub fn generate_versions_lock(
    platform: DependencyMap,
    manifest_dependencies: &DependencyMap,
) -> DependencyMap {
    if platform.is_empty() {
        return manifest_dependencies.clone();
    }

    let mut lock = platform;
    for (name, version) in manifest_dependencies {
        lock.entry(name.clone()).or_insert_with(|| version.clone());
    }
    lock
}

pub fn write_versions_lock(path: &Path, lock: &DependencyMap) -> Result<bool, ManifestError> {
    write_if_changed(path, &to_pretty_json(lock)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::deps;
    use crate::bundles::StaticBundleProvider;
    use tempfile::TempDir;

    #[test]
    fn test_without_platform_versions_lock_is_manifest_dependencies() {
        let manifest = deps(&[("lit", "3.1.0")]);
        assert_eq!(generate_versions_lock(DependencyMap::new(), &manifest), manifest);
    }

    #[test]
    fn test_manifest_dependencies_fill_gaps() {
        let lock = generate_versions_lock(
            deps(&[("@vaadin/button", "24.4.0"), ("lit", "3.1.0")]),
            &deps(&[("lit", "3.0.0"), ("date-fns", "2.29.3")]),
        );
        assert_eq!(
            lock,
            deps(&[
                ("@vaadin/button", "24.4.0"),
                ("lit", "3.1.0"),
                ("date-fns", "2.29.3")
            ])
        );
    }

    #[test]
    fn test_platform_versions_overlay_and_user_overrides() -> Result<(), ManifestError> {
        let provider = StaticBundleProvider::new()
            .with_platform_versions(
                CORE_VERSIONS,
                deps(&[("@vaadin/button", "24.4.0"), ("@vaadin/grid", "24.4.0")]),
            )
            .with_platform_versions(PLATFORM_VERSIONS, deps(&[("@vaadin/charts", "24.4.0")]));

        let dependencies = SectionState {
            visible: deps(&[("@vaadin/grid", "24.5.0"), ("@vaadin/button", "24.4.0")]),
            pinned: deps(&[("@vaadin/grid", "24.4.0"), ("@vaadin/button", "24.4.0")]),
        };

        let pinned = platform_pinned_versions(&provider, &dependencies)?;
        assert_eq!(
            pinned,
            deps(&[("@vaadin/button", "24.4.0"), ("@vaadin/charts", "24.4.0")])
        );

        let lock = generate_versions_lock(pinned, &dependencies.visible);
        assert_eq!(lock.get("@vaadin/grid").map(String::as_str), Some("24.5.0"));
        Ok(())
    }

    #[test]
    fn test_missing_core_versions_is_empty() -> Result<(), ManifestError> {
        let provider = StaticBundleProvider::new()
            .with_platform_versions(PLATFORM_VERSIONS, deps(&[("@vaadin/charts", "24.4.0")]));
        assert!(platform_pinned_versions(&provider, &SectionState::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_write_versions_lock_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("target").join("versions.json");
        let lock = deps(&[("lit", "3.1.0")]);

        assert!(write_versions_lock(&path, &lock)?);
        assert!(!write_versions_lock(&path, &lock)?);
        Ok(())
    }
}
