//! Removal of locally packaged build plugins from `devDependencies`
//!
//! The build installs its own plugins from a folder under the build
//! directory. Entries pointing there are removed before reconciliation so
//! that stale plugins never linger once the build stops packaging them.

use crate::errors::ManifestError;
use crate::types::{DependencyMap, PackageManifest};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginPrune {
    scope: String,
    target_prefix: String,
}

impl PluginPrune {
    /// `scope` is a package name prefix such as `@vaadin/`; `plugin_dir` is
    /// the project-relative folder the plugins are installed from.
    pub fn new(scope: &str, plugin_dir: &str) -> Self {
        let dir = plugin_dir.replace('\\', "/");
        let dir = dir.trim_start_matches("./").trim_matches('/');
        PluginPrune {
            scope: scope.to_string(),
            target_prefix: format!("./{}/", dir),
        }
    }

    pub fn target_prefix(&self) -> &str {
        &self.target_prefix
    }

    /// Remove matching entries, returning their names in document order
    pub fn prune(&self, dev_dependencies: &mut DependencyMap) -> Vec<String> {
        let removed: Vec<String> = dev_dependencies
            .iter()
            .filter(|(name, version)| {
                name.starts_with(&self.scope) && version.starts_with(&self.target_prefix)
            })
            .map(|(name, _)| name.clone())
            .collect();

        for name in &removed {
            dev_dependencies.shift_remove(name);
            debug!("Removed stale build plugin '{}'", name);
        }
        removed
    }

    /// Prune the visible `devDependencies` of a manifest
    pub fn apply(&self, manifest: &mut PackageManifest) -> Result<Vec<String>, ManifestError> {
        let mut state = manifest.state()?;
        let removed = self.prune(&mut state.dev_dependencies.visible);
        if !removed.is_empty() {
            manifest.apply_state(&state)?;
        }
        Ok(removed)
    }
}
