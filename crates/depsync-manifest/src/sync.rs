//! A full reconciliation pass over a project
//!
//! This module provides:
//! - `ProjectLayout`, the files a pass reads and writes
//! - `SyncEngine`, which loads, prunes, reconciles and persists a manifest
//! - `SyncOutcome`, what the caller needs to decide on running the installer

use crate::bundles::{collect_defaults, BundleProvider, BundleSelection};
use crate::errors::ManifestError;
use crate::install_state::{needs_install, InstallState};
use crate::lockfile::{generate_versions_lock, platform_pinned_versions, write_versions_lock};
use crate::manifest_writer::is_up_to_date;
use crate::migrations::MigrationTable;
use crate::prune::PluginPrune;
use crate::reconcile::{reconcile_manifest, ReconcileReport};
use crate::types::{PackageManifest, Section, DEFAULT_SHADOW_KEY, HASH_KEY};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// =============================================================================
// LAYOUT
// =============================================================================

/// Files touched by a pass, all resolved against the project directory
///
/// `package_dir` is the directory holding the manifest; the installer runs
/// there and `node_modules` lives next to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub package_dir: PathBuf,
    pub manifest: PathBuf,
    pub node_modules: PathBuf,
    pub install_state: PathBuf,
    pub versions_file: PathBuf,
}

impl ProjectLayout {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let mut layout = ProjectLayout {
            package_dir: project_dir.clone(),
            manifest: PathBuf::new(),
            node_modules: PathBuf::new(),
            install_state: PathBuf::new(),
            versions_file: project_dir.join("target").join("versions.json"),
            project_dir,
        };
        layout.set_manifest(Path::new("package.json"));
        layout
    }

    /// Move the manifest, along with `node_modules` and the install state
    pub fn set_manifest(&mut self, manifest: &Path) {
        self.manifest = self.resolve(manifest);
        self.package_dir = match self.manifest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => self.project_dir.clone(),
        };
        self.node_modules = self.package_dir.join("node_modules");
        self.install_state = self.node_modules.join(".vaadin").join("vaadin.json");
    }

    /// Resolve a possibly relative path against the project directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

// =============================================================================
// OPTIONS AND OUTCOME
// =============================================================================

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub shadow_key: String,
    pub selection: BundleSelection,
    pub migrations: MigrationTable,
    pub prune: Option<PluginPrune>,
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            shadow_key: DEFAULT_SHADOW_KEY.to_string(),
            selection: BundleSelection::default(),
            migrations: MigrationTable::default(),
            prune: Some(PluginPrune::new("@vaadin/", "target/plugins")),
            dry_run: false,
        }
    }
}

/// Result of a sync pass
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub report: ReconcileReport,
    pub pruned: Vec<String>,
    /// The manifest file was (or, on a dry run, would be) rewritten
    pub written: bool,
    pub needs_install: bool,
    pub hash: String,
}

// =============================================================================
// SYNC ENGINE
// =============================================================================

/// Runs reconciliation passes with a fixed bundle provider and options
pub struct SyncEngine<P> {
    provider: P,
    options: SyncOptions,
}

impl<P: BundleProvider> SyncEngine<P> {
    pub fn new(provider: P, options: SyncOptions) -> Self {
        SyncEngine { provider, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Load the manifest with pruning applied, without reconciling
    pub fn load(&self, layout: &ProjectLayout) -> Result<(PackageManifest, Vec<String>), ManifestError> {
        let mut manifest = PackageManifest::load_from_path(&layout.manifest, &self.options.shadow_key)?;
        let pruned = match &self.options.prune {
            Some(prune) => prune.apply(&mut manifest)?,
            None => Vec::new(),
        };
        Ok((manifest, pruned))
    }

    /// Reconcile the project's manifest and persist it if it changed
    pub fn sync(&self, layout: &ProjectLayout) -> Result<SyncOutcome, ManifestError> {
        let (mut manifest, pruned) = self.load(layout)?;
        let defaults = collect_defaults(&self.provider, &self.options.selection)?;
        let report = reconcile_manifest(
            &mut manifest,
            &defaults.dependencies,
            &defaults.dev_dependencies,
            &self.options.migrations,
        )?;

        let written = if self.options.dry_run {
            !is_up_to_date(&layout.manifest, &manifest.to_json_string()?)?
        } else {
            manifest.save_to_path(&layout.manifest)?
        };

        if written {
            info!("Updated {}", layout.manifest.display());
        } else {
            debug!("{} unchanged", layout.manifest.display());
        }

        let state = InstallState::load(&layout.install_state)?;
        let needs_install = needs_install(&layout.node_modules, &manifest, &state);

        Ok(SyncOutcome {
            report,
            pruned,
            written,
            needs_install,
            hash: manifest.hash().unwrap_or_default().to_string(),
        })
    }

    /// Write the versions lock for the project's current manifest
    pub fn write_versions(&self, layout: &ProjectLayout) -> Result<bool, ManifestError> {
        let (manifest, _) = self.load(layout)?;
        let state = manifest.state()?;
        let platform = platform_pinned_versions(&self.provider, state.section(Section::Dependencies))?;
        let lock = generate_versions_lock(platform, &state.dependencies.visible);
        write_versions_lock(&layout.versions_file, &lock)
    }
}

/// Remember `hash` as installed, after the installer succeeded
pub fn record_install(layout: &ProjectLayout, hash: &str) -> Result<bool, ManifestError> {
    let mut state = InstallState::load(&layout.install_state)?;
    state.merge([(HASH_KEY, hash)]);
    state.save()
}
