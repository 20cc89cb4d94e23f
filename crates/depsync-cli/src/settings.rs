//! Effective settings for a command
//!
//! Command-line flags win over the config file, which wins over the
//! built-in defaults.

use crate::common::ProjectArgs;
use crate::errors::CliError;
use depsync_config::Config;
use depsync_manifest::{
    BundleSelection, DirBundleProvider, MigrationRule, MigrationTable, PluginPrune, ProjectLayout,
    SyncEngine, SyncOptions, DEFAULT_SHADOW_KEY,
};
use depsync_logger as logger;
use std::path::{Path, PathBuf};

const DEFAULT_PLUGIN_SCOPE: &str = "@vaadin/";
const DEFAULT_PLUGIN_DIR: &str = "target/plugins";

#[derive(Debug, Clone)]
pub struct Settings {
    pub layout: ProjectLayout,
    pub resources: PathBuf,
    pub options: SyncOptions,
}

impl Settings {
    pub fn resolve(config: &Config, args: &ProjectArgs) -> Result<Self, CliError> {
        let project_dir = match &args.project {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        if !project_dir.is_dir() {
            return Err(CliError::ProjectNotFound(project_dir));
        }

        let mut layout = ProjectLayout::new(project_dir);
        if let Some(manifest) = args.manifest.as_deref().or(config.manifest.as_deref().map(Path::new)) {
            layout.set_manifest(manifest);
        }
        if let Some(versions_file) = &config.versions_file {
            layout.versions_file = layout.resolve(Path::new(versions_file));
        }
        if let Some(install_state) = &config.install_state {
            layout.install_state = layout.resolve(Path::new(install_state));
        }

        let resources = args
            .resources
            .clone()
            .or_else(|| config.resources.as_ref().map(PathBuf::from))
            .ok_or(CliError::MissingResources)?;
        let resources = layout.resolve(&resources);
        if !resources.is_dir() {
            return Err(CliError::ResourcesNotFound(resources));
        }

        let selection = BundleSelection {
            react: args.react_flag().or(config.react).unwrap_or(true),
            hilla: args.hilla_flag().or(config.hilla).unwrap_or(false),
            extra: config.extra_bundles.clone(),
        };

        let migrations = MigrationTable::default().with_rules(
            config
                .migrations
                .iter()
                .map(|entry| MigrationRule::new(&entry.package, &entry.legacy_marker)),
        );

        let prune = PluginPrune::new(
            config.plugin_scope.as_deref().unwrap_or(DEFAULT_PLUGIN_SCOPE),
            config.plugin_dir.as_deref().unwrap_or(DEFAULT_PLUGIN_DIR),
        );

        let options = SyncOptions {
            shadow_key: config
                .shadow_key
                .clone()
                .unwrap_or_else(|| DEFAULT_SHADOW_KEY.to_string()),
            selection,
            migrations,
            prune: Some(prune),
            dry_run: false,
        };

        logger::debug(&format!(
            "Project {}, manifest {}, resources {}",
            layout.project_dir.display(),
            layout.manifest.display(),
            resources.display()
        ));

        Ok(Settings {
            layout,
            resources,
            options,
        })
    }

    pub fn engine(&self) -> SyncEngine<DirBundleProvider> {
        SyncEngine::new(DirBundleProvider::new(&self.resources), self.options.clone())
    }
}
