//! depsync manifest management
//!
//! This crate reconciles a frontend project's `package.json` against the
//! dependency versions a platform ships as default bundles. It keeps a
//! shadow record of the versions the platform pinned last time inside the
//! manifest, which lets it upgrade platform-owned entries while leaving
//! user overrides alone.
//!
//! The manifest is written back only when its serialized content changed,
//! so an up-to-date project never triggers a downstream reinstall.

pub mod bundles;
pub mod errors;
pub mod install_state;
pub mod lockfile;
pub mod manifest;
pub mod manifest_writer;
pub mod migrations;
pub mod prune;
pub mod reconcile;
pub mod sync;
pub mod types;
pub mod version;

pub use bundles::{
    collect_defaults, Bundle, BundleProvider, BundleSelection, DefaultDependencies,
    DirBundleProvider, StaticBundleProvider,
};
pub use errors::{ManifestError, VersionError};
pub use install_state::{dependencies_hash, needs_install, InstallState};
pub use migrations::{MigrationRule, MigrationTable};
pub use prune::PluginPrune;
pub use reconcile::{
    reconcile_manifest, reconcile_section, ChangeKind, DependencyChange, ReconcileReport,
};
pub use sync::{record_install, ProjectLayout, SyncEngine, SyncOptions, SyncOutcome};
pub use types::{
    DependencyMap, ManifestState, PackageManifest, Section, SectionState, DEFAULT_SHADOW_KEY,
};
pub use version::FrontendVersion;

// Re-export persistence helpers for callers writing their own files
pub use manifest_writer::{to_pretty_json, write_if_changed};
