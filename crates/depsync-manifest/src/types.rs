//! Core types for package manifest reconciliation
//!
//! This module provides:
//! - `PackageManifest`, the ordered `package.json` document
//! - `ManifestState`, the explicit visible/pinned view the reconciler works on
//! - `Section`, the two dependency sections a manifest carries

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Ordered dependency name to version-constraint mapping
pub type DependencyMap = IndexMap<String, String>;

/// Build a `DependencyMap` from name/version pairs, keeping their order
#[cfg(test)]
pub(crate) fn deps(entries: &[(&str, &str)]) -> DependencyMap {
    entries
        .iter()
        .map(|(name, version)| ((*name).to_string(), (*version).to_string()))
        .collect()
}

/// Key of the shadow record embedded in `package.json`
pub const DEFAULT_SHADOW_KEY: &str = "vaadin";

/// Key of the dependency hash inside the shadow record
pub const HASH_KEY: &str = "hash";

pub(crate) const NAME_KEY: &str = "name";
pub(crate) const NAME_DEFAULT: &str = "no-name";
pub(crate) const LICENSE_KEY: &str = "license";
pub(crate) const LICENSE_DEFAULT: &str = "UNLICENSED";
pub(crate) const TYPE_KEY: &str = "type";
pub(crate) const TYPE_DEFAULT: &str = "module";

// =============================================================================
// SECTION
// =============================================================================

/// A dependency section of `package.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Dependencies,
    DevDependencies,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Dependencies, Section::DevDependencies];

    /// The JSON key of this section
    pub fn key(self) -> &'static str {
        match self {
            Section::Dependencies => "dependencies",
            Section::DevDependencies => "devDependencies",
        }
    }
}

// =============================================================================
// RECONCILIATION STATE
// =============================================================================

/// Visible entries of one section and the platform versions pinned for it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionState {
    pub visible: DependencyMap,
    pub pinned: DependencyMap,
}

/// Both sections of a manifest, detached from the JSON document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestState {
    pub dependencies: SectionState,
    pub dev_dependencies: SectionState,
}

impl ManifestState {
    pub fn section(&self, section: Section) -> &SectionState {
        match section {
            Section::Dependencies => &self.dependencies,
            Section::DevDependencies => &self.dev_dependencies,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut SectionState {
        match section {
            Section::Dependencies => &mut self.dependencies,
            Section::DevDependencies => &mut self.dev_dependencies,
        }
    }
}

// =============================================================================
// PACKAGE MANIFEST
// =============================================================================

/// A `package.json` document
///
/// Keys are kept in document order; keys added during reconciliation are
/// appended. The platform shadow record lives under `shadow_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    pub(crate) document: Map<String, Value>,
    pub(crate) shadow_key: String,
}

impl PackageManifest {
    /// Default document used when the project has no `package.json` yet
    pub fn skeleton(shadow_key: &str) -> Self {
        let mut document = Map::new();
        document.insert(NAME_KEY.to_string(), Value::from(NAME_DEFAULT));
        document.insert(LICENSE_KEY.to_string(), Value::from(LICENSE_DEFAULT));
        document.insert(TYPE_KEY.to_string(), Value::from(TYPE_DEFAULT));
        PackageManifest {
            document,
            shadow_key: shadow_key.to_string(),
        }
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn shadow_key(&self) -> &str {
        &self.shadow_key
    }
}
