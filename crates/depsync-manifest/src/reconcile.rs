//! Dependency reconciliation - the hot path of a sync
//!
//! Merges platform default dependencies into the visible sections of a
//! manifest while respecting user overrides. The shadow record (`pinned`)
//! remembers what the platform asked for last time, which is how a user
//! override is told apart from a stale platform pin.

use crate::errors::ManifestError;
use crate::install_state::dependencies_hash;
use crate::migrations::MigrationTable;
use crate::types::{DependencyMap, PackageManifest, Section, SectionState};
use crate::version::FrontendVersion;
use tracing::{debug, info};

// =============================================================================
// REPORT
// =============================================================================

/// What happened to one dependency during reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// New to the visible section or to the shadow record
    Added { version: String },
    /// Visible version replaced by the platform version
    Updated { from: String, to: String },
    /// Legacy entry replaced through a migration rule
    Migrated { from: String, to: String },
    /// Only the shadow record moved; the visible entry is a user override
    Pinned { from: String, to: String },
    /// Visible or incoming version could not be compared; left as-is
    Skipped { visible: String, incoming: String },
}

/// A single recorded change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChange {
    pub section: Section,
    pub name: String,
    pub kind: ChangeKind,
}

/// Result of a reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    pub pinned_only: usize,
    pub entries: Vec<DependencyChange>,
}

impl ReconcileReport {
    /// Number of entries whose content changed (skips are not changes)
    pub fn changes(&self) -> usize {
        self.added + self.updated + self.pinned_only
    }

    pub fn has_changes(&self) -> bool {
        self.changes() > 0
    }

    /// Entries left untouched because their versions could not be compared
    pub fn skipped(&self) -> impl Iterator<Item = &DependencyChange> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.kind, ChangeKind::Skipped { .. }))
    }

    pub fn merge(&mut self, other: ReconcileReport) {
        self.added += other.added;
        self.updated += other.updated;
        self.pinned_only += other.pinned_only;
        self.entries.extend(other.entries);
    }

    fn record(&mut self, section: Section, name: &str, kind: ChangeKind) {
        match kind {
            ChangeKind::Added { .. } => self.added += 1,
            ChangeKind::Updated { .. } | ChangeKind::Migrated { .. } => self.updated += 1,
            ChangeKind::Pinned { .. } => self.pinned_only += 1,
            ChangeKind::Skipped { .. } => {}
        }
        self.entries.push(DependencyChange {
            section,
            name: name.to_string(),
            kind,
        });
    }
}

// =============================================================================
// RECONCILE
// =============================================================================

/// Reconcile one section against the incoming platform dependencies
///
/// Pure: only `state` is mutated. Incoming entries are processed in order,
/// so new keys are appended to both maps in incoming order.
pub fn reconcile_section(
    section: Section,
    state: &mut SectionState,
    incoming: &DependencyMap,
    migrations: &MigrationTable,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for (name, version) in incoming {
        reconcile_entry(&mut report, section, state, name, version, migrations);
    }
    report
}

/// Reconcile both sections of a manifest and refresh its dependency hash
pub fn reconcile_manifest(
    manifest: &mut PackageManifest,
    dependencies: &DependencyMap,
    dev_dependencies: &DependencyMap,
    migrations: &MigrationTable,
) -> Result<ReconcileReport, ManifestError> {
    let mut state = manifest.state()?;

    let mut report = reconcile_section(
        Section::Dependencies,
        &mut state.dependencies,
        dependencies,
        migrations,
    );
    report.merge(reconcile_section(
        Section::DevDependencies,
        &mut state.dev_dependencies,
        dev_dependencies,
        migrations,
    ));

    manifest.apply_state(&state)?;
    manifest.set_hash(&dependencies_hash(&state))?;

    if report.added > 0 {
        info!(
            "Added {} default dependencies to main package.json",
            report.added
        );
    }
    Ok(report)
}

enum Decision {
    Keep,
    Replace(ChangeKind),
    Skip,
}

fn reconcile_entry(
    report: &mut ReconcileReport,
    section: Section,
    state: &mut SectionState,
    name: &str,
    incoming: &str,
    migrations: &MigrationTable,
) {
    let Some(pinned) = state.pinned.get(name).cloned() else {
        state.pinned.insert(name.to_string(), incoming.to_string());
        state.visible.insert(name.to_string(), incoming.to_string());
        debug!("Added \"{}\": \"{}\" line.", name, incoming);
        report.record(
            section,
            name,
            ChangeKind::Added {
                version: incoming.to_string(),
            },
        );
        return;
    };

    let visible_change = match state.visible.get(name) {
        None => Some(ChangeKind::Added {
            version: incoming.to_string(),
        }),
        Some(visible) => match decide(name, &pinned, visible, incoming, migrations) {
            Decision::Replace(kind) => Some(kind),
            Decision::Keep => None,
            Decision::Skip => {
                debug!("Package {} has unparseable version: {}", name, visible);
                report.record(
                    section,
                    name,
                    ChangeKind::Skipped {
                        visible: visible.clone(),
                        incoming: incoming.to_string(),
                    },
                );
                None
            }
        },
    };

    let visible_changed = visible_change.is_some();
    if let Some(kind) = visible_change {
        state.visible.insert(name.to_string(), incoming.to_string());
        debug!("Added \"{}\": \"{}\" line.", name, incoming);
        report.record(section, name, kind);
    }

    if pinned != incoming {
        state.pinned.insert(name.to_string(), incoming.to_string());
        if !visible_changed {
            report.record(
                section,
                name,
                ChangeKind::Pinned {
                    from: pinned,
                    to: incoming.to_string(),
                },
            );
        }
    }
}

fn decide(
    name: &str,
    pinned: &str,
    visible: &str,
    incoming: &str,
    migrations: &MigrationTable,
) -> Decision {
    let (Ok(visible_version), Ok(incoming_version)) =
        (FrontendVersion::parse(visible), FrontendVersion::parse(incoming))
    else {
        return match migrations.find(name, visible) {
            Some(_) => Decision::Replace(ChangeKind::Migrated {
                from: visible.to_string(),
                to: incoming.to_string(),
            }),
            None => Decision::Skip,
        };
    };

    // Platform owned the entry last time: follow it up or down.
    let platform_owned = FrontendVersion::parse(pinned).is_ok_and(|pinned| pinned == visible_version);
    if (platform_owned && incoming_version != visible_version)
        || incoming_version.is_newer_than(&visible_version)
    {
        return Decision::Replace(ChangeKind::Updated {
            from: visible.to_string(),
            to: incoming.to_string(),
        });
    }

    Decision::Keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::deps;

    fn section(visible: &[(&str, &str)], pinned: &[(&str, &str)]) -> SectionState {
        SectionState {
            visible: deps(visible),
            pinned: deps(pinned),
        }
    }

    fn run(state: &mut SectionState, incoming: &[(&str, &str)]) -> ReconcileReport {
        reconcile_section(
            Section::Dependencies,
            state,
            &deps(incoming),
            &MigrationTable::default(),
        )
    }

    #[test]
    fn test_absent_from_shadow_adds_to_both() {
        let mut state = section(&[("foo", "1.0.0")], &[]);
        let report = run(&mut state, &[("foo", "1.2.0")]);

        assert_eq!(state.visible, deps(&[("foo", "1.2.0")]));
        assert_eq!(state.pinned, deps(&[("foo", "1.2.0")]));
        assert_eq!(report.changes(), 1);
        assert_eq!(report.added, 1);
    }

    #[test]
    fn test_pinned_but_not_visible_is_added() {
        let mut state = section(&[], &[("lit", "3.1.0")]);
        let report = run(&mut state, &[("lit", "3.1.0")]);

        assert_eq!(state.visible, deps(&[("lit", "3.1.0")]));
        assert_eq!(report.added, 1);
        assert_eq!(report.changes(), 1);
    }

    #[test]
    fn test_platform_downgrade_is_followed() {
        let mut state = section(&[("foo", "1.0.0")], &[("foo", "1.0.0")]);
        let report = run(&mut state, &[("foo", "0.9.0")]);

        assert_eq!(state.visible, deps(&[("foo", "0.9.0")]));
        assert_eq!(state.pinned, deps(&[("foo", "0.9.0")]));
        assert_eq!(report.changes(), 1);
        assert_eq!(report.updated, 1);
    }

    #[test]
    fn test_user_override_survives_older_platform_version() {
        let mut state = section(&[("foo", "2.0.0")], &[("foo", "1.0.0")]);
        let report = run(&mut state, &[("foo", "1.5.0")]);

        assert_eq!(state.visible, deps(&[("foo", "2.0.0")]));
        assert_eq!(state.pinned, deps(&[("foo", "1.5.0")]));
        assert_eq!(report.updated, 0);
        assert_eq!(report.pinned_only, 1);
    }

    #[test]
    fn test_user_override_replaced_by_newer_platform_version() {
        let mut state = section(&[("foo", "2.0.0")], &[("foo", "1.0.0")]);
        let report = run(&mut state, &[("foo", "2.1.0")]);

        assert_eq!(state.visible, deps(&[("foo", "2.1.0")]));
        assert_eq!(report.updated, 1);
        assert_eq!(report.pinned_only, 0);
    }

    #[test]
    fn test_unparseable_visible_version_is_left_alone() {
        let mut state = section(&[("foo", "file:../local-pkg")], &[("foo", "1.0.0")]);
        let report = run(&mut state, &[("foo", "2.0.0")]);

        assert_eq!(state.visible, deps(&[("foo", "file:../local-pkg")]));
        assert_eq!(state.pinned, deps(&[("foo", "2.0.0")]));
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.pinned_only, 1);
    }

    #[test]
    fn test_legacy_form_package_is_migrated() {
        let mut state = section(
            &[("@vaadin/form", "./target/flow-frontend/form")],
            &[("@vaadin/form", "24.3.0")],
        );
        let report = run(&mut state, &[("@vaadin/form", "24.4.0")]);

        assert_eq!(state.visible, deps(&[("@vaadin/form", "24.4.0")]));
        assert!(matches!(
            report.entries.first().map(|entry| &entry.kind),
            Some(ChangeKind::Migrated { .. })
        ));
        assert_eq!(report.skipped().count(), 0);
    }

    #[test]
    fn test_equal_versions_with_prefix_are_kept() {
        let mut state = section(&[("foo", "^1.0.0")], &[("foo", "1.0.0")]);
        let report = run(&mut state, &[("foo", "1.0.0")]);

        assert_eq!(state.visible, deps(&[("foo", "^1.0.0")]));
        assert!(!report.has_changes());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut state = section(
            &[("foo", "2.0.0"), ("bar", "file:./bar"), ("baz", "1.0.0")],
            &[("foo", "1.0.0"), ("baz", "1.0.0")],
        );
        let incoming = [("foo", "1.5.0"), ("bar", "1.0.0"), ("baz", "0.9.0"), ("qux", "3.0.0")];

        let first = run(&mut state, &incoming);
        assert!(first.has_changes());

        let snapshot = state.clone();
        let second = run(&mut state, &incoming);
        assert_eq!(second.changes(), 0);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_new_keys_are_appended_in_incoming_order() {
        let mut state = section(&[("existing", "1.0.0")], &[]);
        run(&mut state, &[("zeta", "1.0.0"), ("alpha", "1.0.0")]);

        let names: Vec<&str> = state.visible.keys().map(String::as_str).collect();
        assert_eq!(names, ["existing", "zeta", "alpha"]);
    }
}
