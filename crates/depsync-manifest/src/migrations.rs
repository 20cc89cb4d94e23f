//! Legacy package migrations
//!
//! Some packages were once referenced through a local path that no longer
//! exists. Such entries never parse as versions, so the reconciler would
//! leave them alone forever; a migration rule lets the incoming platform
//! version replace them.

use serde::{Deserialize, Serialize};

/// Replace an unparsable visible version of `package` when it contains `legacy_marker`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRule {
    pub package: String,
    pub legacy_marker: String,
}

impl MigrationRule {
    pub fn new(package: impl Into<String>, legacy_marker: impl Into<String>) -> Self {
        MigrationRule {
            package: package.into(),
            legacy_marker: legacy_marker.into(),
        }
    }

    pub fn applies_to(&self, package: &str, visible_version: &str) -> bool {
        self.package == package && visible_version.contains(&self.legacy_marker)
    }
}

/// Ordered set of migration rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTable {
    rules: Vec<MigrationRule>,
}

impl MigrationTable {
    pub fn empty() -> Self {
        MigrationTable { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: MigrationRule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = MigrationRule>) -> Self {
        for rule in rules {
            self.push(rule);
        }
        self
    }

    pub fn find(&self, package: &str, visible_version: &str) -> Option<&MigrationRule> {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(package, visible_version))
    }

    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }
}

impl Default for MigrationTable {
    /// `@vaadin/form` used to be served from the generated `flow-frontend/form` folder
    fn default() -> Self {
        MigrationTable {
            rules: vec![MigrationRule::new("@vaadin/form", "flow-frontend/form")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_form_package() {
        let table = MigrationTable::default();
        assert!(table
            .find("@vaadin/form", "./target/flow-frontend/form")
            .is_some());
        assert!(table.find("@vaadin/form", "file:../form").is_none());
        assert!(table
            .find("@vaadin/router", "./target/flow-frontend/form")
            .is_none());
    }

    #[test]
    fn test_extra_rules_are_deduplicated() {
        let table = MigrationTable::default().with_rules([
            MigrationRule::new("@vaadin/form", "flow-frontend/form"),
            MigrationRule::new("@acme/widgets", "legacy-widgets"),
        ]);
        assert_eq!(table.rules().len(), 2);
        assert!(table
            .find("@acme/widgets", "file:./legacy-widgets")
            .is_some());
    }

    #[test]
    fn test_empty_table() {
        assert!(MigrationTable::empty()
            .find("@vaadin/form", "flow-frontend/form")
            .is_none());
    }
}
