pub mod config;
pub mod status;
pub mod sync;
pub mod versions;

use colored::Colorize;
use depsync_manifest::{ChangeKind, DependencyChange};

/// One line describing a change, e.g. `dependencies: lit 3.1.0 -> 3.2.0`
pub fn describe_change(change: &DependencyChange) -> String {
    let what = match &change.kind {
        ChangeKind::Added { version } => format!("{} {}", "added".green(), version),
        ChangeKind::Updated { from, to } => format!("{} {} -> {}", "updated".cyan(), from, to),
        ChangeKind::Migrated { from, to } => {
            format!("{} {} -> {}", "migrated".cyan(), from, to)
        }
        ChangeKind::Pinned { from, to } => {
            format!("{} {} -> {} (kept user version)", "pinned".yellow(), from, to)
        }
        ChangeKind::Skipped { visible, incoming } => format!(
            "{} {} (platform wants {})",
            "skipped".dimmed(),
            visible,
            incoming
        ),
    };
    format!("{}: {} {}", change.section.key(), change.name.bold(), what)
}
