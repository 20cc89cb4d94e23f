use crate::common::{GlobalOpts, ProjectArgs};
use crate::commands::describe_change;
use crate::errors::CliError;
use crate::settings::Settings;
use clap::Args;
use colored::Colorize;
use depsync_config::Config;
use depsync_manifest::SyncOutcome;
use serde::Serialize;

#[derive(Args, Debug, Clone, Default)]
pub struct StatusCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable status
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub manifest: String,
    pub up_to_date: bool,
    pub added: usize,
    pub updated: usize,
    pub pinned: usize,
    pub pruned: Vec<String>,
    pub needs_install: bool,
    pub hash: String,
}

impl StatusSummary {
    pub fn new(settings: &Settings, outcome: &SyncOutcome) -> Self {
        StatusSummary {
            manifest: settings.layout.manifest.display().to_string(),
            up_to_date: !outcome.written,
            added: outcome.report.added,
            updated: outcome.report.updated,
            pinned: outcome.report.pinned_only,
            pruned: outcome.pruned.clone(),
            needs_install: outcome.needs_install,
            hash: outcome.hash.clone(),
        }
    }
}

/// Reconcile in memory and report, never writing
pub fn handle_status(cmd: StatusCommand, opts: &GlobalOpts) -> Result<(), CliError> {
    let config = Config::load()?;
    let mut settings = Settings::resolve(&config, &cmd.project)?;
    settings.options.dry_run = true;

    let outcome = settings.engine().sync(&settings.layout)?;
    let summary = StatusSummary::new(&settings, &outcome);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {}", "Manifest:".bold().green(), summary.manifest);
    if summary.up_to_date {
        println!("  {}", "up to date".green());
    } else {
        println!(
            "  {} added, {} updated, {} pinned",
            summary.added, summary.updated, summary.pinned
        );
        for change in &outcome.report.entries {
            println!("  {}", describe_change(change));
        }
    }
    for name in &summary.pruned {
        println!("  {} {}", "stale plugin".yellow(), name);
    }

    let install = if summary.needs_install {
        "needed".yellow()
    } else {
        "not needed".green()
    };
    println!("{} {}", "Install:".bold().green(), install);
    if opts.verbosity_level() > 0 {
        println!("{} {}", "Hash:".bold().green(), summary.hash);
    }
    Ok(())
}
