use crate::common::{GlobalOpts, ProjectArgs};
use crate::commands::describe_change;
use crate::errors::CliError;
use crate::installer::run_install;
use crate::settings::Settings;
use clap::Args;
use depsync_config::Config;
use depsync_logger as logger;
use depsync_manifest::{record_install, SyncOutcome};

#[derive(Args, Debug, Clone, Default)]
pub struct SyncCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Report what would change without writing anything
    #[arg(long, conflicts_with = "install")]
    pub dry_run: bool,

    /// Run the package installer when the dependencies changed
    #[arg(long)]
    pub install: bool,
}

pub fn handle_sync(cmd: SyncCommand, _opts: &GlobalOpts) -> Result<(), CliError> {
    let config = Config::load()?;
    let mut settings = Settings::resolve(&config, &cmd.project)?;
    settings.options.dry_run = cmd.dry_run;

    let engine = settings.engine();
    let outcome = engine.sync(&settings.layout)?;
    report(&settings, &outcome, cmd.dry_run);

    if !cmd.install {
        return Ok(());
    }

    if !outcome.needs_install {
        logger::info("Installed dependencies are up to date");
        return Ok(());
    }

    engine.write_versions(&settings.layout)?;
    let installer = config.ensure_installer_path()?;
    run_install(&installer, &settings.layout.package_dir)?;
    record_install(&settings.layout, &outcome.hash)?;
    Ok(())
}

fn report(settings: &Settings, outcome: &SyncOutcome, dry_run: bool) {
    for name in &outcome.pruned {
        logger::info(&format!("Removed stale plugin {}", name));
    }
    for change in &outcome.report.entries {
        logger::debug(&describe_change(change));
    }
    for skipped in outcome.report.skipped() {
        logger::warn(&format!(
            "Left {} alone: cannot compare its version with the platform version",
            skipped.name
        ));
    }

    let manifest = settings.layout.manifest.display();
    let report = &outcome.report;
    if !outcome.written {
        logger::success(&format!("{} is up to date", manifest));
    } else if dry_run {
        logger::success(&format!(
            "{} would change: {} added, {} updated, {} pinned",
            manifest, report.added, report.updated, report.pinned_only
        ));
    } else {
        logger::success(&format!(
            "Updated {}: {} added, {} updated, {} pinned",
            manifest, report.added, report.updated, report.pinned_only
        ));
    }
}
