use crate::common::{GlobalOpts, ProjectArgs};
use crate::errors::CliError;
use crate::settings::Settings;
use clap::Args;
use depsync_config::Config;
use depsync_logger as logger;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct VersionsCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Where to write the versions lock, relative to the project directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn handle_versions(cmd: VersionsCommand, _opts: &GlobalOpts) -> Result<(), CliError> {
    let config = Config::load()?;
    let mut settings = Settings::resolve(&config, &cmd.project)?;
    if let Some(output) = &cmd.output {
        settings.layout.versions_file = settings.layout.resolve(output);
    }

    let path = settings.layout.versions_file.display().to_string();
    if settings.engine().write_versions(&settings.layout)? {
        logger::success(&format!("Wrote {}", path));
    } else {
        logger::success(&format!("{} is up to date", path));
    }
    Ok(())
}
