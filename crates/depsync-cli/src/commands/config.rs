use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Subcommand;
use colored::Colorize;
use depsync_config::Config;
use depsync_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    Set {
        key: String,
        value: String,
    },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the CLI will set the config path to that value.
    /// If omitted, the CLI will print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
                return Ok(());
            }
            for (key, value) in config.values_iter() {
                println!("  {}: {}", key.cyan(), value);
            }
            if !config.extra_bundles.is_empty() {
                println!("  {}: {}", "extra-bundles".cyan(), config.extra_bundles.join(", "));
            }
            for migration in &config.migrations {
                println!(
                    "  {}: {} ({})",
                    "migration".cyan(),
                    migration.package,
                    migration.legacy_marker
                );
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            let path = config.save()?;
            logger::debug(&format!("Saved {}", path.display()));
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path()?;
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    let pointer = Config::set_path(&p)?;
                    logger::debug(&format!("Wrote {}", pointer.display()));
                    logger::success(&format!("Config path set to {}", p.trim()));
                }
                None => {
                    println!("{}", config_path.display());
                    if let Ok(pointer) = Config::pointer_path() {
                        if let Ok(contents) = std::fs::read_to_string(&pointer) {
                            let trimmed = contents.trim();
                            if !trimmed.is_empty() && config_path != std::path::Path::new(trimmed) {
                                println!("{} {}", "pointer-file".cyan(), trimmed);
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
