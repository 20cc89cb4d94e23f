//! Common types and utilities shared across modules

use clap::{Args, Parser};
use std::path::PathBuf;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        help = "Do not print progress to the console (always logged to file)"
    )]
    pub no_stdout: bool,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Where the project lives and which bundles apply to it
///
/// Every value left unset falls back to the config file, then to the
/// built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (default: current directory)
    #[arg(long, short = 'p')]
    pub project: Option<PathBuf>,

    /// Manifest path, relative to the project directory
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Directory holding the default dependency bundles
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Use the React router bundles
    #[arg(long, overrides_with = "no_react")]
    pub react: bool,

    /// Use the Vaadin router bundle instead of React
    #[arg(long, overrides_with = "react")]
    pub no_react: bool,

    /// Include the Hilla component bundles
    #[arg(long, overrides_with = "no_hilla")]
    pub hilla: bool,

    /// Leave out the Hilla component bundles
    #[arg(long, overrides_with = "hilla")]
    pub no_hilla: bool,
}

impl ProjectArgs {
    /// React flag from the command line, `None` when neither form was given
    pub fn react_flag(&self) -> Option<bool> {
        match (self.react, self.no_react) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Hilla flag from the command line, `None` when neither form was given
    pub fn hilla_flag(&self) -> Option<bool> {
        match (self.hilla, self.no_hilla) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        project: ProjectArgs,
    }

    fn parse(args: &[&str]) -> Result<ProjectArgs, clap::Error> {
        let argv = std::iter::once("depsync").chain(args.iter().copied());
        Ok(Harness::try_parse_from(argv)?.project)
    }

    #[test]
    fn test_flag_pairs_default_to_config() -> Result<(), clap::Error> {
        let args = parse(&[])?;
        assert_eq!(args.react_flag(), None);
        assert_eq!(args.hilla_flag(), None);
        Ok(())
    }

    #[test]
    fn test_last_flag_of_a_pair_wins() -> Result<(), clap::Error> {
        let args = parse(&["--hilla", "--no-hilla", "--no-react", "--react"])?;
        assert_eq!(args.hilla_flag(), Some(false));
        assert_eq!(args.react_flag(), Some(true));
        Ok(())
    }
}
