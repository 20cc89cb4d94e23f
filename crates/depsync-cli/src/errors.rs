//! Error type for the depsync commands

use depsync_config::ConfigError;
use depsync_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Project directory not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("No bundle resources configured. Pass --resources or run `depsync config set resources <dir>`")]
    MissingResources,

    #[error("Bundle resources not found: {}", .0.display())]
    ResourcesNotFound(PathBuf),

    #[error("{command} failed with exit code {}", code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_command_failed_display() {
        let err = CliError::CommandFailed {
            command: "npm install".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "npm install failed with exit code 1");

        let err = CliError::CommandFailed {
            command: "npm install".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "npm install failed with exit code unknown");
    }

    #[test]
    fn test_missing_resources_mentions_flag() {
        assert!(CliError::MissingResources.to_string().contains("--resources"));
    }
}
