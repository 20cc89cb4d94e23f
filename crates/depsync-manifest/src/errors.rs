use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, reconciling or persisting a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot parse package file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed manifest: {0}")]
    Malformed(String),
}

/// A version string that is not a plain release or pre-release number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparseable version '{input}': {reason}")]
pub struct VersionError {
    pub input: String,
    pub reason: &'static str,
}
