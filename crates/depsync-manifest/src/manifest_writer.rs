//! Write-if-changed persistence for JSON documents
//!
//! Every file this crate produces (`package.json`, the versions lock, the
//! install state) goes through `write_if_changed` so that an unchanged
//! document never touches the file and never triggers a downstream rebuild.

use crate::errors::ManifestError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialize with two-space indentation and a trailing newline
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ManifestError> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    Ok(content)
}

/// Read a JSON object from disk, `None` when the file does not exist
pub fn read_json_object(path: &Path) -> Result<Option<Map<String, Value>>, ManifestError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let value: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ManifestError::Malformed(format!(
            "'{}' does not contain a JSON object",
            path.display()
        ))),
    }
}

/// Write `content` to `path` unless the file already holds exactly these bytes
///
/// Parent directories are created as needed. The content is written to a
/// sibling temp file and renamed over the target. A symlinked target is
/// written through, and an existing file keeps its permissions. Returns
/// whether a write happened.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool, ManifestError> {
    if is_up_to_date(path, content)? {
        debug!("{} is up to date, not writing", path.display());
        return Ok(false);
    }

    let (target, permissions) = match fs::canonicalize(path) {
        Ok(target) => {
            let permissions = fs::metadata(&target)?.permissions();
            (target, Some(permissions))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => (path.to_path_buf(), None),
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(&target);
    if let Err(e) = write_temp(&temp_path, content, permissions) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, &target) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    debug!("wrote {}", target.display());
    Ok(true)
}

fn write_temp(temp_path: &Path, content: &str, permissions: Option<fs::Permissions>) -> io::Result<()> {
    let file = fs::File::create(temp_path)?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    let mut writer = io::BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()
}

/// Whether `path` already holds exactly `content`
pub fn is_up_to_date(path: &Path, content: &str) -> Result<bool, ManifestError> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == content.as_bytes()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
