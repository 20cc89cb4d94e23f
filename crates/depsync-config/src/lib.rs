//! Configuration for the depsync CLI
//!
//! The config file is TOML. Its location is resolved in this order:
//! - the `DEPSYNC_CONFIG` environment variable
//! - `depsync.toml` in the current directory
//! - a pointer file `~/.config/depsync/.depsync_config_path`
//! - the default `~/.config/depsync/depsync.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use which::which;

pub const CONFIG_ENV: &str = "DEPSYNC_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "depsync.toml";
pub const POINTER_FILE: &str = ".depsync_config_path";
const CONFIG_FILE: &str = "depsync.toml";
const APP_DIR: &str = "depsync";

pub const DEFAULT_INSTALLER: &str = "npm";

/// Keys accepted by `get` and `set`
pub const KEYS: &[&str] = &[
    "manifest",
    "resources",
    "shadow-key",
    "react",
    "hilla",
    "installer",
    "plugin-scope",
    "plugin-dir",
    "versions-file",
    "install-state",
];

/// Error type for loading, saving and editing the configuration
#[derive(Debug)]
pub enum ConfigError {
    /// No home directory to place the default config in
    NoConfigDir,
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    UnknownKey(String),
    InvalidValue { key: String, value: String },
    /// The installer binary is not on PATH
    InstallerNotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Could not determine the config directory"),
            ConfigError::Io(path, e) => write!(f, "{}: {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Invalid config file {}: {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {}. Supported keys: {}",
                key,
                KEYS.join(", ")
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
            ConfigError::InstallerNotFound(name) => {
                write!(f, "Installer '{}' was not found on PATH", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

/// A legacy dependency rule, `[[migrations]]` in the config file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct MigrationEntry {
    pub package: String,
    pub legacy_marker: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub react: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hilla: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_bundles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub migrations: Vec<MigrationEntry>,
}

impl Config {
    /// Resolve the config file location
    pub fn path() -> Result<PathBuf, ConfigError> {
        let env = std::env::var(CONFIG_ENV).ok();
        let cwd = std::env::current_dir().ok();
        resolve_path(env.as_deref(), cwd.as_deref(), default_dir().as_deref())
    }

    /// The pointer file consulted when no env override or local file exists
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        default_dir()
            .map(|dir| dir.join(POINTER_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, empty when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
            }
        }
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Point future runs at another config file
    pub fn set_path(new_path: &str) -> Result<PathBuf, ConfigError> {
        let pointer = Self::pointer_path()?;
        if let Some(parent) = pointer.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(&pointer, new_path.trim()).map_err(|e| ConfigError::Io(pointer.clone(), e))?;
        Ok(pointer)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "manifest" => self.manifest.clone(),
            "resources" => self.resources.clone(),
            "shadow-key" => self.shadow_key.clone(),
            "react" => self.react.map(|v| v.to_string()),
            "hilla" => self.hilla.map(|v| v.to_string()),
            "installer" => self.installer.clone(),
            "plugin-scope" => self.plugin_scope.clone(),
            "plugin-dir" => self.plugin_dir.clone(),
            "versions-file" => self.versions_file.clone(),
            "install-state" => self.install_state.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "manifest" => self.manifest = Some(value),
            "resources" => self.resources = Some(value),
            "shadow-key" => self.shadow_key = Some(value),
            "react" => self.react = Some(parse_bool(key, &value)?),
            "hilla" => self.hilla = Some(parse_bool(key, &value)?),
            "installer" => self.installer = Some(value),
            "plugin-scope" => self.plugin_scope = Some(value),
            "plugin-dir" => self.plugin_dir = Some(value),
            "versions-file" => self.versions_file = Some(value),
            "install-state" => self.install_state = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values_iter().is_empty() && self.extra_bundles.is_empty() && self.migrations.is_empty()
    }

    /// Set scalar values in key order
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn installer_name(&self) -> &str {
        self.installer.as_deref().unwrap_or(DEFAULT_INSTALLER)
    }

    /// Locate the installer binary
    ///
    /// A configured absolute path is used as is when it exists; otherwise the
    /// name is looked up on PATH.
    pub fn ensure_installer_path(&self) -> Result<PathBuf, ConfigError> {
        let name = self.installer_name();
        let configured = Path::new(name);
        if configured.is_absolute() && configured.exists() {
            return Ok(configured.to_path_buf());
        }
        which(name).map_err(|_| ConfigError::InstallerNotFound(name.to_string()))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn default_dir() -> Option<PathBuf> {
    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir().map(|home| home.join(".config").join(APP_DIR))
    }

    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map(|config| config.join(APP_DIR))
    }
}

fn resolve_path(
    env: Option<&str>,
    cwd: Option<&Path>,
    default_dir: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(env_path) = env {
        let trimmed = env_path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Some(cwd) = cwd {
        let local = cwd.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Ok(local);
        }
    }

    let default_dir = default_dir.ok_or(ConfigError::NoConfigDir)?;
    let pointer = default_dir.join(POINTER_FILE);
    if let Ok(contents) = fs::read_to_string(&pointer) {
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    Ok(default_dir.join(CONFIG_FILE))
}
