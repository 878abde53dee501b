use crate::{HostError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".plugin-host.toml";

/// Directory scanned for packages when nothing else is configured
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Archive extension recognized when nothing else is configured
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "pkg";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory holding plugin archives (created on demand)
    pub plugins_dir: PathBuf,
    /// File extensions treated as plugin archives, without the leading dot
    pub archive_extensions: Vec<String>,
    /// Load archives in lexicographic file name order instead of directory order
    pub sort_archives: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            archive_extensions: vec![DEFAULT_ARCHIVE_EXTENSION.to_string()],
            sort_archives: true,
        }
    }
}

impl HostConfig {
    /// Load configuration from the working directory, then from the user config
    /// directory. Returns defaults when neither file exists.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }

        match Self::user_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load default config if no file is found, otherwise fall back to defaults
    /// on read or parse failure.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HostError::FileError(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: HostConfig = toml::from_str(&content).map_err(|e| {
            HostError::ConfigError(format!(
                "Failed to parse TOML config from {:?}: {}",
                path, e
            ))
        })?;

        Ok(config)
    }

    /// `<config_dir>/plugin-host/config.toml`, when the platform has a config directory
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("plugin-host").join("config.toml"))
    }

    pub fn with_plugins_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugins_dir = dir.into();
        self
    }

    /// Whether `path` carries one of the recognized archive extensions.
    /// The comparison ignores ASCII case.
    pub fn is_archive(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.archive_extensions
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
