//! Plugin settings
//!
//! Which directories to scan and which file extension marks an artifact.
//! Settings come from the `[plugins]` table of the TOML configuration file:
//!
//! ```toml
//! [plugins]
//! directories = ["/opt/catalog/plugins", "/usr/local/lib/catalog/plugins"]
//! extension = "so"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming extra plugin directories (path-list syntax)
pub const PLUGIN_DIR_ENV: &str = "CATALOG_PLUGIN_DIR";

/// Application directory name under the platform configuration directory
pub const APP_DIR_NAME: &str = "CatalogPlugins";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Cannot read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Directories scanned for plugin artifacts, in order
    pub directories: Vec<PathBuf>,
    /// Artifact file extension, without the dot
    pub extension: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    plugins: PluginSettings,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
        }
    }
}

impl PluginSettings {
    pub fn with_directories(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            ..Self::default()
        }
    }

    /// Parse the `[plugins]` table of a configuration document
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let config: ConfigFile = toml::from_str(contents)?;
        Ok(config.plugins)
    }

    /// Read settings from a configuration file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Directories to scan once every fallback has been applied
    ///
    /// Configured directories win; otherwise the `CATALOG_PLUGIN_DIR`
    /// environment variable, then the platform default directory.
    pub fn resolved_directories(&self) -> Vec<PathBuf> {
        if !self.directories.is_empty() {
            return self.directories.clone();
        }

        if let Some(value) = std::env::var_os(PLUGIN_DIR_ENV) {
            let from_env: Vec<PathBuf> = std::env::split_paths(&value)
                .filter(|path| !path.as_os_str().is_empty())
                .collect();
            if !from_env.is_empty() {
                log::debug!("Using plugin directories from {}", PLUGIN_DIR_ENV);
                return from_env;
            }
        }

        vec![default_plugin_directory()]
    }
}

/// Platform-specific default plugin directory
pub fn default_plugin_directory() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join("plugins"))
        .unwrap_or_else(|| PathBuf::from("./plugins"))
}

/// Platform-specific default configuration file
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("catalog-plugins.toml"))
}
