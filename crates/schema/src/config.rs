//! Catalog configuration via `grnbind.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use grnbind_core::{Error, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "grnbind.toml";

/// Catalog configuration loaded from `grnbind.toml`.
///
/// # Example
///
/// ```toml
/// # Register with the shared engine runtime (default: true)
/// manage_runtime = true
///
/// # Log full command text at debug level (default: false)
/// log_commands = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Acquire a runtime guard for the lifetime of the catalog.
    ///
    /// When `false` the catalog never touches the shared runtime counter.
    #[serde(default = "default_manage_runtime")]
    pub manage_runtime: bool,
    /// Include the full encoded command text in debug logs.
    #[serde(default)]
    pub log_commands: bool,
}

fn default_manage_runtime() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            manage_runtime: default_manage_runtime(),
            log_commands: false,
        }
    }
}

impl CatalogConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# grnbind catalog configuration
#
# Register with the shared engine runtime (default: true).
# Set to false when the process manages engine init/fin itself.
manage_runtime = true

# Log the full text of every command at debug level (default: false).
# Command names and sizes are always logged.
log_commands = false
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid TOML for this struct.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config {
            reason: format!("failed to parse config: {}", e),
        })
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            reason: format!("failed to parse config file '{}': {}", path.display(), e),
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
                reason: format!("failed to write config file '{}': {}", path.display(), e),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Config {
            reason: format!("failed to write config file '{}': {}", path.display(), e),
        })
    }
}
