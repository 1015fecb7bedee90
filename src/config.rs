//! Application configuration.
//!
//! The configuration is loaded from
//! `$XDG_CONFIG_HOME/aerospace-alfred/config.json`.  A missing or broken
//! file is not an error: the compiled-in defaults are used instead.
//!
//! # Example
//!
//! ```json
//! {
//!   "aerospace": { "binary": "/opt/homebrew/bin/aerospace" },
//!   "icons": {
//!     "enabled": true,
//!     "ttl_secs": 604800,
//!     "cache_dir": "/Users/me/Library/Caches/aerospace-alfred-workflow"
//!   }
//! }
//! ```

use crate::icon::DEFAULT_TTL_SECS;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How to reach the AeroSpace CLI.
    #[serde(default)]
    pub aerospace: AerospaceConfig,

    /// Application icon lookup and caching.
    #[serde(default)]
    pub icons: IconConfig,
}

/// How to reach the AeroSpace CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AerospaceConfig {
    /// Program name or absolute path of the `aerospace` binary.  Alfred
    /// runs scripts with a minimal `PATH`, so an absolute path is often
    /// needed.
    pub binary: String,
}

impl Default for AerospaceConfig {
    fn default() -> Self {
        Self {
            binary: "aerospace".into(),
        }
    }
}

/// Application icon lookup and caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Look up application icons for window items.  When `false` the icon
    /// cache is neither read nor written.
    pub enabled: bool,
    /// How long a cached lookup stays valid, in seconds.
    pub ttl_secs: u64,
    /// Directory holding `icon_cache.json`, replacing the default
    /// per-user cache location.
    pub cache_dir: Option<PathBuf>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL_SECS,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load `config.json` from [`config_dir`], falling back to compiled-in
    /// defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = config_dir().map(|dir| dir.join("config.json")) else {
            info!("no config directory, using defaults");
            return Self::default();
        };
        match Self::load(&path) {
            Ok(cfg) => {
                info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                info!("no config file ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/aerospace-alfred`,
/// else `~/.config/aerospace-alfred`).
pub fn config_dir() -> Option<PathBuf> {
    config_dir_with(|name| std::env::var(name).ok(), dirs::home_dir())
}

/// [`config_dir`] with the environment lookup and home directory supplied
/// by the caller.  An empty `XDG_CONFIG_HOME` counts as unset.
pub fn config_dir_with<F>(var: F, home: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match var("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home?.join(".config"),
    };
    Some(base.join("aerospace-alfred"))
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
