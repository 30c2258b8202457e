//! Config file resolution.
//!
//! Checks in order:
//! 1. `--config` / `LENSGAUGE_CONFIG`
//! 2. `./lensgauge.toml`, if present
//! 3. `<platform config dir>/lensgauge/config.toml`, if present
//!
//! With no file found, built-in defaults apply.

use std::path::{Path, PathBuf};

use lensgauge_core::config::PROJECT_NAME;
use lensgauge_core::{Error, GaugeConfig, Result};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "lensgauge.toml";

/// Platform default config path, whether or not it exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
}

/// The path a command should read or report.
///
/// An explicit path is returned as-is. Otherwise the first existing
/// candidate wins, falling back to the platform default path.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path()
}

/// Load the effective configuration.
///
/// An explicit path must exist. Implicit locations are optional.
pub fn load_config(explicit: Option<&str>) -> Result<GaugeConfig> {
    match resolve_config_path(explicit) {
        Some(path) if explicit.is_some() => load_from(&path),
        Some(path) if path.is_file() => load_from(&path),
        _ => {
            tracing::debug!("No config file found, using defaults");
            Ok(GaugeConfig::default())
        }
    }
}

fn load_from(path: &Path) -> Result<GaugeConfig> {
    tracing::debug!(path = %path.display(), "Loading config");
    GaugeConfig::load(path).map_err(|e| match e {
        Error::TomlParse(parse) => {
            Error::config(format!("Failed to parse {}: {parse}", path.display()))
        }
        other => other,
    })
}
