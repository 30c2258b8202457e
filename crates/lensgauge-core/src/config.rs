//! Service configuration.
//!
//! [`GaugeConfig`] is loaded from TOML. Every section and field has a
//! default, so an empty file (or no file at all) yields a working
//! configuration that mirrors the historical fixed paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::measure::MeasurementSettings;
use crate::{Error, Result};

/// Project name, used for config directories and environment prefixes.
pub const PROJECT_NAME: &str = "lensgauge";

/// Top-level Lensgauge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Where uploads and results are stored.
    pub storage: StorageSettings,
    /// Where the camera matrix lives.
    pub calibration: CalibrationSettings,
    /// Measurement constants.
    pub measurement: MeasurementSettings,
    /// Overlay rendering options.
    pub annotation: AnnotationSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Upload storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory that receives one sub-directory per upload.
    pub upload_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads"),
        }
    }
}

/// Calibration file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Path of the whitespace-separated camera matrix file.
    pub camera_matrix: PathBuf,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            camera_matrix: PathBuf::from("images/right/camera_matrix.txt"),
        }
    }
}

/// Overlay rendering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// TrueType font used for the label. System fonts are probed when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

impl GaugeConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&text)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check values that would otherwise fail later at request time.
    pub fn validate(&self) -> Result<()> {
        let m = &self.measurement;
        if !m.object_distance.is_finite() || m.object_distance <= 0.0 {
            return Err(Error::config(format!(
                "measurement.object_distance must be a positive number, got {}",
                m.object_distance
            )));
        }
        if m.unit_label.trim().is_empty() {
            return Err(Error::config("measurement.unit_label must not be empty"));
        }
        if m.region.width == 0 || m.region.height == 0 {
            return Err(Error::config(
                "measurement.region width and height must be at least 1 pixel",
            ));
        }
        if !m.region.is_addressable() {
            return Err(Error::config(format!(
                "measurement.region must end within {} pixels, got ({}, {}) + {}x{}",
                i32::MAX,
                m.region.x,
                m.region.y,
                m.region.width,
                m.region.height
            )));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::config("server.max_upload_bytes must be non-zero"));
        }
        Ok(())
    }

    /// Flatten the configuration into `LENSGAUGE_*` environment variables.
    ///
    /// Nested keys are joined with `_` and upper-cased, so
    /// `server.port` becomes `LENSGAUGE_SERVER_PORT`.
    pub fn to_env_vars(&self) -> Result<BTreeMap<String, String>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = BTreeMap::new();
        flatten_env(&value, &PROJECT_NAME.to_uppercase(), &mut vars);
        Ok(vars)
    }
}

fn flatten_env(value: &toml::Value, prefix: &str, out: &mut BTreeMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let name = format!("{prefix}_{}", key.to_uppercase());
                flatten_env(child, &name, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
