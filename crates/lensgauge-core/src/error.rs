//! Error types for Lensgauge core library.

use std::path::{Path, PathBuf};

/// Errors that can occur while loading calibration data or processing images.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error tied to a specific file or directory
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Camera matrix file could not be interpreted
    #[error("malformed calibration file: {message}")]
    MalformedCalibration {
        /// What is wrong with the file
        message: String,
    },

    /// Uploaded bytes are not a decodable image
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Annotated result could not be written
    #[error("Image encode error at {}: {source}", path.display())]
    ImageEncode {
        /// Destination path
        path: PathBuf,
        /// Underlying encoder error
        #[source]
        source: image::ImageError,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// Configuration file is not valid TOML for [`crate::GaugeConfig`]
    #[error("Configuration parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience `Result` type alias for Lensgauge core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether the caller's input, not the server, caused this error.
    ///
    /// Only image decoding failures are attributed to the uploaded data;
    /// calibration and filesystem problems are server-side.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::ImageDecode(_) => true,
            Error::Io { .. } => false,
            Error::MalformedCalibration { .. } => false,
            Error::ImageEncode { .. } => false,
            Error::Config { .. } => false,
            Error::TomlParse(_) => false,
        }
    }

    /// Creates an I/O error carrying the path that was involved.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a malformed calibration error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Error::MalformedCalibration {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
