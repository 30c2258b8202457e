//! Lensgauge Core: camera intrinsics, diameter estimation, and annotation.
//!
//! This crate holds everything Lensgauge does that is not HTTP or CLI glue.
//! It has no internal Lensgauge dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: TOML-backed service configuration
//! - [`calibration`]: Camera matrix parsing and validation
//! - [`measure`]: Pinhole back-projection and diameter estimation
//! - [`annotate`]: Drawing the measurement overlay onto an image
//! - [`storage`]: Per-request upload slots on disk
//! - [`pipeline`]: Decode, measure, annotate, encode

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod annotate;
pub mod calibration;
pub mod config;
pub mod error;
pub mod measure;
pub mod pipeline;
pub mod storage;

// Re-exports for convenience
pub use annotate::AnnotationStyle;
pub use calibration::CameraMatrix;
pub use config::GaugeConfig;
pub use error::{Error, Result};
pub use measure::{MeasurementRegion, MeasurementSettings, estimate_diameter};
pub use pipeline::{Measurement, measure_bytes, process_image};
pub use storage::{UploadId, UploadSlot, UploadStore};
