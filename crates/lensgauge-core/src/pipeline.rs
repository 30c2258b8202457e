//! End-to-end processing of one image.
//!
//! decode → load camera matrix → estimate diameter → annotate → encode.
//!
//! The image is decoded first so that an unreadable upload is reported
//! before anything else is touched.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::annotate::{AnnotationStyle, draw_measurement, format_label};
use crate::{CameraMatrix, Error, GaugeConfig, Result, estimate_diameter};

/// Outcome of measuring one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Estimated diameter, in the unit of the configured object distance.
    pub diameter: f64,
    /// Unit label shown alongside the diameter.
    pub unit: String,
    /// Width of the processed image in pixels.
    pub width: u32,
    /// Height of the processed image in pixels.
    pub height: u32,
}

impl Measurement {
    /// The label drawn on the result image.
    pub fn label(&self) -> String {
        format_label(self.diameter, &self.unit)
    }
}

/// Measure and annotate an already decoded image.
pub fn measure_image(
    img: &mut RgbImage,
    camera: &CameraMatrix,
    config: &GaugeConfig,
    style: &AnnotationStyle,
) -> Measurement {
    let settings = &config.measurement;
    let measurement = Measurement {
        diameter: estimate_diameter(camera, settings),
        unit: settings.unit_label.clone(),
        width: img.width(),
        height: img.height(),
    };

    draw_measurement(img, &settings.region, &measurement.label(), style);

    tracing::info!(
        diameter = measurement.diameter,
        unit = %measurement.unit,
        width = measurement.width,
        height = measurement.height,
        "Measurement computed"
    );
    measurement
}

/// Decode `bytes`, measure, and return the annotated image without writing it.
pub fn measure_bytes(
    bytes: &[u8],
    config: &GaugeConfig,
    style: &AnnotationStyle,
) -> Result<(Measurement, RgbImage)> {
    let mut img = image::load_from_memory(bytes)?.to_rgb8();
    let camera = CameraMatrix::load(&config.calibration.camera_matrix)?;
    let measurement = measure_image(&mut img, &camera, config, style);
    Ok((measurement, img))
}

/// Process the image at `upload_path` and write the annotated copy to `result_path`.
///
/// The output format follows the extension of `result_path`.
pub fn process_image(
    upload_path: &Path,
    result_path: &Path,
    config: &GaugeConfig,
    style: &AnnotationStyle,
) -> Result<Measurement> {
    let bytes = std::fs::read(upload_path).map_err(|e| Error::io_with_path(e, upload_path))?;
    let (measurement, img) = measure_bytes(&bytes, config, style)?;
    save_result(&img, result_path)?;
    Ok(measurement)
}

/// Encode `img` to `path`, format chosen by extension.
pub fn save_result(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path).map_err(|source| Error::ImageEncode {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Result image written");
    Ok(())
}
