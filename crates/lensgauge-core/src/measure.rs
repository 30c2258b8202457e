//! Pinhole back-projection and diameter estimation.
//!
//! A pixel coordinate `p` on an axis with focal length `f` maps to the
//! real-world coordinate `Z * p / f` on a plane at known depth `Z`. The
//! diameter is the Euclidean distance between the back-projected corners
//! of the measurement region.
//!
//! The result carries whatever unit `Z` is expressed in. Nothing here looks
//! at image pixels, so the estimate depends only on the camera matrix and
//! the settings.

use serde::{Deserialize, Serialize};

use crate::CameraMatrix;

/// Default object distance `Z`.
pub const DEFAULT_OBJECT_DISTANCE: f64 = 320.0;

/// Default label for the unit of `Z`.
pub const DEFAULT_UNIT_LABEL: &str = "cm";

/// Pixel rectangle whose diagonal is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRegion {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for MeasurementRegion {
    fn default() -> Self {
        Self {
            x: 15,
            y: 16,
            width: 13,
            height: 1,
        }
    }
}

impl MeasurementRegion {
    /// Top-left corner `(x, y)`.
    pub fn start(&self) -> (f64, f64) {
        (f64::from(self.x), f64::from(self.y))
    }

    /// Bottom-right corner `(x + width, y + height)`.
    pub fn end(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }

    /// Whether both corners fit in the signed pixel coordinates the overlay
    /// is drawn with.
    pub fn is_addressable(&self) -> bool {
        let max = i32::MAX as u32;
        self.x.checked_add(self.width).is_some_and(|right| right <= max)
            && self.y.checked_add(self.height).is_some_and(|bottom| bottom <= max)
    }
}

/// Everything the estimate needs besides the camera matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    /// Distance from the camera to the object plane.
    pub object_distance: f64,
    /// Label printed after the value, naming the unit of `object_distance`.
    pub unit_label: String,
    /// Pixel region being measured.
    pub region: MeasurementRegion,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            object_distance: DEFAULT_OBJECT_DISTANCE,
            unit_label: DEFAULT_UNIT_LABEL.to_string(),
            region: MeasurementRegion::default(),
        }
    }
}

/// Back-project one pixel coordinate onto the plane at depth `z`.
///
/// # Examples
///
/// ```
/// use lensgauge_core::measure::back_project;
///
/// assert_eq!(back_project(500.0, 1000.0, 320.0), 160.0);
/// ```
pub fn back_project(pixel: f64, focal: f64, z: f64) -> f64 {
    z * (pixel / focal)
}

/// Estimate the real-world diameter spanned by the measurement region.
pub fn estimate_diameter(camera: &CameraMatrix, settings: &MeasurementSettings) -> f64 {
    let z = settings.object_distance;
    let (px1, py1) = settings.region.start();
    let (px2, py2) = settings.region.end();

    let x1 = back_project(px1, camera.fx(), z);
    let y1 = back_project(py1, camera.fy(), z);
    let x2 = back_project(px2, camera.fx(), z);
    let y2 = back_project(py2, camera.fy(), z);

    (x2 - x1).hypot(y2 - y1)
}
