//! Measurement overlay.
//!
//! Draws the measured region (green rectangle), the measuring line (red),
//! and a `Diameter: <value> <unit>` label onto the result image. The overlay
//! is cosmetic and never feeds back into the measurement.
//!
//! All primitives are clipped to the image, so regions that fall partly or
//! wholly outside a small image are drawn as far as they fit.

use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::measure::MeasurementRegion;
use crate::{Error, Result};

const RECT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const LINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// How the overlay is rendered.
pub struct AnnotationStyle {
    /// Font for the label. If None, the label is skipped.
    pub font: Option<FontVec>,

    /// Label height in pixels.
    pub font_scale: f32,

    /// Rectangle outline thickness in pixels.
    pub rect_thickness: u32,

    /// Measuring line thickness in pixels.
    pub line_thickness: u32,

    /// Top-left corner of the label.
    pub text_origin: (i32, i32),
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 32.0,
            rect_thickness: 5,
            line_thickness: 8,
            text_origin: (10, 30),
        }
    }
}

impl std::fmt::Debug for AnnotationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStyle")
            .field("font", &self.font.as_ref().map(|_| "<font>"))
            .field("font_scale", &self.font_scale)
            .field("rect_thickness", &self.rect_thickness)
            .field("line_thickness", &self.line_thickness)
            .field("text_origin", &self.text_origin)
            .finish()
    }
}

impl AnnotationStyle {
    /// Default style with the font loaded from `font_path`.
    pub fn with_font_path(font_path: &Path) -> Result<Self> {
        let font_data = std::fs::read(font_path).map_err(|e| Error::io_with_path(e, font_path))?;
        let font = FontVec::try_from_vec(font_data).map_err(|_| {
            Error::config(format!("Failed to parse font file: {}", font_path.display()))
        })?;

        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }

    /// Default style with the first system font that loads.
    ///
    /// Falls back to a font-less style, which draws shapes only.
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(font_data) = std::fs::read(path)
                && let Ok(font) = FontVec::try_from_vec(font_data)
            {
                info!("Loaded system font: {}", path);
                return Self {
                    font: Some(font),
                    ..Self::default()
                };
            }
        }

        debug!("No system font found, diameter label will be skipped");
        Self::default()
    }

    /// Resolve the style from an optional configured font path.
    pub fn from_font_setting(font: Option<&Path>) -> Result<Self> {
        match font {
            Some(path) => Self::with_font_path(path),
            None => Ok(Self::with_system_font()),
        }
    }
}

/// Text shown on the result image.
///
/// # Examples
///
/// ```
/// use lensgauge_core::annotate::format_label;
///
/// assert_eq!(format_label(4.17226, "cm"), "Diameter: 4.17 cm");
/// ```
pub fn format_label(diameter: f64, unit: &str) -> String {
    format!("Diameter: {diameter:.2} {unit}")
}

/// Draw the measurement overlay onto `img`.
///
/// Regions outside the drawable coordinate range, or wholly off the image,
/// get no shapes; the label is still drawn.
pub fn draw_measurement(
    img: &mut RgbImage,
    region: &MeasurementRegion,
    label: &str,
    style: &AnnotationStyle,
) {
    let margin = style.rect_thickness.max(style.line_thickness);
    if !region.is_addressable() {
        warn!(?region, "Measurement region is out of drawable range, skipping shapes");
    } else if region.x > img.width().saturating_add(margin)
        || region.y > img.height().saturating_add(margin)
    {
        debug!(?region, "Measurement region lies outside the image, skipping shapes");
    } else {
        draw_region(img, region, style.rect_thickness);
        draw_measuring_line(img, region, style.line_thickness);
    }

    let Some(ref font) = style.font else {
        debug!("No font configured, skipping label '{}'", label);
        return;
    };
    let (x, y) = style.text_origin;
    draw_text_mut(img, TEXT_COLOR, x, y, style.font_scale, font, label);
}

/// Offsets `-thickness/2 .. thickness - thickness/2` around an outline.
fn stroke_offsets(thickness: u32) -> std::ops::Range<i64> {
    let half = i64::from(thickness / 2);
    -half..(i64::from(thickness) - half)
}

/// Rectangle from `(x, y)` to `(x + width, y + height)`, grown outwards and
/// inwards around that outline until it is `thickness` pixels wide.
fn draw_region(img: &mut RgbImage, region: &MeasurementRegion, thickness: u32) {
    for offset in stroke_offsets(thickness) {
        let left = i64::from(region.x) - offset;
        let top = i64::from(region.y) - offset;
        let w = i64::from(region.width) + 2 * offset + 1;
        let h = i64::from(region.height) + 2 * offset + 1;
        let (Ok(left), Ok(top), Ok(w), Ok(h)) = (
            i32::try_from(left),
            i32::try_from(top),
            u32::try_from(w),
            u32::try_from(h),
        ) else {
            continue;
        };
        if w == 0 || h == 0 {
            continue;
        }
        // Rect computes its right and bottom edges in i32.
        if i32::try_from(i64::from(left) + i64::from(w)).is_err()
            || i32::try_from(i64::from(top) + i64::from(h)).is_err()
        {
            continue;
        }
        let rect = Rect::at(left, top).of_size(w, h);
        draw_hollow_rect_mut(img, rect, RECT_COLOR);
    }
}

/// Vertical line along the left edge of the region, `thickness` pixels wide.
fn draw_measuring_line(img: &mut RgbImage, region: &MeasurementRegion, thickness: u32) {
    let x = f64::from(region.x);
    let start_y = f64::from(region.y) as f32;
    let end_y = (f64::from(region.y) + f64::from(region.height)) as f32;

    for offset in stroke_offsets(thickness) {
        let ox = (x + offset as f64) as f32;
        draw_line_segment_mut(img, (ox, start_y), (ox, end_y), LINE_COLOR);
    }
}
