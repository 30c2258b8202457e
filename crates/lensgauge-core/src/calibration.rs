//! Camera matrix loading.
//!
//! The camera matrix is stored as plain text: one row per line, values
//! separated by whitespace. A typical file is the 3x3 intrinsic matrix
//! written by a calibration tool:
//!
//! ```text
//! 1.0e+03 0.0     3.2e+02
//! 0.0     1.0e+03 2.4e+02
//! 0.0     0.0     1.0
//! ```
//!
//! Only the focal lengths on the diagonal (`fx = m[0][0]`, `fy = m[1][1]`)
//! are used. Anything that does not provide both is rejected with
//! [`Error::MalformedCalibration`].

use std::path::Path;

use crate::{Error, Result};

/// A camera intrinsic matrix read from a calibration file.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMatrix {
    rows: Vec<Vec<f64>>,
}

impl CameraMatrix {
    /// Parse a camera matrix from its text form.
    ///
    /// Blank lines are skipped. Every other line must consist of
    /// floating-point numbers.
    ///
    /// # Examples
    ///
    /// ```
    /// use lensgauge_core::CameraMatrix;
    ///
    /// let m = CameraMatrix::parse("800 0 320\n0 600 240\n0 0 1\n").unwrap();
    /// assert_eq!(m.fx(), 800.0);
    /// assert_eq!(m.fy(), 600.0);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|_| {
                        Error::malformed(format!(
                            "line {}: '{token}' is not a number",
                            index + 1
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    /// Build a camera matrix from rows, validating that both focal lengths exist.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() < 2 {
            return Err(Error::malformed(format!(
                "expected at least 2 rows, found {}",
                rows.len()
            )));
        }
        for (i, row) in rows.iter().take(2).enumerate() {
            if row.len() < 2 {
                return Err(Error::malformed(format!(
                    "row {} has {} column(s), expected at least 2",
                    i + 1,
                    row.len()
                )));
            }
        }

        let matrix = Self { rows };
        for (name, value) in [("fx", matrix.fx()), ("fy", matrix.fy())] {
            if !value.is_finite() || value == 0.0 {
                return Err(Error::malformed(format!(
                    "focal length {name} must be finite and non-zero, got {value}"
                )));
            }
        }
        Ok(matrix)
    }

    /// Read and parse a camera matrix file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let matrix = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            fx = matrix.fx(),
            fy = matrix.fy(),
            "Loaded camera matrix"
        );
        Ok(matrix)
    }

    /// Horizontal focal length in pixels, `m[0][0]`.
    pub fn fx(&self) -> f64 {
        self.rows[0][0]
    }

    /// Vertical focal length in pixels, `m[1][1]`.
    pub fn fy(&self) -> f64 {
        self.rows[1][1]
    }

    /// All parsed rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}
