//! Health check endpoint.
//!
//! Reports service status and version, plus whether the calibration file
//! is currently readable. The check never fails the request: a broken
//! calibration file shows up as `"degraded"`.

use axum::Json;
use axum::extract::State;
use lensgauge_core::CameraMatrix;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"degraded"`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Whether the camera matrix loads and validates.
    pub calibration_ok: bool,
    /// Whether a label font is loaded.
    pub font_loaded: bool,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let path = state.config.calibration.camera_matrix.clone();
    let calibration_ok = tokio::task::spawn_blocking(move || CameraMatrix::load(path))
        .await
        .map(|loaded| loaded.is_ok())
        .unwrap_or(false);

    Json(HealthResponse {
        status: if calibration_ok { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        calibration_ok,
        font_loaded: state.style.font.is_some(),
    })
}
