//! Common test utilities and harness for lensgauge-api integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::response::Response;
use http::{Request, header};
use image::{ImageFormat, Rgb, RgbImage};
use lensgauge_api::{AppState, router};
use lensgauge_core::{AnnotationStyle, GaugeConfig};
use tempfile::TempDir;
use tower::ServiceExt;

/// Standard 3x3 matrix with FX = FY = 1000.
pub const UNIT_MATRIX_1000: &str = "1000 0 320\n0 1000 240\n0 0 1\n";

const BOUNDARY: &str = "lensgauge-test-boundary";

/// Test harness for integration tests.
///
/// Owns a temporary directory holding the camera matrix and the upload
/// root, and a router wired to them. The overlay is rendered without a
/// font so results do not depend on the host's installed fonts.
pub struct TestHarness {
    /// Temporary working directory
    pub dir: TempDir,
    /// Effective configuration
    pub config: GaugeConfig,
}

impl TestHarness {
    /// Creates a harness with the FX = FY = 1000 camera matrix.
    pub fn new() -> Self {
        Self::with_matrix(UNIT_MATRIX_1000)
    }

    /// Creates a harness with a custom camera matrix file body.
    pub fn with_matrix(matrix: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let matrix_path = dir.path().join("camera_matrix.txt");
        std::fs::write(&matrix_path, matrix).unwrap();

        let mut config = GaugeConfig::default();
        config.calibration.camera_matrix = matrix_path;
        config.storage.upload_dir = dir.path().join("uploads");
        Self { dir, config }
    }

    /// Router for the current configuration.
    pub fn router(&self) -> Router {
        let state = AppState::with_style(self.config.clone(), AnnotationStyle::default());
        router(state)
    }

    /// Upload root directory.
    pub fn upload_dir(&self) -> &Path {
        &self.config.storage.upload_dir
    }

    /// Slot directories currently present under the upload root.
    pub fn slot_dirs(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.upload_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Send a request through a fresh router.
    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router().oneshot(req).await.unwrap()
    }

    /// `GET path`
    pub async fn get(&self, path: &str) -> Response {
        self.send(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// `POST /` with the given multipart parts.
    pub async fn post_form(&self, parts: &[Part<'_>]) -> Response {
        let (content_type, body) = multipart_body(parts);
        let req = Request::post("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Upload one image under `filename` as field `file`.
    pub async fn upload(&self, filename: &str, data: Vec<u8>) -> Response {
        self.post_form(&[Part::file("file", filename, data)]).await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// One multipart form part.
pub struct Part<'a> {
    /// Field name
    pub name: &'a str,
    /// Filename attribute, if this is a file part
    pub filename: Option<&'a str>,
    /// Part body
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    /// A file part.
    pub fn file(name: &'a str, filename: &'a str, data: Vec<u8>) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }

    /// A plain text part.
    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

/// Encode parts as `multipart/form-data`, returning the content type and body.
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Encode a solid-colour PNG.
pub fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(resp: Response) -> String {
    String::from_utf8(body_bytes(resp).await).unwrap()
}

/// Collect a response body as bytes.
pub async fn body_bytes(resp: Response) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
}

/// Pull the result image URL out of a result page.
pub fn result_url(html: &str) -> String {
    let start = html.find("src=\"").expect("result page has an image") + 5;
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}
