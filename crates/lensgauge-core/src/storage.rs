//! Per-request upload storage.
//!
//! Each upload gets its own directory named by a fresh [`UploadId`]:
//!
//! ```text
//! <upload_dir>/
//!   <upload-id>/
//!     upload.<ext>   raw bytes as received
//!     result.jpg     annotated result
//! ```
//!
//! Client-supplied filenames never become paths. Only a sanitized
//! extension survives, so a name like `../../etc/passwd` cannot escape
//! the upload directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// File name of the annotated result inside a slot.
pub const RESULT_FILE_NAME: &str = "result.jpg";

/// Stem of the stored upload inside a slot.
pub const UPLOAD_FILE_STEM: &str = "upload";

/// Public URL prefix under which slots are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const FALLBACK_EXTENSION: &str = "bin";

const MAX_EXTENSION_LEN: usize = 8;

/// Unique identifier for one upload.
///
/// Internally represented as a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadId(Uuid);

impl UploadId {
    /// Creates a new random upload ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UploadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Reduce a client-supplied filename to a safe, lowercase extension.
///
/// Returns `"bin"` when the name has no usable extension.
///
/// # Examples
///
/// ```
/// use lensgauge_core::storage::sanitize_extension;
///
/// assert_eq!(sanitize_extension("Photo.JPG"), "jpg");
/// assert_eq!(sanitize_extension("../../etc/passwd"), "bin");
/// assert_eq!(sanitize_extension("archive.tar.gz"), "gz");
/// ```
pub fn sanitize_extension(filename: &str) -> String {
    // Both separators count, whatever platform the client was on.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let ext = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return FALLBACK_EXTENSION.to_string(),
    };

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return FALLBACK_EXTENSION.to_string();
    }
    ext.to_ascii_lowercase()
}

/// Root directory holding all upload slots.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `root`. Nothing is created until a slot is.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a new slot and create its directory.
    pub fn create_slot(&self) -> Result<UploadSlot> {
        let slot = self.slot(UploadId::new());
        std::fs::create_dir_all(&slot.dir).map_err(|e| Error::io_with_path(e, &slot.dir))?;
        tracing::debug!(upload_id = %slot.id, dir = %slot.dir.display(), "Created upload slot");
        Ok(slot)
    }

    /// The slot for an existing ID. The directory may not exist.
    pub fn slot(&self, id: UploadId) -> UploadSlot {
        UploadSlot {
            id,
            dir: self.root.join(id.to_string()),
        }
    }

    /// Public URL of a slot's result image.
    pub fn result_url(id: UploadId) -> String {
        format!("{UPLOADS_URL_PREFIX}/{id}/{RESULT_FILE_NAME}")
    }
}

/// One upload's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    id: UploadId,
    dir: PathBuf,
}

impl UploadSlot {
    /// Upload ID.
    pub fn id(&self) -> UploadId {
        self.id
    }

    /// Slot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the raw upload is stored, given its sanitized extension.
    pub fn upload_path(&self, ext: &str) -> PathBuf {
        self.dir.join(format!("{UPLOAD_FILE_STEM}.{ext}"))
    }

    /// Where the annotated result is written.
    pub fn result_path(&self) -> PathBuf {
        self.dir.join(RESULT_FILE_NAME)
    }

    /// Persist the raw upload bytes and return the path written.
    pub fn write_upload(&self, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.upload_path(ext);
        std::fs::write(&path, bytes).map_err(|e| Error::io_with_path(e, &path))?;
        Ok(path)
    }
}
