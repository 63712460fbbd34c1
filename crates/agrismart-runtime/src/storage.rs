//! Upload storage.
//!
//! Uploads are written under a caller-owned directory with a sanitized,
//! timestamped name. Files are opened with `create_new`, so two requests can
//! never overwrite each other's upload: on a name clash a numeric suffix is
//! added and the create is retried.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use agrismart_core::UploadedImage;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Name used when nothing of the client filename survives sanitizing.
const FALLBACK_NAME: &str = "upload";

/// Suffixed names tried before giving up on a clash.
const MAX_NAME_ATTEMPTS: u32 = 100;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Errors from persisting or discarding uploads.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("upload directory {} does not exist", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no free filename for '{0}'")]
    NameExhausted(String),
}

/// Where an upload was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub path: PathBuf,

    /// File name within the upload directory.
    pub filename: String,
}

/// Persists uploads for the duration of a request (or longer, for audit).
pub trait ImageStore: Send + Sync {
    fn persist(&self, image: &UploadedImage) -> Result<StoredImage, StorageError>;

    fn discard(&self, stored: &StoredImage) -> Result<(), StorageError>;
}

/// Reduce a client filename to a safe single path component.
///
/// Path separators and whitespace become underscores, anything outside
/// `[A-Za-z0-9_.-]` is dropped, and leading/trailing dots and underscores
/// are stripped. Returns `"upload"` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    let spaced = name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split `name` into stem and extension (with the dot).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

/// Stores uploads as files in one directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate_name(base: &str, attempt: u32) -> String {
        if attempt == 0 {
            return base.to_string();
        }
        let (stem, ext) = split_extension(base);
        format!("{}-{}{}", stem, attempt, ext)
    }
}

impl ImageStore for FsImageStore {
    fn persist(&self, image: &UploadedImage) -> Result<StoredImage, StorageError> {
        if !self.dir.is_dir() {
            return Err(StorageError::DirectoryMissing(self.dir.clone()));
        }

        let base = format!(
            "{}_{}",
            Utc::now().format("%Y%m%dT%H%M%S%6f"),
            sanitize_filename(&image.filename)
        );

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let filename = Self::candidate_name(&base, attempt);
            let path = self.dir.join(&filename);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StorageError::Io { path, source }),
            };

            if let Err(source) = file.write_all(&image.bytes).and_then(|_| file.flush()) {
                // Do not leave a partial file behind
                let _ = fs::remove_file(&path);
                return Err(StorageError::Io { path, source });
            }

            tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "Stored upload");
            return Ok(StoredImage { path, filename });
        }

        Err(StorageError::NameExhausted(base))
    }

    fn discard(&self, stored: &StoredImage) -> Result<(), StorageError> {
        match fs::remove_file(&stored.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: stored.path.clone(),
                source,
            }),
        }
    }
}
