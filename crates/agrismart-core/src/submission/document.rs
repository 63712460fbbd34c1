//! Submission documents in YAML or JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::schema::validate_submission_schema;
use crate::types::UploadedImage;
use crate::validation::RawSoilInput;

/// Errors that can occur when loading a submission.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Failed to read submission file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Submission does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Failed to read image {}: {source}", path.display())]
    ImageError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reference to an image file attached to a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageAttachment {
    /// Path to the image, relative to the submission document.
    pub path: PathBuf,

    /// Client filename to report; defaults to the path's file name.
    #[serde(default)]
    pub filename: Option<String>,
}

/// One farmer submission: raw soil fields plus an optional image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    #[serde(flatten)]
    pub soil: RawSoilInput,

    #[serde(default)]
    pub image: Option<ImageAttachment>,
}

impl Submission {
    /// Parse a submission from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SubmissionError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a submission from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SubmissionError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a submission file. `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SubmissionError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, SubmissionError> {
        validate_submission_schema(&value).map_err(SubmissionError::SchemaError)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Load the attached image, resolving relative paths against `base_dir`.
    ///
    /// An attachment whose filename is empty counts as no image.
    pub fn load_image(&self, base_dir: &Path) -> Result<Option<UploadedImage>, SubmissionError> {
        let Some(attachment) = &self.image else {
            return Ok(None);
        };

        let path = if attachment.path.is_absolute() {
            attachment.path.clone()
        } else {
            base_dir.join(&attachment.path)
        };

        let filename = match &attachment.filename {
            Some(name) => name.clone(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        if filename.trim().is_empty() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|source| SubmissionError::ImageError {
            path: path.clone(),
            source,
        })?;

        Ok(Some(UploadedImage::new(filename, bytes)))
    }
}
