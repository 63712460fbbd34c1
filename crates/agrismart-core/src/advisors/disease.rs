//! Disease Classifier
//!
//! **Question**: What does the crop image show?
//!
//! [`DimensionIndexClassifier`] is a placeholder, not a trained model: it
//! reads the pixel dimensions from the image header and indexes the fixed
//! disease list with `(width + height) mod 6`. It exists so the request
//! pipeline can be exercised end to end until a real classifier is plugged
//! in behind [`DiseaseClassifier`].

use std::io::Cursor;

use image::ImageReader;
use thiserror::Error;

use crate::types::{Disease, ImageDimensions};

/// Errors from image classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The bytes are missing or not a decodable image.
    #[error("image unreadable: {0}")]
    ImageUnreadable(String),

    /// No model is loaded.
    #[error("disease model unavailable")]
    ModelUnavailable,
}

/// Classifies a crop image into one of the known diseases.
///
/// A read failure must surface as [`ClassificationError::ImageUnreadable`],
/// never as a [`Disease::Healthy`] result.
pub trait DiseaseClassifier: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    fn classify(&self, image: &[u8]) -> Result<Disease, ClassificationError>;
}

/// Read pixel dimensions from a PNG or JPEG header.
pub fn decode_dimensions(bytes: &[u8]) -> Result<ImageDimensions, ClassificationError> {
    if bytes.is_empty() {
        return Err(ClassificationError::ImageUnreadable(
            "image is empty".to_string(),
        ));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ClassificationError::ImageUnreadable(e.to_string()))?;

    if reader.format().is_none() {
        return Err(ClassificationError::ImageUnreadable(
            "unrecognized image format".to_string(),
        ));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ClassificationError::ImageUnreadable(e.to_string()))?;

    Ok(ImageDimensions { width, height })
}

/// Placeholder classifier driven by image dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionIndexClassifier;

impl DimensionIndexClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl DiseaseClassifier for DimensionIndexClassifier {
    fn name(&self) -> &str {
        "dimension-index"
    }

    fn classify(&self, image: &[u8]) -> Result<Disease, ClassificationError> {
        let dims = decode_dimensions(image)?;
        let disease = Disease::from_dimensions(dims.width, dims.height);
        tracing::debug!(
            width = dims.width,
            height = dims.height,
            disease = disease.name(),
            "Classified image by dimension index"
        );
        Ok(disease)
    }
}

/// Stands in for a model that could not be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

impl UnavailableClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl DiseaseClassifier for UnavailableClassifier {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn classify(&self, _image: &[u8]) -> Result<Disease, ClassificationError> {
        Err(ClassificationError::ModelUnavailable)
    }
}
