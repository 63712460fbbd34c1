//! Semantic validation of raw form fields into a [`SoilSample`].
//!
//! Values arrive already type-coerced by the form layer (numbers or
//! strings) but not range-checked. Every violation is collected so the
//! caller can report all of them at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{SoilSample, SoilType};

/// Upper bound of the pH scale.
pub const PH_MAX: f64 = 14.0;

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilField {
    SoilType,
    Ph,
    Nitrogen,
    Phosphorus,
    Potassium,
    Location,
    Image,
}

impl SoilField {
    /// Form field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilField::SoilType => "soil_type",
            SoilField::Ph => "ph",
            SoilField::Nitrogen => "nitrogen",
            SoilField::Phosphorus => "phosphorus",
            SoilField::Potassium => "potassium",
            SoilField::Location => "location",
            SoilField::Image => "image",
        }
    }

    /// Human-readable label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            SoilField::SoilType => "Soil type",
            SoilField::Ph => "pH",
            SoilField::Nitrogen => "Nitrogen",
            SoilField::Phosphorus => "Phosphorus",
            SoilField::Potassium => "Potassium",
            SoilField::Location => "Location",
            SoilField::Image => "Image",
        }
    }
}

impl fmt::Display for SoilField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: SoilField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: SoilField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: SoilField) -> Self {
        Self::new(field, "This field is required.")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All violations found in one submission.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("invalid submission: {}", join_errors(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationError) {
        self.errors.extend(other.errors);
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: SoilField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Messages reported for `field`, in the order they were found.
    pub fn messages_for(&self, field: SoilField) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// `Ok(build())` when no errors were collected, otherwise `Err(self)`.
    pub fn into_result<T>(self, build: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(self)
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A form value as delivered by the form layer: either a number or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Unvalidated soil fields from one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSoilInput {
    #[serde(default)]
    pub soil_type: Option<FieldValue>,
    #[serde(default)]
    pub ph: Option<FieldValue>,
    #[serde(default)]
    pub nitrogen: Option<FieldValue>,
    #[serde(default)]
    pub phosphorus: Option<FieldValue>,
    #[serde(default)]
    pub potassium: Option<FieldValue>,
    #[serde(default)]
    pub location: Option<FieldValue>,
}

/// Validates raw form fields into a [`SoilSample`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SoilInputValidator;

impl SoilInputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate every field and collect all violations.
    pub fn validate(&self, input: &RawSoilInput) -> Result<SoilSample, ValidationError> {
        let mut errors = ValidationError::default();

        let soil_type = collect(&mut errors, parse_soil_type(input.soil_type.as_ref()));
        let ph = collect(
            &mut errors,
            parse_number(SoilField::Ph, input.ph.as_ref()).and_then(check_ph),
        );
        let nitrogen = collect(
            &mut errors,
            parse_number(SoilField::Nitrogen, input.nitrogen.as_ref())
                .and_then(|v| check_nutrient(SoilField::Nitrogen, v)),
        );
        let phosphorus = collect(
            &mut errors,
            parse_number(SoilField::Phosphorus, input.phosphorus.as_ref())
                .and_then(|v| check_nutrient(SoilField::Phosphorus, v)),
        );
        let potassium = collect(
            &mut errors,
            parse_number(SoilField::Potassium, input.potassium.as_ref())
                .and_then(|v| check_nutrient(SoilField::Potassium, v)),
        );
        let location = collect(&mut errors, parse_location(input.location.as_ref()));

        match (soil_type, ph, nitrogen, phosphorus, potassium, location) {
            (Some(soil_type), Some(ph), Some(n), Some(p), Some(k), Some(location))
                if errors.is_empty() =>
            {
                SoilSample::new(soil_type, ph, n, p, k, location)
            }
            _ => Err(errors),
        }
    }
}

fn collect<T>(errors: &mut ValidationError, result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn parse_soil_type(value: Option<&FieldValue>) -> Result<SoilType, FieldError> {
    let invalid = || {
        FieldError::new(
            SoilField::SoilType,
            "Soil type must be one of: loamy, sandy, clay",
        )
    };

    match value {
        None => Err(FieldError::required(SoilField::SoilType)),
        Some(v) if v.is_blank() => Err(FieldError::required(SoilField::SoilType)),
        Some(FieldValue::Text(s)) => s.parse::<SoilType>().map_err(|_| invalid()),
        Some(FieldValue::Number(_)) => Err(invalid()),
    }
}

fn parse_number(field: SoilField, value: Option<&FieldValue>) -> Result<f64, FieldError> {
    let not_a_number = || FieldError::new(field, format!("{} must be a number", field.label()));

    let number = match value {
        None => return Err(FieldError::required(field)),
        Some(v) if v.is_blank() => return Err(FieldError::required(field)),
        Some(FieldValue::Number(n)) => *n,
        Some(FieldValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| not_a_number())?,
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(not_a_number())
    }
}

fn parse_location(value: Option<&FieldValue>) -> Result<String, FieldError> {
    match value {
        Some(FieldValue::Text(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(FieldValue::Number(n)) => Ok(n.to_string()),
        _ => Err(FieldError::required(SoilField::Location)),
    }
}

pub(crate) fn check_ph(ph: f64) -> Result<f64, FieldError> {
    if ph.is_finite() && (0.0..=PH_MAX).contains(&ph) {
        Ok(ph)
    } else {
        Err(FieldError::new(SoilField::Ph, "pH must be between 0 and 14"))
    }
}

pub(crate) fn check_nutrient(field: SoilField, value: f64) -> Result<f64, FieldError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FieldError::new(
            field,
            format!("{} must not be negative", field.label()),
        ))
    }
}
