//! Core value types shared by the advisors and the orchestrator.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{FieldError, SoilField, ValidationError};

/// Soil texture class reported by the farmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Loamy,
    Sandy,
    Clay,
}

impl SoilType {
    /// All accepted soil types, in form order.
    pub const ALL: [SoilType; 3] = [SoilType::Loamy, SoilType::Sandy, SoilType::Clay];

    /// Lowercase form value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Loamy => "loamy",
            SoilType::Sandy => "sandy",
            SoilType::Clay => "clay",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SoilType::Loamy => "Loamy",
            SoilType::Sandy => "Sandy",
            SoilType::Clay => "Clay",
        };
        f.write_str(label)
    }
}

/// Error returned when a soil type string is not one of the known values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown soil type '{0}'")]
pub struct UnknownSoilType(pub String);

impl FromStr for SoilType {
    type Err = UnknownSoilType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loamy" => Ok(SoilType::Loamy),
            "sandy" => Ok(SoilType::Sandy),
            "clay" => Ok(SoilType::Clay),
            _ => Err(UnknownSoilType(s.to_string())),
        }
    }
}

/// A validated soil measurement.
///
/// Fields are private: the only way to obtain a sample is through
/// [`SoilSample::new`] or the [`SoilInputValidator`](crate::SoilInputValidator),
/// so every sample that reaches an advisor is range-checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilSample {
    soil_type: SoilType,
    ph: f64,
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    location: String,
}

impl SoilSample {
    /// Build a sample from typed values, applying the same range checks as
    /// form validation. Every violation is reported.
    pub fn new(
        soil_type: SoilType,
        ph: f64,
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        location: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();

        if let Err(e) = crate::validation::check_ph(ph) {
            errors.push(e);
        }
        for (field, value) in [
            (SoilField::Nitrogen, nitrogen),
            (SoilField::Phosphorus, phosphorus),
            (SoilField::Potassium, potassium),
        ] {
            if let Err(e) = crate::validation::check_nutrient(field, value) {
                errors.push(e);
            }
        }

        let location = location.as_ref().trim();
        if location.is_empty() {
            errors.push(FieldError::required(SoilField::Location));
        }

        errors.into_result(|| Self {
            soil_type,
            ph,
            nitrogen,
            phosphorus,
            potassium,
            location: location.to_string(),
        })
    }

    pub fn soil_type(&self) -> SoilType {
        self.soil_type
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }

    /// Nitrogen in ppm.
    pub fn nitrogen(&self) -> f64 {
        self.nitrogen
    }

    /// Phosphorus in ppm.
    pub fn phosphorus(&self) -> f64 {
        self.phosphorus
    }

    /// Potassium in ppm.
    pub fn potassium(&self) -> f64 {
        self.potassium
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Crops the rule table can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crop {
    Rice,
    Wheat,
    Barley,
    Millet,
    Groundnut,
    #[serde(rename = "Sweet Potato")]
    SweetPotato,
    Maize,
    Tomato,
    Bean,
    Sunflower,
    Potato,
}

impl Crop {
    pub fn name(&self) -> &'static str {
        match self {
            Crop::Rice => "Rice",
            Crop::Wheat => "Wheat",
            Crop::Barley => "Barley",
            Crop::Millet => "Millet",
            Crop::Groundnut => "Groundnut",
            Crop::SweetPotato => "Sweet Potato",
            Crop::Maize => "Maize",
            Crop::Tomato => "Tomato",
            Crop::Bean => "Bean",
            Crop::Sunflower => "Sunflower",
            Crop::Potato => "Potato",
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw upload handed over by the form layer.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Filename as sent by the client. Never trusted as a path.
    pub filename: String,

    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lowercased extension of the client filename, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

// Keep raw bytes out of debug logs.
impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Pixel dimensions decoded from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Crop diseases the placeholder classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    Healthy,
    EarlyBlight,
    LateBlight,
    LeafSpot,
    PowderyMildew,
    Rust,
}

impl Disease {
    /// Fixed label order used by the dimension index.
    pub const ALL: [Disease; 6] = [
        Disease::Healthy,
        Disease::EarlyBlight,
        Disease::LateBlight,
        Disease::LeafSpot,
        Disease::PowderyMildew,
        Disease::Rust,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Disease::Healthy => "Healthy",
            Disease::EarlyBlight => "Early Blight",
            Disease::LateBlight => "Late Blight",
            Disease::LeafSpot => "Leaf Spot",
            Disease::PowderyMildew => "Powdery Mildew",
            Disease::Rust => "Rust",
        }
    }

    /// Recommended action for the finding.
    pub fn treatment(&self) -> &'static str {
        match self {
            Disease::Healthy => "No disease detected",
            Disease::EarlyBlight => "Apply copper-based fungicide",
            Disease::LateBlight => "Improve drainage and air circulation",
            Disease::LeafSpot => "Remove affected leaves and apply fungicide",
            Disease::PowderyMildew => "Reduce humidity and apply sulfur spray",
            Disease::Rust => "Apply appropriate fungicide treatment",
        }
    }

    /// Display label, e.g. `"Rust - Apply appropriate fungicide treatment"`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.name(), self.treatment())
    }

    /// Placeholder index: `(width + height) mod 6` into [`Disease::ALL`].
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let index = (u64::from(width) + u64::from(height)) % Self::ALL.len() as u64;
        Self::ALL[index as usize]
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Disease::Healthy)
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name(), self.treatment())
    }
}

/// Outcome of the optional image step.
///
/// Error variants are kept distinct from `Detected` so a failed read can
/// never be mistaken for a healthy crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiseaseFinding {
    Detected { disease: Disease },
    Unreadable { reason: String },
    Unavailable,
    StorageFailed { reason: String },
}

impl DiseaseFinding {
    pub fn disease(&self) -> Option<Disease> {
        match self {
            DiseaseFinding::Detected { disease } => Some(*disease),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, DiseaseFinding::Detected { .. })
    }
}

impl fmt::Display for DiseaseFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiseaseFinding::Detected { disease } => write!(f, "{}", disease),
            DiseaseFinding::Unreadable { reason } => {
                write!(f, "Error analyzing image: {}", reason)
            }
            DiseaseFinding::Unavailable => f.write_str("No model available (demo mode)"),
            DiseaseFinding::StorageFailed { reason } => {
                write!(f, "Error: image could not be stored: {}", reason)
            }
        }
    }
}

/// One day of the 7-day outlook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    #[serde(with = "weekday_name")]
    pub day: Weekday,

    pub temperature_c: i32,

    pub rain_chance_percent: u8,
}

impl ForecastDay {
    pub fn new(day: Weekday, temperature_c: i32, rain_chance_percent: u8) -> Self {
        Self {
            day,
            temperature_c,
            rain_chance_percent: rain_chance_percent.min(100),
        }
    }

    pub fn day_name(&self) -> &'static str {
        weekday_name::full_name(self.day)
    }

    /// Display temperature, e.g. `"25°C"`.
    pub fn temperature_label(&self) -> String {
        format!("{}°C", self.temperature_c)
    }

    /// Display rain chance, e.g. `"10%"`.
    pub fn rain_label(&self) -> String {
        format!("{}%", self.rain_chance_percent)
    }
}

/// Which path produced a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    Generated,
    Fallback,
}

/// A 7-day forecast, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: String,
    pub days: Vec<ForecastDay>,
    pub source: ForecastSource,
}

/// A forecast that is not seven consecutive days starting on Monday.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastShapeError {
    #[error("forecast has {0} days, expected 7")]
    WrongLength(usize),

    #[error("forecast day {index} is {found}, expected {expected}")]
    OutOfOrder {
        index: usize,
        expected: Weekday,
        found: Weekday,
    },
}

impl Forecast {
    /// Number of days in every forecast.
    pub const DAYS: usize = 7;

    /// Build a forecast, rejecting anything but a Monday-first week.
    pub fn new(
        location: impl Into<String>,
        days: Vec<ForecastDay>,
        source: ForecastSource,
    ) -> Result<Self, ForecastShapeError> {
        let forecast = Self {
            location: location.into(),
            days,
            source,
        };
        forecast.check_shape()?;
        Ok(forecast)
    }

    /// Check that `days` is exactly Monday through Sunday.
    pub fn check_shape(&self) -> Result<(), ForecastShapeError> {
        if self.days.len() != Self::DAYS {
            return Err(ForecastShapeError::WrongLength(self.days.len()));
        }

        let week = std::iter::successors(Some(Weekday::Mon), |d| Some(d.succ()));
        for (index, (day, expected)) in self.days.iter().zip(week).enumerate() {
            if day.day != expected {
                return Err(ForecastShapeError::OutOfOrder {
                    index,
                    expected,
                    found: day.day,
                });
            }
        }
        Ok(())
    }

    /// Days whose rain chance is strictly above `threshold` percent.
    pub fn days_with_rain_above(&self, threshold: u8) -> usize {
        self.days
            .iter()
            .filter(|d| d.rain_chance_percent > threshold)
            .count()
    }
}

/// The complete response bundle for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviceReport {
    pub recommended_crop: Crop,

    /// Absent when no image was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_finding: Option<DiseaseFinding>,

    pub forecast: Forecast,

    pub tips: Vec<String>,

    pub soil_sample: SoilSample,

    /// Where the upload was kept, when retention is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_image: Option<PathBuf>,

    pub generated_at: DateTime<Utc>,
}

/// Serialize weekdays by their full English name ("Monday").
pub(crate) mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn full_name(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn serialize<S>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(full_name(*day))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse::<Weekday>()
            .map_err(|_| serde::de::Error::custom(format!("invalid weekday '{}'", name)))
    }
}
