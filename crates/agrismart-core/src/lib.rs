//! # agrismart-core
//!
//! Deterministic advisory engine for small farms.
//!
//! Given a farmer's soil measurements, this crate answers:
//! - Which crop suits this soil?
//! - What does the crop image show?
//! - What weather is coming this week?
//! - What should the farmer do about it?
//!
//! ## Key Guarantees
//!
//! 1. **Validated input**: advisors only ever see a range-checked [`SoilSample`]
//! 2. **Deterministic rules**: same sample, same crop and tips
//! 3. **Pluggable models**: crop, disease and forecast logic sit behind traits
//! 4. **No silent confusion**: an unreadable image is never reported as healthy
//!
//! ## Example
//!
//! ```rust
//! use agrismart_core::{
//!     CropAdvisor, ForecastProvider, RawSoilInput, RuleBasedCropAdvisor, SoilInputValidator,
//!     StaticForecastProvider, TipComposer,
//! };
//!
//! let input = RawSoilInput {
//!     soil_type: Some("clay".into()),
//!     ph: Some("6.5".into()),
//!     nitrogen: Some("45".into()),
//!     phosphorus: Some("20".into()),
//!     potassium: Some("30".into()),
//!     location: Some("Eldoret".into()),
//! };
//!
//! let sample = SoilInputValidator::new().validate(&input).unwrap();
//! let crop = RuleBasedCropAdvisor::new().recommend(&sample);
//! let forecast = StaticForecastProvider::new().forecast(sample.location());
//! let tips = TipComposer::new().compose(crop, &sample, &forecast);
//!
//! assert_eq!(crop.name(), "Rice");
//! assert_eq!(tips[0], "Maintain water level of 2-5cm in paddy fields");
//! ```

pub mod advisors;
pub mod submission;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use advisors::{
    crop_rule, decode_dimensions, fallback_forecast, ClassificationError, CropAdvisor, CropRule,
    DimensionIndexClassifier, DiseaseClassifier, ForecastGenerationError, ForecastProvider,
    MockForecastProvider, RuleBasedCropAdvisor, StaticForecastProvider, TipComposer,
    UnavailableClassifier, CROP_RULES,
};
pub use submission::{validate_submission_schema, ImageAttachment, Submission, SubmissionError};
pub use types::{
    AdviceReport, Crop, Disease, DiseaseFinding, Forecast, ForecastDay, ForecastShapeError,
    ForecastSource, ImageDimensions, SoilSample, SoilType, UploadedImage,
};
pub use validation::{
    FieldError, FieldValue, RawSoilInput, SoilField, SoilInputValidator, ValidationError,
};
