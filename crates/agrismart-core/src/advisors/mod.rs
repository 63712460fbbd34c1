//! Advisors: the pluggable decision points of an advisory request.
//!
//! | Advisor | Answers |
//! |---------|---------|
//! | [`CropAdvisor`] | Which crop suits this soil? |
//! | [`DiseaseClassifier`] | What does the crop image show? |
//! | [`ForecastProvider`] | What weather is coming this week? |
//! | [`TipComposer`] | What should the farmer do about it? |
//!
//! The first three are traits so a trained model or a real weather feed can
//! replace the rule-based defaults without touching the orchestrator.

mod crop;
mod disease;
mod forecast;
mod tips;

pub use crop::{crop_rule, CropAdvisor, CropRule, RuleBasedCropAdvisor, CROP_RULES};
pub use disease::{
    decode_dimensions, ClassificationError, DimensionIndexClassifier, DiseaseClassifier,
    UnavailableClassifier,
};
pub use forecast::{
    fallback_forecast, ForecastGenerationError, ForecastProvider, MockForecastProvider,
    StaticForecastProvider, RAIN_CHANCES, TEMPERATURE_BASE_C,
};
pub use tips::TipComposer;
