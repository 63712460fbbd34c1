//! Crop Advisor
//!
//! **Question**: Which crop suits this soil?
//!
//! The default implementation is a fixed decision table keyed on soil type,
//! then pH window, then nutrient levels. First match wins and every bound is
//! inclusive.
//!
//! | Soil | pH window | Inside window | Outside window |
//! |------|-----------|---------------|----------------|
//! | clay | 6.0–7.5 | Rice if N ≥ 40, else Wheat | Barley |
//! | sandy | 6.0–8.0 | Millet if K ≥ 35, else Groundnut | Sweet Potato |
//! | loamy | 6.0–7.0 | Maize if N ≥ 50 and P ≥ 25, else Tomato if K ≥ 40, else Bean | Sunflower above, Potato below |

use serde::Serialize;

use crate::types::{Crop, SoilSample, SoilType};

/// One row of the decision table: a soil type, its pH window and the crops
/// each side of the window can yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropRule {
    pub soil: SoilType,
    pub ph_min: f64,
    pub ph_max: f64,
    pub inside_window: &'static str,
    pub outside_window: &'static str,
    pub inside_crops: &'static [Crop],
    pub outside_crops: &'static [Crop],
}

impl CropRule {
    /// Inclusive on both ends.
    pub fn contains_ph(&self, ph: f64) -> bool {
        (self.ph_min..=self.ph_max).contains(&ph)
    }
}

/// The rule table [`RuleBasedCropAdvisor`] applies, one row per soil type.
pub const CROP_RULES: [CropRule; 3] = [
    CropRule {
        soil: SoilType::Clay,
        ph_min: 6.0,
        ph_max: 7.5,
        inside_window: "Rice if N >= 40, else Wheat",
        outside_window: "Barley",
        inside_crops: &[Crop::Rice, Crop::Wheat],
        outside_crops: &[Crop::Barley],
    },
    CropRule {
        soil: SoilType::Sandy,
        ph_min: 6.0,
        ph_max: 8.0,
        inside_window: "Millet if K >= 35, else Groundnut",
        outside_window: "Sweet Potato",
        inside_crops: &[Crop::Millet, Crop::Groundnut],
        outside_crops: &[Crop::SweetPotato],
    },
    CropRule {
        soil: SoilType::Loamy,
        ph_min: 6.0,
        ph_max: 7.0,
        inside_window: "Maize if N >= 50 and P >= 25, else Tomato if K >= 40, else Bean",
        outside_window: "Sunflower above, Potato below",
        inside_crops: &[Crop::Maize, Crop::Tomato, Crop::Bean],
        outside_crops: &[Crop::Sunflower, Crop::Potato],
    },
];

/// The table row for `soil`.
pub fn crop_rule(soil: SoilType) -> &'static CropRule {
    match soil {
        SoilType::Clay => &CROP_RULES[0],
        SoilType::Sandy => &CROP_RULES[1],
        SoilType::Loamy => &CROP_RULES[2],
    }
}

/// Maps a validated soil sample to a crop recommendation.
///
/// Implementations must be total over every valid [`SoilSample`].
pub trait CropAdvisor: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    fn recommend(&self, sample: &SoilSample) -> Crop;
}

/// The rule table described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedCropAdvisor;

impl RuleBasedCropAdvisor {
    pub fn new() -> Self {
        Self
    }

    fn clay(ph: f64, nitrogen: f64) -> Crop {
        if crop_rule(SoilType::Clay).contains_ph(ph) {
            if nitrogen >= 40.0 {
                Crop::Rice
            } else {
                Crop::Wheat
            }
        } else {
            Crop::Barley
        }
    }

    fn sandy(ph: f64, potassium: f64) -> Crop {
        if crop_rule(SoilType::Sandy).contains_ph(ph) {
            if potassium >= 35.0 {
                Crop::Millet
            } else {
                Crop::Groundnut
            }
        } else {
            Crop::SweetPotato
        }
    }

    fn loamy(ph: f64, nitrogen: f64, phosphorus: f64, potassium: f64) -> Crop {
        let rule = crop_rule(SoilType::Loamy);
        if rule.contains_ph(ph) {
            if nitrogen >= 50.0 && phosphorus >= 25.0 {
                Crop::Maize
            } else if potassium >= 40.0 {
                Crop::Tomato
            } else {
                Crop::Bean
            }
        } else if ph > rule.ph_max {
            Crop::Sunflower
        } else {
            Crop::Potato
        }
    }
}

impl CropAdvisor for RuleBasedCropAdvisor {
    fn name(&self) -> &str {
        "rule-table"
    }

    fn recommend(&self, sample: &SoilSample) -> Crop {
        match sample.soil_type() {
            SoilType::Clay => Self::clay(sample.ph(), sample.nitrogen()),
            SoilType::Sandy => Self::sandy(sample.ph(), sample.potassium()),
            SoilType::Loamy => Self::loamy(
                sample.ph(),
                sample.nitrogen(),
                sample.phosphorus(),
                sample.potassium(),
            ),
        }
    }
}
