//! Tip Composer
//!
//! **Question**: What should the farmer do about it?
//!
//! Tips are appended in a fixed order and never reordered:
//! 1. crop-specific tips (Maize, Rice and Wheat have entries),
//! 2. one soil pH tip when the sample is too acidic or too alkaline,
//! 3. drainage and fungicide tips when at least three days are wet.

use crate::types::{Crop, Forecast, SoilSample};

/// Below this pH, recommend lime.
pub const ACIDIC_PH: f64 = 6.0;

/// Above this pH, recommend organic matter.
pub const ALKALINE_PH: f64 = 8.0;

/// A day is "wet" when its rain chance is strictly above this percentage.
pub const WET_DAY_RAIN_PERCENT: u8 = 50;

/// Wet days needed before the weather tips are added.
pub const WET_DAYS_FOR_WARNING: usize = 3;

const LIME_TIP: &str = "Consider adding lime to increase soil pH";
const ORGANIC_MATTER_TIP: &str = "Consider adding organic matter to lower soil pH";
const DRAINAGE_TIP: &str = "High rainfall expected - ensure proper drainage";
const FUNGICIDE_TIP: &str = "Consider fungicide application to prevent diseases";

/// Crop-specific tips, in table order. Crops without an entry get none.
fn crop_tips(crop: Crop) -> &'static [&'static str] {
    match crop {
        Crop::Maize => &[
            "Plant during the rainy season for optimal growth",
            "Ensure proper spacing of 75cm between rows",
            "Apply nitrogen fertilizer at planting and during growth",
        ],
        Crop::Rice => &[
            "Maintain water level of 2-5cm in paddy fields",
            "Transplant seedlings after 20-25 days",
            "Apply phosphorus fertilizer before planting",
        ],
        Crop::Wheat => &[
            "Plant in well-drained soil with good organic matter",
            "Optimal planting time is October-December",
            "Apply balanced NPK fertilizer",
        ],
        _ => &[],
    }
}

/// Combines crop, soil and weather into an ordered list of tips.
#[derive(Debug, Clone, Copy, Default)]
pub struct TipComposer;

impl TipComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, crop: Crop, sample: &SoilSample, forecast: &Forecast) -> Vec<String> {
        let mut tips: Vec<String> = crop_tips(crop).iter().map(|t| t.to_string()).collect();

        if let Some(tip) = Self::soil_tip(sample.ph()) {
            tips.push(tip.to_string());
        }

        if forecast.days_with_rain_above(WET_DAY_RAIN_PERCENT) >= WET_DAYS_FOR_WARNING {
            tips.push(DRAINAGE_TIP.to_string());
            tips.push(FUNGICIDE_TIP.to_string());
        }

        tips
    }

    fn soil_tip(ph: f64) -> Option<&'static str> {
        if ph < ACIDIC_PH {
            Some(LIME_TIP)
        } else if ph > ALKALINE_PH {
            Some(ORGANIC_MATTER_TIP)
        } else {
            None
        }
    }
}
