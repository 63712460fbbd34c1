//! Forecast Provider
//!
//! **Question**: What weather is coming this week?
//!
//! No real weather feed is wired in. [`MockForecastProvider`] draws plausible
//! values from an injected randomness source; if drawing fails for any
//! reason it returns the static fallback table instead. Callers always get a
//! 7-day forecast, Monday first.

use chrono::Weekday;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use thiserror::Error;

use crate::types::{Forecast, ForecastDay, ForecastSource};

/// Centre of the mock temperature range, in °C.
pub const TEMPERATURE_BASE_C: i32 = 25;

const TEMPERATURE_OFFSET_MIN: i32 = -5;
const TEMPERATURE_OFFSET_MAX: i32 = 10;

/// Rain chances the mock generator picks from, in percent.
pub const RAIN_CHANCES: [u8; 6] = [0, 10, 20, 30, 60, 80];

/// Static week used whenever generation fails: (day, rain %, °C).
const FALLBACK_WEEK: [(Weekday, u8, i32); 7] = [
    (Weekday::Mon, 10, 25),
    (Weekday::Tue, 0, 27),
    (Weekday::Wed, 20, 24),
    (Weekday::Thu, 5, 26),
    (Weekday::Fri, 30, 23),
    (Weekday::Sat, 60, 22),
    (Weekday::Sun, 40, 24),
];

/// Internal failure while generating a forecast. Never returned to callers.
#[derive(Error, Debug)]
pub enum ForecastGenerationError {
    #[error("randomness source failed: {0}")]
    Randomness(#[from] rand::Error),
}

/// Produces a 7-day forecast for a location.
///
/// Implementations must not fail: internal errors degrade to
/// [`fallback_forecast`].
pub trait ForecastProvider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    fn forecast(&self, location: &str) -> Forecast;
}

/// Weekdays Monday through Sunday.
fn week() -> impl Iterator<Item = Weekday> {
    std::iter::successors(Some(Weekday::Mon), |d| Some(d.succ())).take(Forecast::DAYS)
}

/// The static fallback week for `location`.
pub fn fallback_forecast(location: &str) -> Forecast {
    Forecast {
        location: location.to_string(),
        days: FALLBACK_WEEK
            .iter()
            .map(|&(day, rain, temp)| ForecastDay::new(day, temp, rain))
            .collect(),
        source: ForecastSource::Fallback,
    }
}

/// Random mock forecast with a static fallback.
pub struct MockForecastProvider {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl MockForecastProvider {
    /// Use an OS-seeded generator.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Use a deterministic generator; same seed, same sequence of forecasts.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Use any randomness source.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Seed a per-forecast generator from the injected source, then sample
    /// the week from it. Only the seed draw can fail.
    fn generate(&self) -> Result<Vec<ForecastDay>, ForecastGenerationError> {
        let mut seed = <StdRng as SeedableRng>::Seed::default();
        self.rng.lock().try_fill_bytes(&mut seed)?;
        let mut draws = StdRng::from_seed(seed);

        let days = week()
            .map(|day| {
                let offset = draws.gen_range(TEMPERATURE_OFFSET_MIN..=TEMPERATURE_OFFSET_MAX);
                let rain = RAIN_CHANCES.choose(&mut draws).copied().unwrap_or_default();
                ForecastDay::new(day, TEMPERATURE_BASE_C + offset, rain)
            })
            .collect();

        Ok(days)
    }
}

impl Default for MockForecastProvider {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for MockForecastProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockForecastProvider").finish_non_exhaustive()
    }
}

impl ForecastProvider for MockForecastProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn forecast(&self, location: &str) -> Forecast {
        match self.generate() {
            Ok(days) => Forecast {
                location: location.to_string(),
                days,
                source: ForecastSource::Generated,
            },
            Err(e) => {
                tracing::warn!(location, error = %e, "Forecast generation failed, using fallback table");
                fallback_forecast(location)
            }
        }
    }
}

/// Always returns the fallback table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticForecastProvider;

impl StaticForecastProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastProvider for StaticForecastProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn forecast(&self, location: &str) -> Forecast {
        fallback_forecast(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A randomness source that always fails.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    fn weekdays(forecast: &Forecast) -> Vec<&'static str> {
        forecast.days.iter().map(|d| d.day_name()).collect()
    }

    #[test]
    fn test_fallback_table_exact_values() {
        let forecast = fallback_forecast("Nyeri");
        assert!(forecast.check_shape().is_ok());
        let table: Vec<(&str, u8, i32)> = forecast
            .days
            .iter()
            .map(|d| (d.day_name(), d.rain_chance_percent, d.temperature_c))
            .collect();

        assert_eq!(
            table,
            vec![
                ("Monday", 10, 25),
                ("Tuesday", 0, 27),
                ("Wednesday", 20, 24),
                ("Thursday", 5, 26),
                ("Friday", 30, 23),
                ("Saturday", 60, 22),
                ("Sunday", 40, 24),
            ]
        );
        assert_eq!(forecast.location, "Nyeri");
        assert_eq!(forecast.source, ForecastSource::Fallback);
    }

    #[test]
    fn test_generated_forecast_shape() {
        let provider = MockForecastProvider::seeded(7);
        for _ in 0..20 {
            let forecast = provider.forecast("Machakos");
            assert_eq!(forecast.source, ForecastSource::Generated);
            assert!(forecast.check_shape().is_ok());
            assert_eq!(
                weekdays(&forecast),
                vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
            );
            for day in &forecast.days {
                assert!((20..=35).contains(&day.temperature_c));
                assert!(RAIN_CHANCES.contains(&day.rain_chance_percent));
            }
        }
    }

    #[test]
    fn test_same_seed_same_forecast() {
        let a = MockForecastProvider::seeded(42).forecast("Thika");
        let b = MockForecastProvider::seeded(42).forecast("Thika");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generation_failure_degrades_to_fallback() {
        let provider = MockForecastProvider::with_rng(BrokenRng);
        let forecast = provider.forecast("Kitale");
        assert_eq!(forecast, fallback_forecast("Kitale"));
    }

    #[test]
    fn test_static_provider_is_idempotent() {
        let provider = StaticForecastProvider::new();
        assert_eq!(provider.forecast("Meru"), provider.forecast("Meru"));
        assert_eq!(provider.forecast("Meru").days.len(), Forecast::DAYS);
    }
}
