//! Text rendering for reports, forecasts and rejections.

use agrismart_core::{AdviceReport, Forecast, ForecastSource, ValidationError, CROP_RULES};

pub fn report_text(report: &AdviceReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Recommended crop: {}\n", report.recommended_crop));

    if let Some(finding) = &report.disease_finding {
        out.push_str(&format!("Disease analysis: {}\n", finding));
    }
    if let Some(path) = &report.stored_image {
        out.push_str(&format!("Stored image: {}\n", path.display()));
    }

    out.push('\n');
    out.push_str(&forecast_text(&report.forecast));

    out.push_str("\nFarming tips:\n");
    if report.tips.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, tip) in report.tips.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, tip));
    }

    out
}

pub fn forecast_text(forecast: &Forecast) -> String {
    let source = match forecast.source {
        ForecastSource::Generated => "",
        ForecastSource::Fallback => " (fallback)",
    };

    let mut out = format!("7-day forecast for {}{}:\n", forecast.location, source);
    for day in &forecast.days {
        out.push_str(&format!(
            "  {:<10} {:>5}  rain {:>4}\n",
            day.day_name(),
            day.temperature_label(),
            day.rain_label()
        ));
    }
    out
}

pub fn rejection_text(errors: &ValidationError) -> String {
    let mut out = String::from("Submission rejected:\n");
    for error in errors.errors() {
        out.push_str(&format!("  - {}\n", error));
    }
    out
}

pub fn crop_table_text() -> String {
    let mut out = format!(
        "{:<6} {:<8} {:<66} {}\n",
        "Soil", "pH", "Inside window", "Outside window"
    );
    for rule in &CROP_RULES {
        out.push_str(&format!(
            "{:<6} {:<8} {:<66} {}\n",
            rule.soil.as_str(),
            format!("{:.1}-{:.1}", rule.ph_min, rule.ph_max),
            rule.inside_window,
            rule.outside_window
        ));
    }
    out
}
