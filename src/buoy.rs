//! Cross-checks a model's swell breakdown against a live buoy.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::models::{BuoyReading, SwellComponent, SwellSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwellSource {
    Model,
    Buoy,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    OutOfTolerance,
    StaleBuoy,
    NoBuoy,
    NoForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwellValidation {
    pub components: SwellSet,
    pub source: SwellSource,
    pub outcome: ValidationOutcome,
    pub ratio: Option<f64>,
}

/// Root-sum-square of the given heights, `None` when there are none.
pub fn rss_total(heights: &[f64]) -> Option<f64> {
    if heights.is_empty() {
        return None;
    }
    Some(heights.iter().map(|h| h * h).sum::<f64>().sqrt())
}

pub fn energy_ratio(forecast: &SwellSet, buoy_total_ft: f64) -> Option<f64> {
    let forecast_total = rss_total(&forecast.heights())?;
    if buoy_total_ft <= 0.0 {
        return None;
    }
    Some(forecast_total / buoy_total_ft)
}

fn observed(component: SwellComponent) -> Option<SwellComponent> {
    component.height_ft.is_some().then_some(component)
}

/// Buoy-derived components, falling back to the model per component
/// only where the buoy has nothing observed.
fn buoy_components(forecast: &SwellSet, buoy: &BuoyReading) -> Option<SwellSet> {
    let swell = observed(buoy.swell);
    let wind_wave = observed(buoy.wind_wave);
    if swell.is_none() && wind_wave.is_none() {
        return None;
    }

    Some(SwellSet {
        primary: swell.or(forecast.primary),
        secondary: None,
        wind_swell: wind_wave.or(forecast.wind_swell),
    })
}

pub fn validate_swell(
    forecast: &SwellSet,
    buoy: Option<&BuoyReading>,
    config: &EngineConfig,
) -> SwellValidation {
    let has_forecast = !forecast.is_empty();
    let model = |outcome, ratio| SwellValidation {
        components: *forecast,
        source: if has_forecast {
            SwellSource::Model
        } else {
            SwellSource::None
        },
        outcome,
        ratio,
    };

    let Some(buoy) = buoy else {
        tracing::debug!("no buoy reading, keeping model swell");
        return model(ValidationOutcome::NoBuoy, None);
    };

    let ratio = buoy
        .total_wave_height_ft
        .and_then(|total| energy_ratio(forecast, total));

    let outcome = if buoy.is_stale {
        ValidationOutcome::StaleBuoy
    } else if !has_forecast {
        ValidationOutcome::NoForecast
    } else {
        match ratio {
            Some(r) if (config.buoy_ratio_min..=config.buoy_ratio_max).contains(&r) => {
                ValidationOutcome::Valid
            }
            _ => ValidationOutcome::OutOfTolerance,
        }
    };

    if outcome == ValidationOutcome::Valid {
        return model(outcome, ratio);
    }

    match buoy_components(forecast, buoy) {
        Some(components) => {
            tracing::debug!(
                buoy = %buoy.buoy_id,
                ?outcome,
                ratio = ?ratio,
                "substituting buoy swell for model breakdown"
            );
            SwellValidation {
                components,
                source: SwellSource::Buoy,
                outcome,
                ratio,
            }
        }
        None => {
            tracing::debug!(buoy = %buoy.buoy_id, ?outcome, "buoy has no swell split, keeping model");
            model(outcome, ratio)
        }
    }
}
