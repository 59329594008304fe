//! File loaders for running the engine without the database.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::models::{
    BuoyReading, ConfidenceBand, Conditions, CurrentPoint, LegacyPoint, ModelScores, RawPoint,
    SwellComponent, Tide, TidePhase, Wind, WindType,
};

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// One flat CSV row. Rows with any partitioned-swell or breaking-height
/// column are read as the current schema, everything else as legacy.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    timestamp: Option<DateTime<Utc>>,
    schema: Option<String>,
    breaking_height_ft: Option<f64>,
    surf_height_ft: Option<f64>,
    dominant_height_ft: Option<f64>,
    dominant_period_s: Option<f64>,
    dominant_direction_deg: Option<f64>,
    secondary_height_ft: Option<f64>,
    secondary_period_s: Option<f64>,
    secondary_direction_deg: Option<f64>,
    wind_swell_height_ft: Option<f64>,
    wind_swell_period_s: Option<f64>,
    wind_swell_direction_deg: Option<f64>,
    wave_height_ft: Option<f64>,
    wave_period_s: Option<f64>,
    wave_direction_deg: Option<f64>,
    wind_speed_mph: Option<f64>,
    wind_direction_deg: Option<f64>,
    wind_type: Option<WindType>,
    tide_height_ft: Option<f64>,
    tide_phase: Option<TidePhase>,
    score_euro: Option<f64>,
    score_open_meteo: Option<f64>,
    confidence_band: Option<ConfidenceBand>,
}

fn component(height: Option<f64>, period: Option<f64>, direction: Option<f64>) -> Option<SwellComponent> {
    let component = SwellComponent::new(height, period, direction);
    (!component.is_empty()).then_some(component)
}

impl CsvRow {
    fn into_raw(self, line: usize) -> Result<RawPoint> {
        let timestamp = self.timestamp.ok_or_else(|| {
            EngineError::UnsupportedFormat(format!("timeline row {line} has no timestamp"))
        })?;
        let conditions = Conditions {
            wind: Wind {
                speed_mph: self.wind_speed_mph,
                direction_deg: self.wind_direction_deg,
                kind: self.wind_type.unwrap_or_default(),
            },
            tide: Tide {
                height_ft: self.tide_height_ft,
                phase: self.tide_phase,
            },
            scores: ModelScores {
                euro: self.score_euro,
                open_meteo: self.score_open_meteo,
            },
            confidence_band: self.confidence_band,
        };

        let dominant = component(self.dominant_height_ft, self.dominant_period_s, self.dominant_direction_deg);
        let secondary = component(
            self.secondary_height_ft,
            self.secondary_period_s,
            self.secondary_direction_deg,
        );
        let wind_swell = component(
            self.wind_swell_height_ft,
            self.wind_swell_period_s,
            self.wind_swell_direction_deg,
        );

        let current = match self.schema.as_deref() {
            Some("current") => true,
            Some("legacy") => false,
            Some(other) => {
                return Err(EngineError::UnsupportedFormat(format!(
                    "timeline row {line} has unknown schema {other:?}"
                )))
            }
            None => {
                self.breaking_height_ft.is_some()
                    || dominant.is_some()
                    || secondary.is_some()
                    || wind_swell.is_some()
            }
        };

        Ok(if current {
            RawPoint::Current(CurrentPoint {
                timestamp,
                breaking_height_ft: self.breaking_height_ft,
                dominant_swell: dominant,
                secondary_swell: secondary,
                wind_swell,
                wave_height_ft: self.wave_height_ft,
                conditions,
            })
        } else {
            RawPoint::Legacy(LegacyPoint {
                timestamp,
                surf_height_ft: self.surf_height_ft,
                wave_height_ft: self.wave_height_ft,
                wave_period_s: self.wave_period_s,
                wave_direction_deg: self.wave_direction_deg,
                conditions,
            })
        })
    }
}

pub fn parse_timeline_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawPoint>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut points = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        // header is line 1
        points.push(row.into_raw(index + 2)?);
    }

    Ok(points)
}

pub fn parse_timeline_json(raw: &str) -> Result<Vec<RawPoint>> {
    Ok(serde_json::from_str(raw)?)
}

/// Loads a timeline from a `.csv` or `.json` file.
pub fn load_timeline(path: &Path) -> Result<Vec<RawPoint>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => parse_timeline_csv(read(path)?.as_bytes()),
        Some("json") => parse_timeline_json(&read(path)?),
        _ => Err(EngineError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn load_buoy(path: &Path) -> Result<BuoyReading> {
    Ok(serde_json::from_str(&read(path)?)?)
}
