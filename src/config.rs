//! Tuning constants for the verdict engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A point enters a best window when its score is strictly above this.
pub const BEST_WINDOW_THRESHOLD: f64 = 60.0;
/// Second pass threshold when no best window clears the first (accepts >= 40).
pub const FALLBACK_WINDOW_THRESHOLD: f64 = 39.0;
/// Avoid windows need a score strictly below this.
pub const AVOID_SCORE_BELOW: f64 = 50.0;
/// Avoid windows need onshore wind strictly above this.
pub const AVOID_WIND_ABOVE_MPH: f64 = 15.0;
/// Missing hours tolerated inside a window before the run splits.
pub const MAX_MISSING_HOURS: i64 = 1;
pub const MIN_WINDOW_POINTS: usize = 2;
pub const MAX_BEST_WINDOWS: usize = 3;
/// Score at which an hour counts as surfable.
pub const SURFABLE_SCORE: f64 = 40.0;
/// Share of daylight hours that must be surfable before the day average
/// is taken over daylight only.
pub const DAYLIGHT_MAJORITY: f64 = 0.5;
pub const MIN_DAYLIGHT_POINTS: usize = 2;
/// Surfable daylight hours that cap the verdict at "Go Surf" (or lift it
/// to the best hour's full label when that hour clears the best threshold).
pub const GO_SURF_SURFABLE_HOURS: usize = 5;
/// Surfable daylight hours that force at least "Worth a Look".
pub const WORTH_A_LOOK_SURFABLE_HOURS: usize = 2;
pub const BUOY_RATIO_MIN: f64 = 0.7;
pub const BUOY_RATIO_MAX: f64 = 1.3;
pub const BUOY_STALE_AFTER_MINUTES: i64 = 120;
/// How far a buoy observation may sit from a timeline point and still validate it.
pub const BUOY_MATCH_MINUTES: i64 = 90;
pub const CACHE_TTL_MINUTES: i64 = 20;
const CACHE_TTL_RANGE: std::ops::RangeInclusive<i64> = 15..=30;
const MAX_MISSING_RANGE: std::ops::RangeInclusive<i64> = 0..=24;
const BUOY_MINUTES_RANGE: std::ops::RangeInclusive<i64> = 1..=7 * 24 * 60;
/// Longest timeline a caller may request.
pub const MAX_HOURS_AHEAD: i64 = 16 * 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub best_window_threshold: f64,
    pub fallback_window_threshold: f64,
    pub avoid_score_below: f64,
    pub avoid_wind_above_mph: f64,
    pub max_missing_hours: i64,
    pub min_window_points: usize,
    pub max_best_windows: usize,
    pub surfable_score: f64,
    pub daylight_majority: f64,
    pub min_daylight_points: usize,
    pub go_surf_surfable_hours: usize,
    pub worth_a_look_surfable_hours: usize,
    pub buoy_ratio_min: f64,
    pub buoy_ratio_max: f64,
    pub buoy_stale_after_minutes: i64,
    pub buoy_match_minutes: i64,
    pub cache_ttl_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            best_window_threshold: BEST_WINDOW_THRESHOLD,
            fallback_window_threshold: FALLBACK_WINDOW_THRESHOLD,
            avoid_score_below: AVOID_SCORE_BELOW,
            avoid_wind_above_mph: AVOID_WIND_ABOVE_MPH,
            max_missing_hours: MAX_MISSING_HOURS,
            min_window_points: MIN_WINDOW_POINTS,
            max_best_windows: MAX_BEST_WINDOWS,
            surfable_score: SURFABLE_SCORE,
            daylight_majority: DAYLIGHT_MAJORITY,
            min_daylight_points: MIN_DAYLIGHT_POINTS,
            go_surf_surfable_hours: GO_SURF_SURFABLE_HOURS,
            worth_a_look_surfable_hours: WORTH_A_LOOK_SURFABLE_HOURS,
            buoy_ratio_min: BUOY_RATIO_MIN,
            buoy_ratio_max: BUOY_RATIO_MAX,
            buoy_stale_after_minutes: BUOY_STALE_AFTER_MINUTES,
            buoy_match_minutes: BUOY_MATCH_MINUTES,
            cache_ttl_minutes: CACHE_TTL_MINUTES,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fallback_window_threshold > self.best_window_threshold {
            return Err(EngineError::InvalidConfig(format!(
                "fallback_window_threshold {} is above best_window_threshold {}",
                self.fallback_window_threshold, self.best_window_threshold
            )));
        }
        if !(self.buoy_ratio_min > 0.0 && self.buoy_ratio_min <= 1.0 && self.buoy_ratio_max >= 1.0)
        {
            return Err(EngineError::InvalidConfig(format!(
                "buoy ratio band [{}, {}] must bracket 1.0",
                self.buoy_ratio_min, self.buoy_ratio_max
            )));
        }
        if !(0.0..=1.0).contains(&self.daylight_majority) {
            return Err(EngineError::InvalidConfig(format!(
                "daylight_majority {} must be a fraction",
                self.daylight_majority
            )));
        }
        if self.min_window_points == 0 {
            return Err(EngineError::InvalidConfig(
                "min_window_points must be at least 1".to_string(),
            ));
        }
        if !MAX_MISSING_RANGE.contains(&self.max_missing_hours) {
            return Err(EngineError::InvalidConfig(format!(
                "max_missing_hours {} must be between 0 and 24",
                self.max_missing_hours
            )));
        }
        for (name, minutes) in [
            ("buoy_stale_after_minutes", self.buoy_stale_after_minutes),
            ("buoy_match_minutes", self.buoy_match_minutes),
        ] {
            if !BUOY_MINUTES_RANGE.contains(&minutes) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} {minutes} must be between 1 minute and 7 days"
                )));
            }
        }
        if self.worth_a_look_surfable_hours > self.go_surf_surfable_hours {
            return Err(EngineError::InvalidConfig(format!(
                "worth_a_look_surfable_hours {} exceeds go_surf_surfable_hours {}",
                self.worth_a_look_surfable_hours, self.go_surf_surfable_hours
            )));
        }
        if !CACHE_TTL_RANGE.contains(&self.cache_ttl_minutes) {
            return Err(EngineError::InvalidConfig(format!(
                "cache_ttl_minutes {} must be between 15 and 30",
                self.cache_ttl_minutes
            )));
        }
        Ok(())
    }

    /// Largest spacing between two hourly samples that still counts as
    /// contiguous: one hour plus the tolerated missing hours.
    pub fn max_spacing(&self) -> chrono::Duration {
        chrono::Duration::hours(self.max_missing_hours.clamp(0, 24) + 1)
    }

    pub fn buoy_stale_after(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.buoy_stale_after_minutes.clamp(0, *BUOY_MINUTES_RANGE.end()))
    }

    pub fn buoy_match(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.buoy_match_minutes.clamp(0, *BUOY_MINUTES_RANGE.end()))
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_minutes.max(0) as u64 * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("best_window_threshold = 65.0\n").unwrap();
        assert_eq!(config.best_window_threshold, 65.0);
        assert_eq!(config.fallback_window_threshold, FALLBACK_WINDOW_THRESHOLD);
        assert_eq!(config.max_best_windows, 3);
    }

    #[test]
    fn rejects_cache_ttl_outside_refresh_cadence() {
        let err = EngineConfig::from_toml_str("cache_ttl_minutes = 60\n").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = EngineConfig {
            fallback_window_threshold: 70.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_durations() {
        for raw in [
            "max_missing_hours = 9223372036854775807\n",
            "max_missing_hours = -1\n",
            "buoy_stale_after_minutes = 9223372036854775807\n",
            "buoy_match_minutes = 0\n",
        ] {
            let err = EngineConfig::from_toml_str(raw).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfig(_)), "{raw}");
        }
    }

    #[test]
    fn unvalidated_durations_do_not_overflow() {
        let config = EngineConfig {
            max_missing_hours: i64::MAX,
            buoy_stale_after_minutes: i64::MAX,
            buoy_match_minutes: i64::MIN,
            ..EngineConfig::default()
        };
        assert_eq!(config.max_spacing(), chrono::Duration::hours(25));
        assert_eq!(config.buoy_stale_after(), chrono::Duration::days(7));
        assert_eq!(config.buoy_match(), chrono::Duration::zero());
    }
}
