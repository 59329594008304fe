//! Day aggregation and the end-to-end verdict pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::buoy::{validate_swell, SwellValidation};
use crate::confidence;
use crate::config::EngineConfig;
use crate::daylight;
use crate::models::{BuoyReading, DaySummary, SpotGeo, TimelinePoint};
use crate::normalize::normalize;
use crate::score::{classify, classify_point, height_label, PointRating, Rating, ScoringModel, FLAT_LABEL};
use crate::tide::resolve_tide_phase;
use crate::windows::{avoid_windows, best_windows};

pub const NO_DATA_VERDICT: &str = "No Data";

/// Splits a sorted timeline into the spot's local calendar days.
pub fn group_by_day(points: &[TimelinePoint], geo: &SpotGeo) -> BTreeMap<NaiveDate, Vec<TimelinePoint>> {
    let mut days: BTreeMap<NaiveDate, Vec<TimelinePoint>> = BTreeMap::new();
    for point in points {
        days.entry(geo.local_date(point.timestamp))
            .or_default()
            .push(point.clone());
    }
    days
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Applies the surfable-hour overrides to the average-based rating.
fn override_verdict(base: Rating, surfable_hours: usize, best_score: f64, config: &EngineConfig) -> Rating {
    if surfable_hours >= config.go_surf_surfable_hours {
        let floored = base.max(Rating::WorthALook);
        if best_score > config.best_window_threshold {
            floored
        } else {
            floored.min(Rating::GoSurf)
        }
    } else if surfable_hours >= config.worth_a_look_surfable_hours {
        base.max(Rating::WorthALook)
    } else {
        base
    }
}

pub fn summarize_day(
    date: NaiveDate,
    points: &[TimelinePoint],
    geo: &SpotGeo,
    model: ScoringModel,
    day_index: i64,
    config: &EngineConfig,
) -> DaySummary {
    let daylit: Vec<&TimelinePoint> = points
        .iter()
        .filter(|p| !daylight::is_night(p.timestamp, geo.latitude, geo.longitude))
        .collect();
    let daylight_scores: Vec<f64> = daylit.iter().filter_map(|p| model.effective_score(p)).collect();
    let all_scores: Vec<f64> = points.iter().filter_map(|p| model.effective_score(p)).collect();
    let surfable_hours = daylight_scores
        .iter()
        .filter(|s| **s >= config.surfable_score)
        .count();

    let daylight_basis = daylight_scores.len() >= config.min_daylight_points
        && surfable_hours as f64 >= config.daylight_majority * daylight_scores.len() as f64;

    let (avg_score, heights): (Option<f64>, Vec<f64>) = if daylight_basis {
        (
            mean(&daylight_scores),
            daylit.iter().filter_map(|p| p.height_ft).collect(),
        )
    } else {
        (
            mean(&all_scores),
            points.iter().filter_map(|p| p.height_ft).collect(),
        )
    };
    let best_score = all_scores.iter().copied().reduce(f64::max);
    let display_height = height_label(mean(&heights));

    let rating = match (avg_score, best_score) {
        (Some(avg), Some(best)) => {
            let rating = override_verdict(classify(avg, &display_height), surfable_hours, best, config);
            Some(if display_height == FLAT_LABEL {
                Rating::DontBother
            } else {
                rating
            })
        }
        _ => {
            tracing::debug!(%date, points = points.len(), "no scored hours for day");
            None
        }
    };

    let confidence = confidence::estimate(day_index, points);
    let (best, avoid) = if rating.is_some() {
        (
            best_windows(points, geo, model, config),
            avoid_windows(points, geo, model, config),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    DaySummary {
        day_key: date.format("%Y-%m-%d").to_string(),
        date,
        point_count: points.len(),
        avg_score,
        best_score,
        display_height,
        verdict_label: rating
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| NO_DATA_VERDICT.to_string()),
        badge: rating.map(|r| r.badge()),
        confidence_band: confidence.band,
        confidence_percentage: confidence.percentage,
        extended_forecast: confidence.extended_forecast,
        surfable_hours,
        best_windows: best,
        avoid_windows: avoid,
    }
}

/// One summary per local calendar day, oldest first. Day indices count from
/// the local date of `as_of`.
pub fn summarize(
    points: &[TimelinePoint],
    geo: &SpotGeo,
    model: ScoringModel,
    as_of: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<DaySummary> {
    let today = geo.local_date(as_of);
    group_by_day(points, geo)
        .into_iter()
        .map(|(date, day)| {
            let day_index = (date - today).num_days();
            summarize_day(date, &day, geo, model, day_index, config)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub timestamp: DateTime<Utc>,
    pub rating: PointRating,
    pub swell: SwellValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub generated_at: DateTime<Utc>,
    pub model: ScoringModel,
    pub geo: SpotGeo,
    pub current: Option<CurrentConditions>,
    pub days: Vec<DaySummary>,
}

/// Stateless pipeline: normalize, enrich, classify, aggregate.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates the timeline hour nearest the buoy observation, or nearest
    /// `as_of` when there is no buoy.
    pub fn current_conditions(
        &self,
        points: &[TimelinePoint],
        buoy: Option<&BuoyReading>,
        model: ScoringModel,
        as_of: DateTime<Utc>,
    ) -> Option<CurrentConditions> {
        let anchor = buoy.map(|b| b.timestamp).unwrap_or(as_of);
        let point = points
            .iter()
            .min_by_key(|p| (p.timestamp - anchor).num_seconds().abs())
            .filter(|p| {
                (p.timestamp - anchor).num_seconds().abs() <= self.config.buoy_match().num_seconds()
            })?;

        let buoy = buoy.map(|b| b.clone().with_staleness(as_of, self.config.buoy_stale_after()));

        Some(CurrentConditions {
            timestamp: point.timestamp,
            rating: classify_point(point, model),
            swell: validate_swell(&point.swell, buoy.as_ref(), &self.config),
        })
    }

    pub fn run<P, I>(
        &self,
        raw: I,
        buoy: Option<&BuoyReading>,
        geo: &SpotGeo,
        model: ScoringModel,
        as_of: DateTime<Utc>,
    ) -> Forecast
    where
        P: Into<TimelinePoint>,
        I: IntoIterator<Item = P>,
    {
        let points = resolve_tide_phase(&normalize(raw));
        tracing::debug!(points = points.len(), ?model, "running verdict pipeline");

        Forecast {
            generated_at: as_of,
            model,
            geo: *geo,
            current: self.current_conditions(&points, buoy, model, as_of),
            days: summarize(&points, geo, model, as_of, &self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SwellComponent, WindType};
    use chrono::{Duration, TimeZone};

    fn geo() -> SpotGeo {
        SpotGeo::new(33.655, -118.0, -7 * 60)
    }

    /// Local midnight (PDT) on 2026-06-20.
    fn local_midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 20, 7, 0, 0).unwrap()
    }

    fn day_of(scores: impl Fn(u32) -> Option<f64>) -> Vec<TimelinePoint> {
        (0..24)
            .map(|hour| {
                let mut point = TimelinePoint::at(local_midnight() + Duration::hours(hour as i64));
                point.scores.euro = scores(hour);
                point.height_ft = Some(3.0);
                point
            })
            .collect()
    }

    fn summary_of(points: &[TimelinePoint]) -> DaySummary {
        let date = geo().local_date(points[0].timestamp);
        summarize_day(date, points, &geo(), ScoringModel::Euro, 3, &EngineConfig::default())
    }

    #[test]
    fn groups_by_local_calendar_day() {
        let mut points = day_of(|_| Some(50.0));
        let next = local_midnight() + Duration::hours(24);
        for minutes in [0, 20, 40] {
            points.push(TimelinePoint::at(next + Duration::minutes(minutes)));
        }
        let days = group_by_day(&points, &geo());
        assert_eq!(days.len(), 2);
        let counts: Vec<usize> = days.values().map(Vec::len).collect();
        assert_eq!(counts, vec![24, 3]);
        let first = days.keys().next().unwrap();
        assert_eq!(first.to_string(), "2026-06-20");
    }

    #[test]
    fn daylight_average_when_daylight_is_mostly_surfable() {
        let points = day_of(|h| Some(if (7..=19).contains(&h) { 50.0 } else { 10.0 }));
        let daylight_scores: Vec<f64> = points
            .iter()
            .filter(|p| !daylight::is_night(p.timestamp, geo().latitude, geo().longitude))
            .filter_map(|p| p.scores.euro)
            .collect();
        let expected = mean(&daylight_scores).unwrap();
        let all_hours = (13.0 * 50.0 + 11.0 * 10.0) / 24.0;

        let summary = summary_of(&points);
        assert!((summary.avg_score.unwrap() - expected).abs() < 1e-9);
        assert!(summary.avg_score.unwrap() > all_hours);
        assert_eq!(summary.best_score, Some(50.0));
    }

    #[test]
    fn all_hours_average_when_daylight_is_mostly_flat() {
        // one good daylight hour among many poor ones
        let points = day_of(|h| Some(if h == 10 { 70.0 } else { 20.0 }));
        let summary = summary_of(&points);
        let expected = (70.0 + 23.0 * 20.0) / 24.0;
        assert!((summary.avg_score.unwrap() - expected).abs() < 1e-9);
        assert_eq!(summary.best_score, Some(70.0));
        assert_eq!(summary.verdict_label, "Don't Bother");
    }

    #[test]
    fn best_score_counts_night_hours() {
        let points = day_of(|h| Some(if h == 2 { 88.0 } else { 45.0 }));
        assert_eq!(summary_of(&points).best_score, Some(88.0));
    }

    #[test]
    fn short_surfable_stretch_lifts_to_worth_a_look() {
        let points = day_of(|h| Some(if (9..=11).contains(&h) { 45.0 } else { 10.0 }));
        let summary = summary_of(&points);
        assert_eq!(summary.surfable_hours, 3);
        assert_eq!(summary.verdict_label, "Worth a Look");
    }

    #[test]
    fn long_surfable_stretch_floors_at_worth_a_look() {
        let points = day_of(|h| Some(if (7..=19).contains(&h) { 58.0 } else { 5.0 }));
        let summary = summary_of(&points);
        assert!(summary.surfable_hours >= 5);
        assert_eq!(summary.verdict_label, "Worth a Look");
    }

    #[test]
    fn long_surfable_stretch_caps_at_go_surf_without_standout_hour() {
        let config = EngineConfig {
            best_window_threshold: 80.0,
            ..EngineConfig::default()
        };
        let points = day_of(|_| Some(78.0));
        let date = geo().local_date(points[0].timestamp);
        let summary = summarize_day(date, &points, &geo(), ScoringModel::Euro, 3, &config);
        assert_eq!(summary.avg_score, Some(78.0));
        assert_eq!(summary.verdict_label, "Go Surf");
    }

    #[test]
    fn short_surfable_stretch_is_not_capped() {
        let config = EngineConfig {
            best_window_threshold: 80.0,
            go_surf_surfable_hours: 30,
            ..EngineConfig::default()
        };
        let points = day_of(|_| Some(78.0));
        let date = geo().local_date(points[0].timestamp);
        let summary = summarize_day(date, &points, &geo(), ScoringModel::Euro, 3, &config);
        assert_eq!(summary.verdict_label, "Firing");
    }

    #[test]
    fn long_surfable_stretch_keeps_full_label_when_best_clears_sixty() {
        let points = day_of(|h| Some(if (7..=19).contains(&h) { 90.0 } else { 5.0 }));
        assert_eq!(summary_of(&points).verdict_label, "Firing");
    }

    #[test]
    fn flat_day_is_dont_bother() {
        let mut points = day_of(|h| Some(if (7..=19).contains(&h) { 80.0 } else { 5.0 }));
        for point in &mut points {
            point.height_ft = Some(0.5);
        }
        let summary = summary_of(&points);
        assert_eq!(summary.display_height, "<1ft");
        assert_eq!(summary.verdict_label, "Don't Bother");
    }

    #[test]
    fn unscored_day_reports_no_data() {
        let summary = summary_of(&day_of(|_| None));
        assert_eq!(summary.verdict_label, NO_DATA_VERDICT);
        assert!(summary.avg_score.is_none());
        assert!(summary.best_windows.is_empty());
        assert!(summary.avoid_windows.is_empty());
    }

    #[test]
    fn confidence_follows_day_index() {
        let points = day_of(|_| Some(50.0));
        let days = summarize(&points, &geo(), ScoringModel::Euro, local_midnight(), &EngineConfig::default());
        assert_eq!(days[0].confidence_percentage, 95);

        let week_out = local_midnight() - Duration::days(6);
        let days = summarize(&points, &geo(), ScoringModel::Euro, week_out, &EngineConfig::default());
        assert_eq!(days[0].confidence_percentage, 25);
        assert!(days[0].extended_forecast);
    }

    #[test]
    fn pipeline_validates_hour_nearest_buoy() {
        let mut points = day_of(|_| Some(65.0));
        for point in &mut points {
            point.swell.primary = Some(SwellComponent::new(Some(3.0), Some(13.0), Some(270.0)));
            point.swell.secondary = Some(SwellComponent::new(Some(4.0), Some(9.0), Some(200.0)));
            point.wind.kind = WindType::Offshore;
        }
        let observed_at = local_midnight() + Duration::hours(9) + Duration::minutes(10);
        let buoy = BuoyReading {
            buoy_id: "46253".to_string(),
            timestamp: observed_at,
            total_wave_height_ft: Some(5.0),
            dominant_period_s: Some(13.0),
            swell: SwellComponent::default(),
            wind_wave: SwellComponent::default(),
            is_stale: false,
        };

        let forecast = Engine::default().run(
            points,
            Some(&buoy),
            &geo(),
            ScoringModel::Euro,
            observed_at + Duration::minutes(5),
        );
        let current = forecast.current.unwrap();
        assert_eq!(current.timestamp, local_midnight() + Duration::hours(9));
        assert_eq!(current.swell.source, crate::buoy::SwellSource::Model);
        assert_eq!(current.rating.label, "Go Surf");
        assert_eq!(forecast.days.len(), 1);
        assert!(!forecast.days[0].best_windows.is_empty());
    }
}
