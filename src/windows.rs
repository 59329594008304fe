//! Best and avoid window detection.

use chrono::{FixedOffset, Timelike};

use crate::config::EngineConfig;
use crate::daylight;
use crate::models::{SpotGeo, Tide, TimelinePoint, Wind, WindType, Window};
use crate::score::{height_label, ScoringModel};

fn hour_parts(hour: u32) -> (u32, &'static str) {
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    (display, suffix)
}

/// "6-8am", "11am-1pm". The suffix is written once when both ends share it.
pub fn time_range_label(start_hour: u32, end_hour: u32) -> String {
    let (start, start_suffix) = hour_parts(start_hour);
    let (end, end_suffix) = hour_parts(end_hour);
    if start_suffix == end_suffix {
        format!("{start}-{end}{end_suffix}")
    } else {
        format!("{start}{start_suffix}-{end}{end_suffix}")
    }
}

pub fn wind_description(wind: &Wind) -> String {
    match (wind.speed_mph, wind.kind) {
        (None, _) => "wind N/A".to_string(),
        (Some(speed), WindType::Unknown) => format!("{}mph wind", speed.round()),
        (Some(speed), kind) => format!("{}mph {}", speed.round(), kind.label()),
    }
}

pub fn tide_description(tide: &Tide) -> Option<String> {
    match (tide.phase, tide.height_ft) {
        (Some(phase), Some(height)) => Some(format!("{} tide {:.1}ft", phase.label(), height)),
        (Some(phase), None) => Some(format!("{} tide", phase.label())),
        (None, Some(height)) => Some(format!("tide {height:.1}ft")),
        (None, None) => None,
    }
}

fn scan<'a, F>(points: &[&'a TimelinePoint], config: &EngineConfig, qualifies: F) -> Vec<Vec<&'a TimelinePoint>>
where
    F: Fn(&TimelinePoint) -> bool,
{
    let mut runs = Vec::new();
    let mut current: Vec<&TimelinePoint> = Vec::new();

    for point in points.iter().copied() {
        if !qualifies(point) {
            runs.push(std::mem::take(&mut current));
            continue;
        }
        let contiguous = current
            .last()
            .map(|last| point.timestamp - last.timestamp <= config.max_spacing())
            .unwrap_or(true);
        if !contiguous {
            runs.push(std::mem::take(&mut current));
        }
        current.push(point);
    }
    runs.push(current);

    runs.retain(|run| run.len() >= config.min_window_points);
    runs
}

fn average_score(run: &[&TimelinePoint], model: ScoringModel) -> f64 {
    let scores: Vec<f64> = run.iter().filter_map(|p| model.effective_score(p)).collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

fn build_window(run: &[&TimelinePoint], model: ScoringModel, tz: &FixedOffset) -> Option<Window> {
    let first = run.first()?;
    let last = run.last()?;
    let middle = run[run.len() / 2];

    Some(Window {
        start_time: first.timestamp,
        end_time: last.timestamp,
        time_label: time_range_label(
            first.timestamp.with_timezone(tz).hour(),
            last.timestamp.with_timezone(tz).hour(),
        ),
        avg_score: average_score(run, model),
        hours: run.len(),
        height_label: height_label(middle.height_ft),
        wind_description: wind_description(&middle.wind),
        tide_description: None,
        reason: None,
    })
}

/// Up to `max_best_windows` daylight windows, best average first.
///
/// When nothing clears the main threshold the scan is repeated with the
/// fallback threshold so marginal surf still shows up.
pub fn best_windows(
    points: &[TimelinePoint],
    geo: &SpotGeo,
    model: ScoringModel,
    config: &EngineConfig,
) -> Vec<Window> {
    let daylight: Vec<&TimelinePoint> = points
        .iter()
        .filter(|p| !daylight::is_night(p.timestamp, geo.latitude, geo.longitude))
        .collect();
    let above = |threshold: f64| {
        move |p: &TimelinePoint| model.effective_score(p).is_some_and(|s| s > threshold)
    };

    let mut runs = scan(&daylight, config, above(config.best_window_threshold));
    if runs.is_empty() {
        runs = scan(&daylight, config, above(config.fallback_window_threshold));
        if !runs.is_empty() {
            tracing::debug!(
                threshold = config.fallback_window_threshold,
                windows = runs.len(),
                "best windows found only on fallback threshold"
            );
        }
    }

    let tz = geo.timezone();
    let mut windows: Vec<Window> = runs
        .iter()
        .filter_map(|run| {
            let mut window = build_window(run, model, &tz)?;
            window.tide_description = tide_description(&run[run.len() / 2].tide);
            Some(window)
        })
        .collect();

    windows.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
    windows.truncate(config.max_best_windows);
    windows
}

/// Blown-out stretches: poor score under strong onshore wind. Chronological.
pub fn avoid_windows(
    points: &[TimelinePoint],
    geo: &SpotGeo,
    model: ScoringModel,
    config: &EngineConfig,
) -> Vec<Window> {
    let all: Vec<&TimelinePoint> = points.iter().collect();
    let blown_out = |p: &TimelinePoint| {
        model
            .effective_score(p)
            .is_some_and(|s| s < config.avoid_score_below)
            && p.wind.kind == WindType::Onshore
            && p.wind.speed_mph.is_some_and(|w| w > config.avoid_wind_above_mph)
    };

    let tz = geo.timezone();
    scan(&all, config, blown_out)
        .iter()
        .filter_map(|run| {
            let mut window = build_window(run, model, &tz)?;
            window.reason = Some(format!("Blown out by {}", window.wind_description));
            Some(window)
        })
        .collect()
}
