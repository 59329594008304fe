use crate::models::{TidePhase, TimelinePoint};

fn direction(from: f64, to: f64) -> Option<TidePhase> {
    if to > from {
        Some(TidePhase::Rising)
    } else if to < from {
        Some(TidePhase::Falling)
    } else {
        None
    }
}

/// Phase for the height at `i` given its neighbours' heights.
///
/// Strict local extrema become high/low; otherwise the previous height sets
/// the direction, then the next one. `supplied` is the last resort.
pub fn phase_at(
    prev: Option<f64>,
    current: Option<f64>,
    next: Option<f64>,
    supplied: Option<TidePhase>,
) -> Option<TidePhase> {
    let current = current?;

    if let (Some(p), Some(n)) = (prev, next) {
        if current > p && current > n {
            return Some(TidePhase::High);
        }
        if current < p && current < n {
            return Some(TidePhase::Low);
        }
    }

    prev.and_then(|p| direction(p, current))
        .or_else(|| next.and_then(|n| direction(current, n)))
        .or(supplied)
}

/// Returns a copy of the timeline with every tide phase resolved from its
/// neighbours. Points without a tide height get no phase.
pub fn resolve_tide_phase(points: &[TimelinePoint]) -> Vec<TimelinePoint> {
    let heights: Vec<Option<f64>> = points.iter().map(|p| p.tide.height_ft).collect();

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let prev = i.checked_sub(1).and_then(|j| heights[j]);
            let next = heights.get(i + 1).copied().flatten();
            let mut resolved = point.clone();
            resolved.tide.phase = phase_at(prev, heights[i], next, point.tide.phase);
            resolved
        })
        .collect()
}
