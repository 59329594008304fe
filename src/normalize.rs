use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{CurrentPoint, LegacyPoint, RawPoint, SwellComponent, SwellSet, TimelinePoint};

impl From<LegacyPoint> for TimelinePoint {
    fn from(point: LegacyPoint) -> Self {
        let wave = SwellComponent::new(
            point.wave_height_ft,
            point.wave_period_s,
            point.wave_direction_deg,
        );
        let primary = (!wave.is_empty()).then_some(wave);

        TimelinePoint {
            timestamp: point.timestamp,
            swell: SwellSet {
                primary,
                secondary: None,
                wind_swell: None,
            },
            breaking_height_ft: point.surf_height_ft,
            height_ft: point.surf_height_ft.or(point.wave_height_ft),
            period_s: point.wave_period_s,
            direction_deg: point.wave_direction_deg,
            wind: point.conditions.wind,
            tide: point.conditions.tide,
            scores: point.conditions.scores,
            confidence_band: point.conditions.confidence_band,
        }
    }
}

impl From<CurrentPoint> for TimelinePoint {
    fn from(point: CurrentPoint) -> Self {
        let dominant = point.dominant_swell.unwrap_or_default();
        let height_ft = point
            .breaking_height_ft
            .or(dominant.height_ft)
            .or(point.wave_height_ft);

        TimelinePoint {
            timestamp: point.timestamp,
            swell: SwellSet {
                primary: point.dominant_swell,
                secondary: point.secondary_swell,
                wind_swell: point.wind_swell,
            },
            breaking_height_ft: point.breaking_height_ft,
            height_ft,
            period_s: dominant.period_s,
            direction_deg: dominant.direction_deg,
            wind: point.conditions.wind,
            tide: point.conditions.tide,
            scores: point.conditions.scores,
            confidence_band: point.conditions.confidence_band,
        }
    }
}

impl From<RawPoint> for TimelinePoint {
    fn from(point: RawPoint) -> Self {
        match point {
            RawPoint::Legacy(point) => point.into(),
            RawPoint::Current(point) => point.into(),
        }
    }
}

/// Minute-resolution key. Provider retries repeat the same hour:minute slot.
fn slot_key(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp().div_euclid(60)
}

/// Resolves every point into the canonical shape, drops repeated slots
/// (first occurrence wins) and sorts ascending by time.
///
/// Canonical points pass through unchanged, so normalizing twice is a no-op.
pub fn normalize<P, I>(points: I) -> Vec<TimelinePoint>
where
    P: Into<TimelinePoint>,
    I: IntoIterator<Item = P>,
{
    let mut seen = HashSet::new();
    let mut normalized: Vec<TimelinePoint> = Vec::new();
    let mut duplicates = 0usize;

    for point in points {
        let point: TimelinePoint = point.into();
        if seen.insert(slot_key(point.timestamp)) {
            normalized.push(point);
        } else {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        tracing::debug!(duplicates, kept = normalized.len(), "dropped repeated timeline slots");
    }

    normalized.sort_by_key(|point| point.timestamp);
    normalized
}
