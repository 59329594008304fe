use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ConfidenceBand, TimelinePoint};

/// Percentage shown for the 6th and 7th forecast days.
pub const EXTENDED_FORECAST_PERCENTAGE: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayConfidence {
    pub band: ConfidenceBand,
    pub percentage: u8,
    pub extended_forecast: bool,
}

impl From<ConfidenceBand> for DayConfidence {
    fn from(band: ConfidenceBand) -> Self {
        Self {
            band,
            percentage: band.percentage(),
            extended_forecast: false,
        }
    }
}

/// Most common band among the points; ties and empty input give `Medium`.
pub fn majority_band(points: &[TimelinePoint]) -> ConfidenceBand {
    let mut counts: HashMap<ConfidenceBand, usize> = HashMap::new();
    for band in points.iter().filter_map(|p| p.confidence_band) {
        *counts.entry(band).or_insert(0) += 1;
    }

    let Some(top) = counts.values().copied().max() else {
        return ConfidenceBand::Medium;
    };
    let mut leaders = counts.iter().filter(|(_, count)| **count == top);
    match (leaders.next(), leaders.next()) {
        (Some((band, _)), None) => *band,
        _ => ConfidenceBand::Medium,
    }
}

/// Confidence for the day `day_index` days after today (0 = today).
pub fn estimate(day_index: i64, points: &[TimelinePoint]) -> DayConfidence {
    match day_index {
        0 | 1 => ConfidenceBand::High.into(),
        2 => ConfidenceBand::Medium.into(),
        5 | 6 => DayConfidence {
            band: ConfidenceBand::Low,
            percentage: EXTENDED_FORECAST_PERCENTAGE,
            extended_forecast: true,
        },
        _ => majority_band(points).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn banded(bands: &[ConfidenceBand]) -> Vec<TimelinePoint> {
        bands
            .iter()
            .map(|band| {
                let mut point = TimelinePoint::at(Utc::now());
                point.confidence_band = Some(*band);
                point
            })
            .collect()
    }

    #[test]
    fn today_is_always_high() {
        let points = banded(&[ConfidenceBand::Low, ConfidenceBand::Low]);
        let confidence = estimate(0, &points);
        assert_eq!(confidence.band, ConfidenceBand::High);
        assert_eq!(confidence.percentage, 95);
        assert_eq!(estimate(1, &points).band, ConfidenceBand::High);
    }

    #[test]
    fn third_day_is_medium() {
        let points = banded(&[ConfidenceBand::High]);
        assert_eq!(estimate(2, &points).percentage, 75);
    }

    #[test]
    fn extended_days_are_fixed_at_twenty_five() {
        let points = banded(&[ConfidenceBand::High, ConfidenceBand::High]);
        for day in [5, 6] {
            let confidence = estimate(day, &points);
            assert_eq!(confidence.percentage, 25);
            assert!(confidence.extended_forecast);
        }
    }

    #[test]
    fn middle_days_vote() {
        let points = banded(&[ConfidenceBand::Low, ConfidenceBand::Low, ConfidenceBand::High]);
        let confidence = estimate(3, &points);
        assert_eq!(confidence.band, ConfidenceBand::Low);
        assert_eq!(confidence.percentage, 50);
    }

    #[test]
    fn ties_and_silence_default_to_medium() {
        let tied = banded(&[ConfidenceBand::Low, ConfidenceBand::High]);
        assert_eq!(majority_band(&tied), ConfidenceBand::Medium);
        assert_eq!(majority_band(&[]), ConfidenceBand::Medium);
    }
}
