use serde::{Deserialize, Serialize};

use crate::models::{ModelScores, TimelinePoint};

pub const FLAT_LABEL: &str = "<1ft";
pub const NO_DATA_LABEL: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    DontBother,
    WorthALook,
    GoSurf,
    Firing,
    AllTime,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        match score.round().clamp(0.0, 100.0) as u8 {
            0..=39 => Rating::DontBother,
            40..=59 => Rating::WorthALook,
            60..=75 => Rating::GoSurf,
            76..=90 => Rating::Firing,
            _ => Rating::AllTime,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::DontBother => "Don't Bother",
            Rating::WorthALook => "Worth a Look",
            Rating::GoSurf => "Go Surf",
            Rating::Firing => "Firing",
            Rating::AllTime => "All-Time",
        }
    }

    pub fn badge(&self) -> Badge {
        match self {
            Rating::DontBother => Badge::Red,
            Rating::WorthALook => Badge::Yellow,
            Rating::GoSurf => Badge::Green,
            Rating::Firing => Badge::Blue,
            Rating::AllTime => Badge::Purple,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
}

/// Which forecast model's score the caller wants to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScoringModel {
    #[default]
    Euro,
    OpenMeteo,
}

impl ScoringModel {
    pub fn other(self) -> Self {
        match self {
            ScoringModel::Euro => ScoringModel::OpenMeteo,
            ScoringModel::OpenMeteo => ScoringModel::Euro,
        }
    }

    pub fn score(self, scores: &ModelScores) -> Option<f64> {
        match self {
            ScoringModel::Euro => scores.euro,
            ScoringModel::OpenMeteo => scores.open_meteo,
        }
    }

    /// The selected model's score, or the other model's when it has none.
    pub fn effective_score(self, point: &TimelinePoint) -> Option<f64> {
        self.score(&point.scores)
            .or_else(|| self.other().score(&point.scores))
    }
}

/// Display label for a surf height: "N/A", "<1ft", "3ft" or "2-3ft".
pub fn height_label(height_ft: Option<f64>) -> String {
    match height_ft {
        None => NO_DATA_LABEL.to_string(),
        Some(h) if !h.is_finite() => NO_DATA_LABEL.to_string(),
        Some(h) if h < 1.0 => FLAT_LABEL.to_string(),
        Some(h) => {
            let low = h.floor() as i64;
            let high = h.ceil() as i64;
            if low == high {
                format!("{low}ft")
            } else {
                format!("{low}-{high}ft")
            }
        }
    }
}

/// Rating for a score, forced to the bottom band when the ocean is flat.
pub fn classify(score: f64, height_label: &str) -> Rating {
    if height_label == FLAT_LABEL {
        return Rating::DontBother;
    }
    Rating::from_score(score)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRating {
    pub score: Option<f64>,
    pub rating: Option<Rating>,
    pub label: String,
    pub badge: Option<Badge>,
    pub height_label: String,
}

pub fn classify_point(point: &TimelinePoint, model: ScoringModel) -> PointRating {
    let score = model.effective_score(point);
    let height = height_label(point.height_ft);
    let rating = match score {
        Some(s) => Some(classify(s, &height)),
        None if height == FLAT_LABEL => Some(Rating::DontBother),
        None => None,
    };

    PointRating {
        score,
        rating,
        label: rating
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| NO_DATA_LABEL.to_string()),
        badge: rating.map(|r| r.badge()),
        height_label: height,
    }
}
