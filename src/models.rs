use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One directional wave train.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwellComponent {
    pub height_ft: Option<f64>,
    pub period_s: Option<f64>,
    pub direction_deg: Option<f64>,
}

impl SwellComponent {
    pub fn new(height_ft: Option<f64>, period_s: Option<f64>, direction_deg: Option<f64>) -> Self {
        Self {
            height_ft,
            period_s,
            direction_deg,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height_ft.is_none() && self.period_s.is_none() && self.direction_deg.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwellSet {
    pub primary: Option<SwellComponent>,
    pub secondary: Option<SwellComponent>,
    pub wind_swell: Option<SwellComponent>,
}

impl SwellSet {
    pub fn components(&self) -> impl Iterator<Item = &SwellComponent> {
        [&self.primary, &self.secondary, &self.wind_swell]
            .into_iter()
            .flatten()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.components().filter_map(|c| c.height_ft).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.components().all(SwellComponent::is_empty)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindType {
    Offshore,
    Onshore,
    Cross,
    SideOffshore,
    #[default]
    Unknown,
}

impl WindType {
    pub fn label(&self) -> &'static str {
        match self {
            WindType::Offshore => "offshore",
            WindType::Onshore => "onshore",
            WindType::Cross => "cross-shore",
            WindType::SideOffshore => "side-offshore",
            WindType::Unknown => "variable",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mph: Option<f64>,
    pub direction_deg: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: WindType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TidePhase {
    Rising,
    Falling,
    High,
    Low,
}

impl TidePhase {
    pub fn label(&self) -> &'static str {
        match self {
            TidePhase::Rising => "rising",
            TidePhase::Falling => "falling",
            TidePhase::High => "high",
            TidePhase::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tide {
    pub height_ft: Option<f64>,
    pub phase: Option<TidePhase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn percentage(&self) -> u8 {
        match self {
            ConfidenceBand::High => 95,
            ConfidenceBand::Medium => 75,
            ConfidenceBand::Low => 50,
        }
    }
}

/// Quality scores from the supported forecast models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    pub euro: Option<f64>,
    pub open_meteo: Option<f64>,
}

/// Fields shared by every sourcing convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub tide: Tide,
    #[serde(default)]
    pub scores: ModelScores,
    #[serde(default)]
    pub confidence_band: Option<ConfidenceBand>,
}

/// Points written before swell partitioning existed: one wave trio per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub surf_height_ft: Option<f64>,
    #[serde(default)]
    pub wave_height_ft: Option<f64>,
    #[serde(default)]
    pub wave_period_s: Option<f64>,
    #[serde(default)]
    pub wave_direction_deg: Option<f64>,
    #[serde(flatten)]
    pub conditions: Conditions,
}

/// Points carrying a partitioned swell breakdown and a breaking-height estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub breaking_height_ft: Option<f64>,
    #[serde(default)]
    pub dominant_swell: Option<SwellComponent>,
    #[serde(default)]
    pub secondary_swell: Option<SwellComponent>,
    #[serde(default)]
    pub wind_swell: Option<SwellComponent>,
    #[serde(default)]
    pub wave_height_ft: Option<f64>,
    #[serde(flatten)]
    pub conditions: Conditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum RawPoint {
    Legacy(LegacyPoint),
    Current(CurrentPoint),
}

impl RawPoint {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RawPoint::Legacy(point) => point.timestamp,
            RawPoint::Current(point) => point.timestamp,
        }
    }
}

/// One hour of canonical forecast data for a spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub swell: SwellSet,
    pub breaking_height_ft: Option<f64>,
    pub height_ft: Option<f64>,
    pub period_s: Option<f64>,
    pub direction_deg: Option<f64>,
    pub wind: Wind,
    pub tide: Tide,
    pub scores: ModelScores,
    pub confidence_band: Option<ConfidenceBand>,
}

impl TimelinePoint {
    /// Bare point with nothing but a timestamp.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            swell: SwellSet::default(),
            breaking_height_ft: None,
            height_ft: None,
            period_s: None,
            direction_deg: None,
            wind: Wind::default(),
            tide: Tide::default(),
            scores: ModelScores::default(),
            confidence_band: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuoyReading {
    pub buoy_id: String,
    pub timestamp: DateTime<Utc>,
    pub total_wave_height_ft: Option<f64>,
    pub dominant_period_s: Option<f64>,
    #[serde(default)]
    pub swell: SwellComponent,
    #[serde(default)]
    pub wind_wave: SwellComponent,
    #[serde(default)]
    pub is_stale: bool,
}

impl BuoyReading {
    /// Marks the reading stale once it is older than `max_age`. A reading
    /// already flagged upstream stays stale.
    pub fn with_staleness(mut self, now: DateTime<Utc>, max_age: chrono::Duration) -> Self {
        self.is_stale = self.is_stale || now - self.timestamp > max_age;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotGeo {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl SpotGeo {
    pub fn new(latitude: f64, longitude: f64, utc_offset_minutes: i32) -> Self {
        Self {
            latitude,
            longitude,
            utc_offset_minutes,
        }
    }

    /// The spot's civil offset, UTC when the stored offset is out of range.
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone()).date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: Uuid,
    pub name: String,
    pub geo: SpotGeo,
    pub buoy_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub time_label: String,
    pub avg_score: f64,
    pub hours: usize,
    pub height_label: String,
    pub wind_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tide_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day_key: String,
    pub date: NaiveDate,
    pub point_count: usize,
    pub avg_score: Option<f64>,
    pub best_score: Option<f64>,
    pub display_height: String,
    pub verdict_label: String,
    pub badge: Option<crate::score::Badge>,
    pub confidence_band: ConfidenceBand,
    pub confidence_percentage: u8,
    pub extended_forecast: bool,
    pub surfable_hours: usize,
    pub best_windows: Vec<Window>,
    pub avoid_windows: Vec<Window>,
}
