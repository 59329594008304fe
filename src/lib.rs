//! Turns multi-source marine forecast timelines into per-hour and per-day
//! surf verdicts: scores, labels, confidence and best/avoid windows.
//!
//! Everything under [`summary::Engine`] is pure and synchronous. The
//! [`store`] and [`cache`] modules wrap it for request-serving callers.

pub mod buoy;
pub mod cache;
pub mod confidence;
pub mod config;
pub mod daylight;
pub mod db;
pub mod error;
pub mod input;
pub mod models;
pub mod normalize;
pub mod report;
pub mod score;
pub mod store;
pub mod summary;
pub mod tide;
pub mod windows;

pub use buoy::{validate_swell, SwellSource, SwellValidation};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use normalize::normalize;
pub use score::{classify_point, ScoringModel};
pub use summary::{summarize, Engine, Forecast};
pub use tide::resolve_tide_phase;
