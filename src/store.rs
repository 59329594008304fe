//! Read-only upstream collaborators and the request-level forecast service.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::cache::ForecastCache;
use crate::config::MAX_HOURS_AHEAD;
use crate::models::{BuoyReading, RawPoint, Spot};
use crate::score::ScoringModel;
use crate::summary::{Engine, Forecast};

/// Where raw forecast data comes from. Implementations only read.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    async fn spot(&self, spot_id: Uuid) -> anyhow::Result<Option<Spot>>;

    /// Raw hourly points from `from` up to `hours_ahead` hours later.
    async fn timeline(
        &self,
        spot_id: Uuid,
        from: DateTime<Utc>,
        hours_ahead: i64,
    ) -> anyhow::Result<Vec<RawPoint>>;

    async fn buoy_reading(&self, buoy_id: &str) -> anyhow::Result<Option<BuoyReading>>;

    /// Changes whenever the stored timeline for the spot changes.
    async fn timeline_version(&self, spot_id: Uuid) -> anyhow::Result<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    pub spot_id: Uuid,
    pub timeline_version: i64,
    pub model: ScoringModel,
    pub hours_ahead: i64,
    /// Spot-local date of the request; day indexes and confidence hang off it.
    pub local_date: NaiveDate,
}

pub struct ForecastService<S> {
    store: S,
    engine: Engine,
    cache: ForecastCache<ForecastKey, Forecast>,
}

impl<S: ForecastStore> ForecastService<S> {
    pub fn new(store: S, engine: Engine) -> Self {
        let cache = ForecastCache::new(engine.config().cache_ttl());
        Self {
            store,
            engine,
            cache,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub async fn spot(&self, spot_id: Uuid) -> anyhow::Result<Spot> {
        self.store
            .spot(spot_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("unknown spot {spot_id}"))
    }

    /// Forecast for a spot, served from cache while the stored timeline is
    /// unchanged and the entry is younger than the TTL.
    ///
    /// Requests on the same spot-local day share an entry, so a cache hit
    /// carries the current conditions computed for the first caller's
    /// `as_of`. `hours_ahead` is clamped to `1..=MAX_HOURS_AHEAD`.
    pub async fn forecast(
        &self,
        spot_id: Uuid,
        hours_ahead: i64,
        model: ScoringModel,
        as_of: DateTime<Utc>,
    ) -> anyhow::Result<Forecast> {
        let hours_ahead = hours_ahead.clamp(1, MAX_HOURS_AHEAD);
        let spot = self.spot(spot_id).await?;
        let timeline_version = self.store.timeline_version(spot_id).await?;

        self.cache.purge_expired();
        self.cache
            .retain_keys(|key| key.spot_id != spot_id || key.timeline_version >= timeline_version);

        let key = ForecastKey {
            spot_id,
            timeline_version,
            model,
            hours_ahead,
            local_date: spot.geo.local_date(as_of),
        };

        self.cache
            .get_or_refresh(key, || async move {
                let raw = self.store.timeline(spot_id, as_of, hours_ahead).await?;
                let buoy = match spot.buoy_id.as_deref() {
                    Some(buoy_id) => self.store.buoy_reading(buoy_id).await?,
                    None => None,
                };
                tracing::debug!(
                    spot = %spot.name,
                    points = raw.len(),
                    has_buoy = buoy.is_some(),
                    "refreshing forecast"
                );
                Ok::<_, anyhow::Error>(self.engine.run(raw, buoy.as_ref(), &spot.geo, model, as_of))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conditions, LegacyPoint, SpotGeo};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    struct MemoryStore {
        spot: Spot,
        points: Vec<RawPoint>,
        version: AtomicI64,
        timeline_calls: AtomicUsize,
    }

    impl MemoryStore {
        fn new() -> Self {
            let start = Utc.with_ymd_and_hms(2026, 6, 20, 15, 0, 0).unwrap();
            let points = (0..6)
                .map(|i| {
                    let mut conditions = Conditions::default();
                    conditions.scores.euro = Some(66.0);
                    RawPoint::Legacy(LegacyPoint {
                        timestamp: start + Duration::hours(i),
                        surf_height_ft: None,
                        wave_height_ft: Some(3.0),
                        wave_period_s: Some(12.0),
                        wave_direction_deg: Some(270.0),
                        conditions,
                    })
                })
                .collect();
            Self {
                spot: Spot {
                    id: Uuid::new_v4(),
                    name: "Huntington Pier".to_string(),
                    geo: SpotGeo::new(33.655, -118.0, -7 * 60),
                    buoy_id: None,
                },
                points,
                version: AtomicI64::new(1),
                timeline_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ForecastStore for MemoryStore {
        async fn spot(&self, spot_id: Uuid) -> anyhow::Result<Option<Spot>> {
            Ok((spot_id == self.spot.id).then(|| self.spot.clone()))
        }

        async fn timeline(
            &self,
            _spot_id: Uuid,
            _from: DateTime<Utc>,
            _hours_ahead: i64,
        ) -> anyhow::Result<Vec<RawPoint>> {
            self.timeline_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.points.clone())
        }

        async fn buoy_reading(&self, _buoy_id: &str) -> anyhow::Result<Option<BuoyReading>> {
            Ok(None)
        }

        async fn timeline_version(&self, _spot_id: Uuid) -> anyhow::Result<i64> {
            Ok(self.version.load(Ordering::SeqCst))
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 20, 15, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn repeated_requests_hit_cache_until_version_changes() {
        let store = MemoryStore::new();
        let spot_id = store.spot.id;
        let service = ForecastService::new(store, Engine::default());

        let first = service
            .forecast(spot_id, 48, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        let second = service
            .forecast(spot_id, 48, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(service.store.timeline_calls.load(Ordering::SeqCst), 1);

        service.store.version.store(2, Ordering::SeqCst);
        service
            .forecast(spot_id, 48, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        assert_eq!(service.store.timeline_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_spot_is_an_error() {
        let service = ForecastService::new(MemoryStore::new(), Engine::default());
        let result = service
            .forecast(Uuid::new_v4(), 48, ScoringModel::Euro, as_of())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn forecast_carries_best_window() {
        let store = MemoryStore::new();
        let spot_id = store.spot.id;
        let service = ForecastService::new(store, Engine::default());
        let forecast = service
            .forecast(spot_id, 48, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        assert_eq!(forecast.days.len(), 1);
        assert_eq!(forecast.days[0].best_windows.len(), 1);
        assert_eq!(forecast.days[0].best_windows[0].time_label, "8am-1pm");
    }

    #[tokio::test]
    async fn version_bumps_do_not_grow_the_cache() {
        let store = MemoryStore::new();
        let spot_id = store.spot.id;
        let service = ForecastService::new(store, Engine::default());

        for version in 0..50 {
            service.store.version.store(version, Ordering::SeqCst);
            service
                .forecast(spot_id, 48, ScoringModel::Euro, as_of())
                .await
                .unwrap();
        }
        assert_eq!(service.store.timeline_calls.load(Ordering::SeqCst), 50);
        assert_eq!(service.cache.len(), 1);
    }

    #[tokio::test]
    async fn next_local_day_recomputes_day_indexes() {
        let store = MemoryStore::new();
        let spot_id = store.spot.id;
        let service = ForecastService::new(store, Engine::default());

        let today = service
            .forecast(spot_id, 48, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        assert_eq!(today.days[0].confidence_percentage, 95);

        // 2026-06-22 local: the stored day is now two days back
        let later = as_of() + Duration::days(2);
        let stale_day = service
            .forecast(spot_id, 48, ScoringModel::Euro, later)
            .await
            .unwrap();
        assert_eq!(service.store.timeline_calls.load(Ordering::SeqCst), 2);
        assert_ne!(stale_day.generated_at, today.generated_at);
        assert_eq!(stale_day.days[0].confidence_percentage, 75);
    }

    #[tokio::test]
    async fn oversized_horizon_is_clamped() {
        let store = MemoryStore::new();
        let spot_id = store.spot.id;
        let service = ForecastService::new(store, Engine::default());
        service
            .forecast(spot_id, i64::MAX, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        service
            .forecast(spot_id, MAX_HOURS_AHEAD, ScoringModel::Euro, as_of())
            .await
            .unwrap();
        assert_eq!(service.store.timeline_calls.load(Ordering::SeqCst), 1);
    }
}
