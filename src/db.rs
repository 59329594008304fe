use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::MAX_HOURS_AHEAD;
use crate::models::{BuoyReading, RawPoint, Spot, SpotGeo, SwellComponent};
use crate::store::ForecastStore;

/// Read-only view over the forecast ingest schema.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn component(row: &PgRow, prefix: &str) -> anyhow::Result<SwellComponent> {
    Ok(SwellComponent {
        height_ft: row.try_get(format!("{prefix}_height_ft").as_str())?,
        period_s: row.try_get(format!("{prefix}_period_s").as_str())?,
        direction_deg: row.try_get(format!("{prefix}_direction_deg").as_str())?,
    })
}

#[async_trait]
impl ForecastStore for PgStore {
    async fn spot(&self, spot_id: Uuid) -> anyhow::Result<Option<Spot>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, latitude, longitude, utc_offset_minutes, buoy_id
            FROM surf_forecast.spots
            WHERE id = $1
            "#,
        )
        .bind(spot_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Spot {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            geo: SpotGeo::new(
                row.try_get("latitude")?,
                row.try_get("longitude")?,
                row.try_get("utc_offset_minutes")?,
            ),
            buoy_id: row.try_get("buoy_id")?,
        }))
    }

    async fn timeline(
        &self,
        spot_id: Uuid,
        from: DateTime<Utc>,
        hours_ahead: i64,
    ) -> anyhow::Result<Vec<RawPoint>> {
        let until = from + Duration::hours(hours_ahead.clamp(1, MAX_HOURS_AHEAD));
        let rows = sqlx::query(
            r#"
            SELECT forecast_at, payload::text AS payload
            FROM surf_forecast.timeline_points
            WHERE spot_id = $1 AND forecast_at >= $2 AND forecast_at < $3
            ORDER BY forecast_at, fetched_at
            "#,
        )
        .bind(spot_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let payload: String = row.try_get("payload")?;
            match serde_json::from_str::<RawPoint>(&payload) {
                Ok(point) => points.push(point),
                Err(err) => {
                    let forecast_at: DateTime<Utc> = row.try_get("forecast_at")?;
                    tracing::warn!(%spot_id, %forecast_at, error = %err, "skipping unreadable timeline row");
                }
            }
        }

        Ok(points)
    }

    async fn buoy_reading(&self, buoy_id: &str) -> anyhow::Result<Option<BuoyReading>> {
        let row = sqlx::query(
            r#"
            SELECT buoy_id, observed_at, total_wave_height_ft, dominant_period_s,
                   swell_height_ft, swell_period_s, swell_direction_deg,
                   wind_wave_height_ft, wind_wave_period_s, wind_wave_direction_deg
            FROM surf_forecast.buoy_readings
            WHERE buoy_id = $1
            ORDER BY observed_at DESC
            LIMIT 1
            "#,
        )
        .bind(buoy_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(BuoyReading {
            buoy_id: row.try_get("buoy_id")?,
            timestamp: row.try_get("observed_at")?,
            total_wave_height_ft: row.try_get("total_wave_height_ft")?,
            dominant_period_s: row.try_get("dominant_period_s")?,
            swell: component(&row, "swell")?,
            wind_wave: component(&row, "wind_wave")?,
            is_stale: false,
        }))
    }

    async fn timeline_version(&self, spot_id: Uuid) -> anyhow::Result<i64> {
        let version: i64 = sqlx::query(
            r#"
            SELECT COALESCE(EXTRACT(EPOCH FROM MAX(fetched_at))::bigint, 0) AS version
            FROM surf_forecast.timeline_points
            WHERE spot_id = $1
            "#,
        )
        .bind(spot_id)
        .fetch_one(&self.pool)
        .await?
        .try_get("version")?;

        Ok(version)
    }
}
