use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::models::fuel_log::{FuelLogPatch, NewFuelLog};
use crate::models::{Entity, FuelLog};
use crate::utils::errors::{not_found_error, AppResult};

pub struct FuelLogRepository {
    pool: PgPool,
}

impl FuelLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<FuelLog> for FuelLogRepository {
    async fn list(&self) -> AppResult<Vec<FuelLog>> {
        let logs = sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs ORDER BY date DESC, created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<FuelLog>> {
        let log = sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(log)
    }

    async fn add(&self, new: NewFuelLog) -> AppResult<FuelLog> {
        let log = FuelLog::create(new, &[], Uuid::new_v4(), Utc::now())?;

        let log = sqlx::query_as::<_, FuelLog>(
            r#"
            INSERT INTO fuel_logs (id, vehicle_id, trip_id, date, gallons, cost, station, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(log.vehicle_id)
        .bind(log.trip_id)
        .bind(log.date)
        .bind(log.gallons)
        .bind(log.cost)
        .bind(&log.station)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn update(&self, id: Uuid, patch: FuelLogPatch) -> AppResult<FuelLog> {
        let mut tx = self.pool.begin().await?;

        let mut log = sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Fuel log", &id.to_string()))?;

        log.apply(patch)?;

        let log = sqlx::query_as::<_, FuelLog>(
            "UPDATE fuel_logs SET date = $2, gallons = $3, cost = $4, station = $5 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(log.date)
        .bind(log.gallons)
        .bind(log.cost)
        .bind(&log.station)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(log)
    }
}
