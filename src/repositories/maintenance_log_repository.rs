use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::models::maintenance_log::{MaintenanceLogPatch, NewMaintenanceLog};
use crate::models::{Entity, MaintenanceLog};
use crate::utils::errors::{not_found_error, AppResult};

pub struct MaintenanceLogRepository {
    pool: PgPool,
}

impl MaintenanceLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<MaintenanceLog> for MaintenanceLogRepository {
    async fn list(&self) -> AppResult<Vec<MaintenanceLog>> {
        let logs = sqlx::query_as::<_, MaintenanceLog>(
            "SELECT * FROM maintenance_logs ORDER BY date DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let log = sqlx::query_as::<_, MaintenanceLog>("SELECT * FROM maintenance_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(log)
    }

    async fn add(&self, new: NewMaintenanceLog) -> AppResult<MaintenanceLog> {
        let log = MaintenanceLog::create(new, &[], Uuid::new_v4(), Utc::now())?;

        let log = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            INSERT INTO maintenance_logs (id, vehicle_id, date, description, cost, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(log.vehicle_id)
        .bind(log.date)
        .bind(&log.description)
        .bind(log.cost)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn update(&self, id: Uuid, patch: MaintenanceLogPatch) -> AppResult<MaintenanceLog> {
        let mut tx = self.pool.begin().await?;

        let mut log = sqlx::query_as::<_, MaintenanceLog>(
            "SELECT * FROM maintenance_logs WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Maintenance log", &id.to_string()))?;

        log.apply(patch)?;

        let log = sqlx::query_as::<_, MaintenanceLog>(
            "UPDATE maintenance_logs SET date = $2, description = $3, cost = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(log.date)
        .bind(&log.description)
        .bind(log.cost)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(log)
    }
}
