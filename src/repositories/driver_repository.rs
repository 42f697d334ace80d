use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::models::driver::{DriverPatch, NewDriver};
use crate::models::{Driver, Entity};
use crate::utils::errors::{not_found_error, AppResult};

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Driver> for DriverRepository {
    async fn list(&self) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(drivers)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(driver)
    }

    async fn add(&self, new: NewDriver) -> AppResult<Driver> {
        let driver = Driver::create(new, &[], Uuid::new_v4(), Utc::now())?;

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, full_name, phone, license_expiry, license_type, status, duty_status, safety_score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(driver.id)
        .bind(&driver.full_name)
        .bind(&driver.phone)
        .bind(driver.license_expiry)
        .bind(&driver.license_type)
        .bind(driver.status)
        .bind(driver.duty_status)
        .bind(driver.safety_score)
        .bind(driver.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn update(&self, id: Uuid, patch: DriverPatch) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;

        let mut driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        driver.apply(patch)?;

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET full_name = $2, phone = $3, license_expiry = $4, license_type = $5,
                status = $6, duty_status = $7, safety_score = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&driver.full_name)
        .bind(&driver.phone)
        .bind(driver.license_expiry)
        .bind(&driver.license_type)
        .bind(driver.status)
        .bind(driver.duty_status)
        .bind(driver.safety_score)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(driver)
    }
}
