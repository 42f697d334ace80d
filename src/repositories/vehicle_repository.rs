use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::Repository;
use crate::models::vehicle::{NewVehicle, VehiclePatch};
use crate::models::{Entity, Vehicle};
use crate::utils::errors::{map_unique_violation, not_found_error, AppResult};

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Vehicle> for VehicleRepository {
    async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(vehicles)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn add(&self, new: NewVehicle) -> AppResult<Vehicle> {
        // La unicidad de la matrícula la garantiza el índice único
        let vehicle = Vehicle::create(new, &[], Uuid::new_v4(), Utc::now())?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, name, plate, vehicle_type, capacity_kg, odometer_km, status, roi_cost, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.name)
        .bind(&vehicle.plate)
        .bind(vehicle.vehicle_type)
        .bind(vehicle.capacity_kg)
        .bind(vehicle.odometer_km)
        .bind(vehicle.status)
        .bind(vehicle.roi_cost)
        .bind(vehicle.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Vehicle", "plate", &vehicle.plate))?;

        debug!("➕ Vehículo {} registrado", vehicle.plate);
        Ok(vehicle)
    }

    async fn update(&self, id: Uuid, patch: VehiclePatch) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;

        let mut vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        vehicle.apply(patch)?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET name = $2, capacity_kg = $3, odometer_km = $4, status = $5, roi_cost = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&vehicle.name)
        .bind(vehicle.capacity_kg)
        .bind(vehicle.odometer_km)
        .bind(vehicle.status)
        .bind(vehicle.roi_cost)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(vehicle)
    }
}
