//! Almacén PostgreSQL de la flota (modo en vivo)

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::driver_repository::DriverRepository;
use super::fuel_log_repository::FuelLogRepository;
use super::maintenance_log_repository::MaintenanceLogRepository;
use super::trip_repository::TripRepository;
use super::user_repository::UserRepository;
use super::vehicle_repository::VehicleRepository;
use super::{FleetStore, Repository};
use crate::config::StoreMode;
use crate::models::trip::TripTransition;
use crate::models::{Driver, FuelLog, MaintenanceLog, Trip, User, Vehicle};
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgStore {
    pool: PgPool,
    vehicles: Arc<VehicleRepository>,
    drivers: Arc<DriverRepository>,
    trips: Arc<TripRepository>,
    fuel_logs: Arc<FuelLogRepository>,
    maintenance_logs: Arc<MaintenanceLogRepository>,
    users: Arc<UserRepository>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: Arc::new(VehicleRepository::new(pool.clone())),
            drivers: Arc::new(DriverRepository::new(pool.clone())),
            trips: Arc::new(TripRepository::new(pool.clone())),
            fuel_logs: Arc::new(FuelLogRepository::new(pool.clone())),
            maintenance_logs: Arc::new(MaintenanceLogRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FleetStore for PgStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Live
    }

    fn vehicles(&self) -> Arc<dyn Repository<Vehicle>> {
        self.vehicles.clone()
    }

    fn drivers(&self) -> Arc<dyn Repository<Driver>> {
        self.drivers.clone()
    }

    fn trips(&self) -> Arc<dyn Repository<Trip>> {
        self.trips.clone()
    }

    fn fuel_logs(&self) -> Arc<dyn Repository<FuelLog>> {
        self.fuel_logs.clone()
    }

    fn maintenance_logs(&self) -> Arc<dyn Repository<MaintenanceLog>> {
        self.maintenance_logs.clone()
    }

    fn users(&self) -> Arc<dyn Repository<User>> {
        self.users.clone()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn commit_trip_transition(&self, transition: &TripTransition) -> AppResult<()> {
        // Una sola transacción; si algo falla el rollback es implícito al soltar `tx`
        let mut tx = self.pool.begin().await?;

        let mut trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 FOR UPDATE")
            .bind(transition.trip_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Trip", &transition.trip_id.to_string()))?;
        let mut vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(transition.vehicle_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &transition.vehicle_id.to_string()))?;
        let mut driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(transition.driver_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Driver", &transition.driver_id.to_string()))?;

        transition.apply(&mut trip, &mut vehicle, &mut driver)?;

        sqlx::query("UPDATE trips SET status = $2 WHERE id = $1")
            .bind(trip.id)
            .bind(trip.status)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
            .bind(vehicle.id)
            .bind(vehicle.status)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE drivers SET status = $2 WHERE id = $1")
            .bind(driver.id)
            .bind(driver.status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "🚚 Viaje {} -> {} (vehículo {}, conductor {})",
            trip.ref_id,
            trip.status.as_str(),
            vehicle.plate,
            driver.full_name
        );
        Ok(())
    }
}
