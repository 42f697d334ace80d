//! Capa de acceso a datos
//!
//! Un único contrato ([`Repository`] + [`FleetStore`]) con dos
//! implementaciones: memoria local (demo/offline, persistencia JSON
//! opcional) y PostgreSQL en vivo. El modo se elige una vez al arrancar;
//! los llamadores nunca ramifican según el modo.

pub mod demo_data;
pub mod driver_repository;
pub mod fuel_log_repository;
pub mod local_repository;
pub mod local_store;
pub mod maintenance_log_repository;
pub mod pg_store;
pub mod trip_repository;
pub mod user_repository;
pub mod vehicle_repository;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::StoreMode;
use crate::models::trip::TripTransition;
use crate::models::{Driver, Entity, FuelLog, MaintenanceLog, Trip, User, Vehicle};
use crate::utils::errors::{not_found_error, AppResult};

pub use local_store::LocalStore;
pub use pg_store::PgStore;

/// Operaciones list/add/update de una colección
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Colección completa en orden de listado
    async fn list(&self) -> AppResult<Vec<E>>;

    async fn find(&self, id: Uuid) -> AppResult<Option<E>>;

    /// Alta con id, timestamps y estados por defecto asignados por el almacén
    async fn add(&self, new: E::New) -> AppResult<E>;

    /// Fusionar `patch` en el registro `id`; `NotFound` si no existe
    async fn update(&self, id: Uuid, patch: E::Patch) -> AppResult<E>;

    async fn get(&self, id: Uuid) -> AppResult<E> {
        self.find(id)
            .await?
            .ok_or_else(|| not_found_error(E::LABEL, &id.to_string()))
    }
}

/// Almacén completo de la flota
#[async_trait]
pub trait FleetStore: Send + Sync {
    fn mode(&self) -> StoreMode;

    fn vehicles(&self) -> Arc<dyn Repository<Vehicle>>;
    fn drivers(&self) -> Arc<dyn Repository<Driver>>;
    fn trips(&self) -> Arc<dyn Repository<Trip>>;
    fn fuel_logs(&self) -> Arc<dyn Repository<FuelLog>>;
    fn maintenance_logs(&self) -> Arc<dyn Repository<MaintenanceLog>>;
    fn users(&self) -> Arc<dyn Repository<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Aplicar de forma atómica el cambio acoplado viaje/vehículo/conductor.
    /// O se aplican los tres cambios o ninguno.
    async fn commit_trip_transition(&self, transition: &TripTransition) -> AppResult<()>;
}

pub type SharedStore = Arc<dyn FleetStore>;
