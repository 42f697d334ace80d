//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos de la flota. Cada modelo
//! implementa [`Entity`], que concentra las reglas de creación y de
//! actualización para que el almacenamiento local y el de PostgreSQL
//! apliquen exactamente las mismas invariantes.

pub mod analytics;
pub mod driver;
pub mod fuel_log;
pub mod maintenance_log;
pub mod trip;
pub mod user;
pub mod vehicle;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::utils::errors::AppResult;

pub use driver::{Driver, DriverStatus, DutyStatus};
pub use fuel_log::FuelLog;
pub use maintenance_log::MaintenanceLog;
pub use trip::{Trip, TripStatus};
pub use user::{Role, User};
pub use vehicle::{Vehicle, VehicleStatus, VehicleType};

/// Registro persistible por el shim de almacenamiento
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Datos de alta (sin id, timestamps ni estados por defecto)
    type New: Send + Sync + 'static;
    /// Cambios parciales; los campos inmutables no forman parte del patch
    type Patch: Send + Sync + 'static;

    /// Nombre de la tabla / colección
    const COLLECTION: &'static str;
    /// Nombre legible para mensajes de error
    const LABEL: &'static str;

    fn id(&self) -> Uuid;

    /// Orden de listado: los más recientes primero
    fn newest_first(a: &Self, b: &Self) -> Ordering;

    /// Construir el registro nuevo validando contra los existentes
    fn create(new: Self::New, existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self>;

    /// Aplicar un patch sobre una copia del registro
    fn apply(&mut self, patch: Self::Patch) -> AppResult<()>;
}

/// Ordenar una colección según el orden de listado de la entidad
pub fn sort_for_listing<E: Entity>(records: &mut [E]) {
    records.sort_by(E::newest_first);
}
