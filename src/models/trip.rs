//! Modelo de Trip
//!
//! Viajes, su máquina de estados y la referencia legible `TRP-NNNN`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::cmp::Ordering;
use uuid::Uuid;

use super::{Driver, DriverStatus, Entity, Vehicle, VehicleStatus};
use crate::utils::errors::{AppError, AppResult};

/// Contador base: la primera referencia emitida es `TRP-0046`
pub const REF_COUNTER_SEED: u64 = 45;
pub const REF_PREFIX: &str = "TRP-";

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Draft,
    Dispatched,
    Completed,
}

impl TripStatus {
    /// Sólo se avanza un paso: draft -> dispatched -> completed
    pub fn can_transition_to(&self, next: TripStatus) -> bool {
        matches!(
            (self, next),
            (TripStatus::Draft, TripStatus::Dispatched) | (TripStatus::Dispatched, TripStatus::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Draft => "draft",
            TripStatus::Dispatched => "dispatched",
            TripStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub ref_id: String,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub cargo_weight_kg: Decimal,
    pub estimated_fuel_cost: Option<Decimal>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub cargo_weight_kg: Decimal,
    pub estimated_fuel_cost: Option<Decimal>,
}

/// Sólo el estado es mutable; las transiciones pasan por [`TripTransition`]
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    pub status: Option<TripStatus>,
}

/// Formatear la referencia legible de un viaje
pub fn format_ref_id(counter: u64) -> String {
    format!("{}{:04}", REF_PREFIX, counter)
}

/// Extraer el contador de una referencia `TRP-NNNN`
pub fn parse_ref_counter(ref_id: &str) -> Option<u64> {
    ref_id.strip_prefix(REF_PREFIX)?.parse().ok()
}

/// Siguiente contador: uno más que el mayor existente (o que la semilla)
pub fn next_ref_counter(existing: &[Trip]) -> u64 {
    existing
        .iter()
        .filter_map(|t| parse_ref_counter(&t.ref_id))
        .fold(REF_COUNTER_SEED, u64::max)
        + 1
}

impl Trip {
    /// Construir un viaje en borrador con la referencia ya asignada
    pub fn draft(new: NewTrip, id: Uuid, ref_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            ref_id,
            vehicle_id: new.vehicle_id,
            driver_id: new.driver_id,
            origin: new.origin.trim().to_string(),
            destination: new.destination.trim().to_string(),
            cargo_weight_kg: new.cargo_weight_kg,
            estimated_fuel_cost: new.estimated_fuel_cost,
            status: TripStatus::Draft,
            created_at: now,
        }
    }

    pub fn ref_counter(&self) -> Option<u64> {
        parse_ref_counter(&self.ref_id)
    }

    fn advance(&mut self, next: TripStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Trip {} cannot move from {} to {}",
                self.ref_id,
                self.status.as_str(),
                next.as_str()
            )));
        }
        self.status = next;
        Ok(())
    }
}

impl Entity for Trip {
    type New = NewTrip;
    type Patch = TripPatch;

    const COLLECTION: &'static str = "trips";
    const LABEL: &'static str = "Trip";

    fn id(&self) -> Uuid {
        self.id
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.ref_counter().cmp(&a.ref_counter()))
    }

    fn create(new: NewTrip, existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Trip::draft(new, id, format_ref_id(next_ref_counter(existing)), now))
    }

    fn apply(&mut self, patch: TripPatch) -> AppResult<()> {
        if let Some(status) = patch.status {
            if status != self.status {
                self.advance(status)?;
            }
        }
        Ok(())
    }
}

/// Cambio de estado acoplado de viaje, vehículo y conductor
#[derive(Debug, Clone, PartialEq)]
pub struct TripTransition {
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub from: TripStatus,
    pub to: TripStatus,
    pub vehicle_status: VehicleStatus,
    pub driver_status: DriverStatus,
}

impl TripTransition {
    /// "Dispatch Now": el vehículo y el conductor quedan comprometidos
    pub fn dispatch(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            from: TripStatus::Draft,
            to: TripStatus::Dispatched,
            vehicle_status: VehicleStatus::OnTrip,
            driver_status: DriverStatus::OnTrip,
        }
    }

    /// "Mark Completed": el vehículo y el conductor vuelven a estar libres
    pub fn complete(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id,
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            from: TripStatus::Dispatched,
            to: TripStatus::Completed,
            vehicle_status: VehicleStatus::Available,
            driver_status: DriverStatus::Available,
        }
    }

    /// Aplicar la transición sobre copias de los tres registros.
    ///
    /// Si devuelve error, ningún registro debe considerarse modificado:
    /// los llamadores trabajan sobre copias y sólo las publican con `Ok`.
    pub fn apply(&self, trip: &mut Trip, vehicle: &mut Vehicle, driver: &mut Driver) -> AppResult<()> {
        if trip.id != self.trip_id || vehicle.id != self.vehicle_id || driver.id != self.driver_id {
            return Err(AppError::Internal(
                "Transition applied to records it was not planned for".to_string(),
            ));
        }
        if trip.status != self.from {
            return Err(AppError::Conflict(format!(
                "Trip {} is {} (expected {})",
                trip.ref_id,
                trip.status.as_str(),
                self.from.as_str()
            )));
        }
        trip.advance(self.to)?;
        vehicle.transition_to(self.vehicle_status)?;
        driver.status = self.driver_status;
        Ok(())
    }
}
