//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus estados y las variantes
//! para alta y actualización. Mapea a la tabla `vehicles`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::cmp::Ordering;
use uuid::Uuid;

use super::Entity;
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::validation::normalize_plate;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    OnTrip,
    InShop,
    Retired,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::OnTrip => "on_trip",
            VehicleStatus::InShop => "in_shop",
            VehicleStatus::Retired => "retired",
        }
    }

    /// `retired` es terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, VehicleStatus::Retired)
    }
}

/// Tipo de vehículo - mapea al ENUM vehicle_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_type")]
pub enum VehicleType {
    Van,
    Truck,
    Bike,
}

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub plate: String,
    pub vehicle_type: VehicleType,
    pub capacity_kg: Decimal,
    pub odometer_km: Decimal,
    pub status: VehicleStatus,
    pub roi_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Datos de alta de un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub name: String,
    pub plate: String,
    pub vehicle_type: VehicleType,
    pub capacity_kg: Decimal,
    pub odometer_km: Option<Decimal>,
    pub roi_cost: Option<Decimal>,
}

/// Cambios permitidos sobre un vehículo; la matrícula no se puede cambiar
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub name: Option<String>,
    pub capacity_kg: Option<Decimal>,
    pub odometer_km: Option<Decimal>,
    pub status: Option<VehicleStatus>,
    pub roi_cost: Option<Decimal>,
}

impl VehiclePatch {
    pub fn status(status: VehicleStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Vehicle {
    /// Construir el vehículo con los valores por defecto de alta
    pub fn register(new: NewVehicle, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            plate: normalize_plate(&new.plate),
            vehicle_type: new.vehicle_type,
            capacity_kg: new.capacity_kg,
            odometer_km: new.odometer_km.unwrap_or(Decimal::ZERO),
            status: VehicleStatus::Available,
            roi_cost: new.roi_cost.unwrap_or(Decimal::ZERO),
            created_at: now,
        }
    }

    /// Cambiar el estado respetando que `retired` es terminal
    pub fn transition_to(&mut self, status: VehicleStatus) -> AppResult<()> {
        if self.status.is_terminal() && status != self.status {
            return Err(AppError::Conflict(format!(
                "Vehicle '{}' is retired and cannot change status",
                self.plate
            )));
        }
        self.status = status;
        Ok(())
    }

    /// Un vehículo en ruta o retirado no puede entrar al taller
    pub fn ensure_can_enter_shop(&self) -> AppResult<()> {
        match self.status {
            VehicleStatus::OnTrip => Err(AppError::Conflict(format!(
                "Vehicle '{}' is on a trip and cannot be sent to the shop",
                self.plate
            ))),
            VehicleStatus::Retired => Err(AppError::Conflict(format!(
                "Vehicle '{}' is retired and cannot be sent to the shop",
                self.plate
            ))),
            VehicleStatus::Available | VehicleStatus::InShop => Ok(()),
        }
    }
}

impl Entity for Vehicle {
    type New = NewVehicle;
    type Patch = VehiclePatch;

    const COLLECTION: &'static str = "vehicles";
    const LABEL: &'static str = "Vehicle";

    fn id(&self) -> Uuid {
        self.id
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }

    fn create(new: NewVehicle, existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        let vehicle = Vehicle::register(new, id, now);
        if existing.iter().any(|v| v.plate == vehicle.plate) {
            return Err(conflict_error("Vehicle", "plate", &vehicle.plate));
        }
        Ok(vehicle)
    }

    /// Edición manual: mientras el vehículo está en ruta sólo el cierre
    /// del viaje puede cambiarle el estado
    fn apply(&mut self, patch: VehiclePatch) -> AppResult<()> {
        if let Some(status) = patch.status {
            if self.status == VehicleStatus::OnTrip && status != VehicleStatus::OnTrip {
                return Err(AppError::Conflict(format!(
                    "Vehicle '{}' is on a trip; complete the trip first",
                    self.plate
                )));
            }
            self.transition_to(status)?;
        }
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(capacity) = patch.capacity_kg {
            self.capacity_kg = capacity;
        }
        if let Some(odometer) = patch.odometer_km {
            self.odometer_km = odometer;
        }
        if let Some(roi_cost) = patch.roi_cost {
            self.roi_cost = roi_cost;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn van(plate: &str) -> NewVehicle {
        NewVehicle {
            name: "Ford Transit".to_string(),
            plate: plate.to_string(),
            vehicle_type: VehicleType::Van,
            capacity_kg: Decimal::from(800),
            odometer_km: None,
            roi_cost: None,
        }
    }

    #[test]
    fn test_register_defaults() {
        let v = Vehicle::register(van("van-0921"), Uuid::new_v4(), Utc::now());
        assert_eq!(v.status, VehicleStatus::Available);
        assert_eq!(v.plate, "VAN-0921");
        assert_eq!(v.odometer_km, Decimal::ZERO);
        assert_eq!(v.roi_cost, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_plate_rejected() {
        let first = Vehicle::register(van("VAN-0921"), Uuid::new_v4(), Utc::now());
        let err = Vehicle::create(van("van-0921"), &[first], Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_retired_is_terminal() {
        let mut v = Vehicle::register(van("VAN-0921"), Uuid::new_v4(), Utc::now());
        v.apply(VehiclePatch::status(VehicleStatus::Retired)).unwrap();
        let err = v.apply(VehiclePatch::status(VehicleStatus::Available)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(v.status, VehicleStatus::Retired);

        // Los campos que no son de estado siguen editables
        v.apply(VehiclePatch {
            odometer_km: Some(Decimal::from(1000)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(v.odometer_km, Decimal::from(1000));
    }

    #[test]
    fn test_on_trip_vehicle_cannot_be_moved_by_hand() {
        let mut v = Vehicle::register(van("VAN-0921"), Uuid::new_v4(), Utc::now());
        v.transition_to(VehicleStatus::OnTrip).unwrap();

        for target in [VehicleStatus::Retired, VehicleStatus::InShop, VehicleStatus::Available] {
            let err = v.apply(VehiclePatch::status(target)).unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
            assert_eq!(v.status, VehicleStatus::OnTrip);
        }

        // El cierre del viaje sí lo devuelve a disponible
        v.transition_to(VehicleStatus::Available).unwrap();
        assert_eq!(v.status, VehicleStatus::Available);
    }

    #[test]
    fn test_shop_entry_rules() {
        let mut v = Vehicle::register(van("VAN-0921"), Uuid::new_v4(), Utc::now());
        assert!(v.ensure_can_enter_shop().is_ok());

        v.status = VehicleStatus::InShop;
        assert!(v.ensure_can_enter_shop().is_ok());

        v.status = VehicleStatus::OnTrip;
        assert!(matches!(v.ensure_can_enter_shop(), Err(AppError::Conflict(_))));

        v.status = VehicleStatus::Retired;
        assert!(matches!(v.ensure_can_enter_shop(), Err(AppError::Conflict(_))));
    }
}
