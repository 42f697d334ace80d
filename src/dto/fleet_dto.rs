//! Requests de vehículos y conductores

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::driver::{DriverPatch, NewDriver};
use crate::models::vehicle::{NewVehicle, VehiclePatch};
use crate::models::{DriverStatus, DutyStatus, VehicleStatus, VehicleType};
use crate::utils::validation::{
    validate_non_negative, validate_not_empty, validate_phone, validate_plate, validate_positive,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_empty")]
    pub name: String,

    #[validate(custom = "validate_plate")]
    pub plate: String,

    pub vehicle_type: VehicleType,

    #[validate(custom = "validate_positive")]
    pub capacity_kg: Decimal,

    #[validate(custom = "validate_non_negative")]
    pub odometer_km: Option<Decimal>,

    #[validate(custom = "validate_non_negative")]
    pub roi_cost: Option<Decimal>,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(req: CreateVehicleRequest) -> Self {
        Self {
            name: req.name,
            plate: req.plate,
            vehicle_type: req.vehicle_type,
            capacity_kg: req.capacity_kg,
            odometer_km: req.odometer_km,
            roi_cost: req.roi_cost,
        }
    }
}

/// La matrícula no se acepta: es inmutable
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(custom = "validate_positive")]
    pub capacity_kg: Option<Decimal>,

    #[validate(custom = "validate_non_negative")]
    pub odometer_km: Option<Decimal>,

    pub status: Option<VehicleStatus>,

    #[validate(custom = "validate_non_negative")]
    pub roi_cost: Option<Decimal>,
}

impl From<UpdateVehicleRequest> for VehiclePatch {
    fn from(req: UpdateVehicleRequest) -> Self {
        Self {
            name: req.name,
            capacity_kg: req.capacity_kg,
            odometer_km: req.odometer_km,
            status: req.status,
            roi_cost: req.roi_cost,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(custom = "validate_phone")]
    pub phone: String,

    pub license_expiry: NaiveDate,

    #[validate(length(min = 1, max = 50))]
    pub license_type: String,
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(req: CreateDriverRequest) -> Self {
        Self {
            full_name: req.full_name,
            phone: req.phone,
            license_expiry: req.license_expiry,
            license_type: req.license_type,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    pub license_expiry: Option<NaiveDate>,

    #[validate(length(min = 1, max = 50))]
    pub license_type: Option<String>,

    pub status: Option<DriverStatus>,

    pub duty_status: Option<DutyStatus>,

    #[validate(range(min = 0, max = 100))]
    pub safety_score: Option<i32>,
}

impl From<UpdateDriverRequest> for DriverPatch {
    fn from(req: UpdateDriverRequest) -> Self {
        Self {
            full_name: req.full_name,
            phone: req.phone,
            license_expiry: req.license_expiry,
            license_type: req.license_type,
            status: req.status,
            duty_status: req.duty_status,
            safety_score: req.safety_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionRateResponse {
    pub driver_id: uuid::Uuid,
    pub completion_rate: u32,
}
