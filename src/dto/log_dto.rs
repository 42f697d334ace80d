use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::fuel_log::NewFuelLog;
use crate::models::maintenance_log::NewMaintenanceLog;
use crate::utils::validation::{validate_non_negative, validate_not_empty};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFuelLogRequest {
    pub vehicle_id: Uuid,

    pub trip_id: Option<Uuid>,

    pub date: NaiveDate,

    #[validate(custom = "validate_non_negative")]
    pub gallons: Decimal,

    #[validate(custom = "validate_non_negative")]
    pub cost: Decimal,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub station: String,
}

impl From<CreateFuelLogRequest> for NewFuelLog {
    fn from(req: CreateFuelLogRequest) -> Self {
        Self {
            vehicle_id: req.vehicle_id,
            trip_id: req.trip_id,
            date: req.date,
            gallons: req.gallons,
            cost: req.cost,
            station: req.station,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceLogRequest {
    pub vehicle_id: Uuid,

    pub date: NaiveDate,

    #[validate(length(min = 1, max = 500), custom = "validate_not_empty")]
    pub description: String,

    #[validate(custom = "validate_non_negative")]
    pub cost: Decimal,

    /// Enviar además el vehículo al taller (`in_shop`)
    #[serde(default)]
    pub mark_in_shop: bool,
}

impl From<CreateMaintenanceLogRequest> for NewMaintenanceLog {
    fn from(req: CreateMaintenanceLogRequest) -> Self {
        Self {
            vehicle_id: req.vehicle_id,
            date: req.date,
            description: req.description,
            cost: req.cost,
        }
    }
}
