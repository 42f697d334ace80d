use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::NewTrip;
use crate::utils::validation::{validate_non_negative, validate_not_empty, validate_positive};

// Formulario "New Dispatch"
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,

    pub driver_id: Uuid,

    #[validate(length(min = 1, max = 200), custom = "validate_not_empty")]
    pub origin: String,

    #[validate(length(min = 1, max = 200), custom = "validate_not_empty")]
    pub destination: String,

    #[validate(custom = "validate_positive")]
    pub cargo_weight_kg: Decimal,

    #[validate(custom = "validate_non_negative")]
    pub estimated_fuel_cost: Option<Decimal>,
}

impl From<CreateTripRequest> for NewTrip {
    fn from(req: CreateTripRequest) -> Self {
        Self {
            vehicle_id: req.vehicle_id,
            driver_id: req.driver_id,
            origin: req.origin,
            destination: req.destination,
            cargo_weight_kg: req.cargo_weight_kg,
            estimated_fuel_cost: req.estimated_fuel_cost,
        }
    }
}
