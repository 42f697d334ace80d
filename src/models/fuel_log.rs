//! Modelo de FuelLog
//!
//! Repostajes por vehículo, opcionalmente ligados a un viaje.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;

use super::Entity;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FuelLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub date: NaiveDate,
    pub gallons: Decimal,
    pub cost: Decimal,
    pub station: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFuelLog {
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub date: NaiveDate,
    pub gallons: Decimal,
    pub cost: Decimal,
    pub station: String,
}

#[derive(Debug, Clone, Default)]
pub struct FuelLogPatch {
    pub date: Option<NaiveDate>,
    pub gallons: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub station: Option<String>,
}

fn ensure_non_negative(field: &str, value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{} must not be negative", field)));
    }
    Ok(())
}

/// Más reciente primero: fecha descendente y, a igualdad, alta descendente
pub(crate) fn newest_dated_first(
    a_date: NaiveDate,
    a_created: DateTime<Utc>,
    b_date: NaiveDate,
    b_created: DateTime<Utc>,
) -> Ordering {
    b_date.cmp(&a_date).then_with(|| b_created.cmp(&a_created))
}

impl Entity for FuelLog {
    type New = NewFuelLog;
    type Patch = FuelLogPatch;

    const COLLECTION: &'static str = "fuel_logs";
    const LABEL: &'static str = "Fuel log";

    fn id(&self) -> Uuid {
        self.id
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        newest_dated_first(a.date, a.created_at, b.date, b.created_at)
    }

    fn create(new: NewFuelLog, _existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        ensure_non_negative("gallons", new.gallons)?;
        ensure_non_negative("cost", new.cost)?;
        Ok(Self {
            id,
            vehicle_id: new.vehicle_id,
            trip_id: new.trip_id,
            date: new.date,
            gallons: new.gallons,
            cost: new.cost,
            station: new.station.trim().to_string(),
            created_at: now,
        })
    }

    fn apply(&mut self, patch: FuelLogPatch) -> AppResult<()> {
        if let Some(gallons) = patch.gallons {
            ensure_non_negative("gallons", gallons)?;
        }
        if let Some(cost) = patch.cost {
            ensure_non_negative("cost", cost)?;
        }
        if let Some(gallons) = patch.gallons {
            self.gallons = gallons;
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(station) = patch.station {
            self.station = station.trim().to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_amounts_rejected() {
        let new = NewFuelLog {
            vehicle_id: Uuid::new_v4(),
            trip_id: None,
            date: NaiveDate::from_ymd_opt(2026, 2, 21).unwrap(),
            gallons: Decimal::new(-1, 0),
            cost: Decimal::new(4550, 2),
            station: "Shell Central".to_string(),
        };
        assert!(FuelLog::create(new, &[], Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_listing_order_by_date() {
        let now = Utc::now();
        let older = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        let newer = NaiveDate::from_ymd_opt(2026, 2, 21).unwrap();
        assert_eq!(newest_dated_first(newer, now, older, now), Ordering::Less);
        assert_eq!(newest_dated_first(older, now, newer, now), Ordering::Greater);
    }
}
