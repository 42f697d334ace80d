//! Modelo de MaintenanceLog

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;

use super::fuel_log::newest_dated_first;
use super::Entity;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenanceLog {
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceLogPatch {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub cost: Option<Decimal>,
}

impl Entity for MaintenanceLog {
    type New = NewMaintenanceLog;
    type Patch = MaintenanceLogPatch;

    const COLLECTION: &'static str = "maintenance_logs";
    const LABEL: &'static str = "Maintenance log";

    fn id(&self) -> Uuid {
        self.id
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        newest_dated_first(a.date, a.created_at, b.date, b.created_at)
    }

    fn create(new: NewMaintenanceLog, _existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        if new.cost < Decimal::ZERO {
            return Err(AppError::BadRequest("cost must not be negative".to_string()));
        }
        Ok(Self {
            id,
            vehicle_id: new.vehicle_id,
            date: new.date,
            description: new.description.trim().to_string(),
            cost: new.cost,
            created_at: now,
        })
    }

    fn apply(&mut self, patch: MaintenanceLogPatch) -> AppResult<()> {
        if let Some(cost) = patch.cost {
            if cost < Decimal::ZERO {
                return Err(AppError::BadRequest("cost must not be negative".to_string()));
            }
            self.cost = cost;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        Ok(())
    }
}
