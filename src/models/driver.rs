//! Modelo de Driver
//!
//! Conductores, su disponibilidad y su situación de servicio.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::cmp::Ordering;
use uuid::Uuid;

use super::Entity;
use crate::utils::errors::{AppError, AppResult};

/// Disponibilidad operativa - mapea al ENUM driver_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    OnTrip,
}

/// Situación de servicio - mapea al ENUM duty_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "duty_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OnDuty,
    OffDuty,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub license_expiry: NaiveDate,
    pub license_type: String,
    pub status: DriverStatus,
    pub duty_status: DutyStatus,
    pub safety_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub full_name: String,
    pub phone: String,
    pub license_expiry: NaiveDate,
    pub license_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct DriverPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub license_type: Option<String>,
    pub status: Option<DriverStatus>,
    pub duty_status: Option<DutyStatus>,
    pub safety_score: Option<i32>,
}

impl DriverPatch {
    pub fn status(status: DriverStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

pub const MAX_SAFETY_SCORE: i32 = 100;

impl Driver {
    pub fn register(new: NewDriver, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: new.full_name.trim().to_string(),
            phone: new.phone.trim().to_string(),
            license_expiry: new.license_expiry,
            license_type: new.license_type,
            status: DriverStatus::Available,
            duty_status: DutyStatus::OffDuty,
            safety_score: MAX_SAFETY_SCORE,
            created_at: now,
        }
    }

    /// Licencia vigente en el instante `now` (caduca al inicio del día de expiración)
    pub fn license_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.license_expiry > now.date_naive()
    }

    /// Apto para despacho: disponible, de servicio y con licencia vigente
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.status == DriverStatus::Available
            && self.duty_status == DutyStatus::OnDuty
            && self.license_valid_at(now)
    }
}

impl Entity for Driver {
    type New = NewDriver;
    type Patch = DriverPatch;

    const COLLECTION: &'static str = "drivers";
    const LABEL: &'static str = "Driver";

    fn id(&self) -> Uuid {
        self.id
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }

    fn create(new: NewDriver, _existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Driver::register(new, id, now))
    }

    fn apply(&mut self, patch: DriverPatch) -> AppResult<()> {
        if let Some(score) = patch.safety_score {
            if !(0..=MAX_SAFETY_SCORE).contains(&score) {
                return Err(AppError::BadRequest(format!(
                    "Safety score must be between 0 and {}",
                    MAX_SAFETY_SCORE
                )));
            }
            self.safety_score = score;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(expiry) = patch.license_expiry {
            self.license_expiry = expiry;
        }
        if let Some(license_type) = patch.license_type {
            self.license_type = license_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(duty_status) = patch.duty_status {
            self.duty_status = duty_status;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn driver(expiry: NaiveDate) -> Driver {
        let mut d = Driver::register(
            NewDriver {
                full_name: "Alex Mercer".to_string(),
                phone: "+1234567890".to_string(),
                license_expiry: expiry,
                license_type: "Truck".to_string(),
            },
            Uuid::new_v4(),
            Utc::now(),
        );
        d.duty_status = DutyStatus::OnDuty;
        d
    }

    #[test]
    fn test_register_defaults() {
        let d = Driver::register(
            NewDriver {
                full_name: " Sarah Connor ".to_string(),
                phone: "+1987654321".to_string(),
                license_expiry: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
                license_type: "Van".to_string(),
            },
            Uuid::new_v4(),
            Utc::now(),
        );
        assert_eq!(d.full_name, "Sarah Connor");
        assert_eq!(d.status, DriverStatus::Available);
        assert_eq!(d.duty_status, DutyStatus::OffDuty);
        assert_eq!(d.safety_score, 100);
    }

    #[test]
    fn test_expired_license_never_eligible() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let expired = driver(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(!expired.is_eligible(now));

        let expires_today = driver(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert!(!expires_today.is_eligible(now));

        let valid = driver(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert!(valid.is_eligible(now));
    }

    #[test]
    fn test_duty_and_status_gate_eligibility() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut d = driver(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        d.duty_status = DutyStatus::Suspended;
        assert!(!d.is_eligible(now));
        d.duty_status = DutyStatus::OnDuty;
        d.status = DriverStatus::OnTrip;
        assert!(!d.is_eligible(now));
    }

    #[test]
    fn test_safety_score_range() {
        let mut d = driver(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let err = d
            .apply(DriverPatch {
                safety_score: Some(101),
                duty_status: Some(DutyStatus::Suspended),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(d.duty_status, DutyStatus::OnDuty);
    }
}
