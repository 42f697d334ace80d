//! Flujo de despacho
//!
//! Alta de viajes con sus validaciones y la máquina de estados
//! draft -> dispatched -> completed. Cada transición mueve viaje, vehículo
//! y conductor en un único commit del almacén.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::trip::{NewTrip, TripTransition};
use crate::models::{Driver, Trip, Vehicle, VehicleStatus};
use crate::repositories::SharedStore;
use crate::utils::errors::{bad_request_error, AppError, AppResult};

/// Comprobar que el vehículo y el conductor pueden hacer el viaje
pub fn validate_new_trip(new: &NewTrip, vehicle: &Vehicle, driver: &Driver, now: DateTime<Utc>) -> AppResult<()> {
    if new.cargo_weight_kg < Decimal::ZERO {
        return Err(bad_request_error("Cargo weight must not be negative"));
    }
    if vehicle.status != VehicleStatus::Available {
        return Err(AppError::BadRequest(format!(
            "Vehicle '{}' is {} and cannot take a new trip",
            vehicle.plate,
            vehicle.status.as_str()
        )));
    }
    if new.cargo_weight_kg > vehicle.capacity_kg {
        return Err(AppError::BadRequest(format!(
            "Cargo weight ({} kg) exceeds vehicle capacity ({} kg)",
            new.cargo_weight_kg, vehicle.capacity_kg
        )));
    }
    if !driver.is_eligible(now) {
        return Err(AppError::BadRequest(format!(
            "Driver '{}' is not eligible for dispatch",
            driver.full_name
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DispatchService {
    store: SharedStore,
}

impl DispatchService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Crear un viaje en borrador; nada se escribe si falla una validación
    pub async fn create_trip(&self, new: NewTrip, now: DateTime<Utc>) -> AppResult<Trip> {
        let vehicle = self.store.vehicles().get(new.vehicle_id).await?;
        let driver = self.store.drivers().get(new.driver_id).await?;
        validate_new_trip(&new, &vehicle, &driver, now)?;

        let trip = self.store.trips().add(new).await?;
        info!("📝 Viaje {} creado ({} -> {})", trip.ref_id, trip.origin, trip.destination);
        Ok(trip)
    }

    /// "Dispatch Now"
    pub async fn dispatch(&self, trip_id: Uuid) -> AppResult<Trip> {
        let trip = self.store.trips().get(trip_id).await?;
        self.store.commit_trip_transition(&TripTransition::dispatch(&trip)).await?;
        self.store.trips().get(trip_id).await
    }

    /// "Mark Completed"
    pub async fn complete(&self, trip_id: Uuid) -> AppResult<Trip> {
        let trip = self.store.trips().get(trip_id).await?;
        self.store.commit_trip_transition(&TripTransition::complete(&trip)).await?;
        self.store.trips().get(trip_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::{DriverPatch, NewDriver};
    use crate::models::vehicle::NewVehicle;
    use crate::models::{DriverStatus, DutyStatus, TripStatus, VehicleType};
    use crate::repositories::LocalStore;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    async fn fleet() -> (DispatchService, SharedStore, Vehicle, Driver) {
        let store: SharedStore = Arc::new(LocalStore::in_memory());
        let vehicle = store
            .vehicles()
            .add(NewVehicle {
                name: "Ford Transit".to_string(),
                plate: "VAN-0921".to_string(),
                vehicle_type: VehicleType::Van,
                capacity_kg: Decimal::from(800),
                odometer_km: None,
                roi_cost: None,
            })
            .await
            .unwrap();
        let driver = store
            .drivers()
            .add(NewDriver {
                full_name: "Alex Mercer".to_string(),
                phone: "+1234567890".to_string(),
                license_expiry: NaiveDate::from_ymd_opt(2027, 10, 15).unwrap(),
                license_type: "Van".to_string(),
            })
            .await
            .unwrap();
        let driver = store
            .drivers()
            .update(
                driver.id,
                DriverPatch {
                    duty_status: Some(DutyStatus::OnDuty),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (DispatchService::new(store.clone()), store, vehicle, driver)
    }

    fn new_trip(vehicle: &Vehicle, driver: &Driver, cargo: i64) -> NewTrip {
        NewTrip {
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            origin: "Warehouse A".to_string(),
            destination: "City Center".to_string(),
            cargo_weight_kg: Decimal::from(cargo),
            estimated_fuel_cost: None,
        }
    }

    #[tokio::test]
    async fn test_over_capacity_rejected_without_writing() {
        let (service, store, vehicle, driver) = fleet().await;
        let err = service.create_trip(new_trip(&vehicle, &driver, 900), now()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(store.trips().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ref_ids_are_sequential() {
        let (service, _, vehicle, driver) = fleet().await;
        let a = service.create_trip(new_trip(&vehicle, &driver, 450), now()).await.unwrap();
        let b = service.create_trip(new_trip(&vehicle, &driver, 100), now()).await.unwrap();
        assert_eq!(a.ref_id, "TRP-0046");
        assert_eq!(b.ref_id, "TRP-0047");
    }

    #[tokio::test]
    async fn test_expired_license_blocks_creation() {
        let (service, store, vehicle, driver) = fleet().await;
        store
            .drivers()
            .update(
                driver.id,
                DriverPatch {
                    license_expiry: NaiveDate::from_ymd_opt(2026, 10, 17),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = service.create_trip(new_trip(&vehicle, &driver, 10), now()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_not_found() {
        let (service, _, mut vehicle, driver) = fleet().await;
        vehicle.id = Uuid::new_v4();
        let err = service.create_trip(new_trip(&vehicle, &driver, 10), now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dispatch_then_complete() {
        let (service, store, vehicle, driver) = fleet().await;
        let trip = service.create_trip(new_trip(&vehicle, &driver, 450), now()).await.unwrap();

        let dispatched = service.dispatch(trip.id).await.unwrap();
        assert_eq!(dispatched.status, TripStatus::Dispatched);
        assert_eq!(store.vehicles().get(vehicle.id).await.unwrap().status, VehicleStatus::OnTrip);
        assert_eq!(store.drivers().get(driver.id).await.unwrap().status, DriverStatus::OnTrip);

        // Dos despachos del mismo viaje: el segundo es un conflicto
        assert!(matches!(service.dispatch(trip.id).await, Err(AppError::Conflict(_))));

        let completed = service.complete(trip.id).await.unwrap();
        assert_eq!(completed.status, TripStatus::Completed);
        assert_eq!(store.vehicles().get(vehicle.id).await.unwrap().status, VehicleStatus::Available);
        assert_eq!(store.drivers().get(driver.id).await.unwrap().status, DriverStatus::Available);
    }

    #[tokio::test]
    async fn test_vehicle_on_trip_cannot_take_new_trip() {
        let (service, _, vehicle, driver) = fleet().await;
        let trip = service.create_trip(new_trip(&vehicle, &driver, 450), now()).await.unwrap();
        service.dispatch(trip.id).await.unwrap();
        let err = service.create_trip(new_trip(&vehicle, &driver, 10), now()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
