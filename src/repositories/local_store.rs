//! Almacén local de la flota
//!
//! Objeto inyectable construido en la raíz de composición (no estado
//! global), así cada test puede trabajar con una instancia nueva.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::demo_data::DemoFleet;
use super::local_repository::LocalRepository;
use super::{FleetStore, Repository};
use crate::config::StoreMode;
use crate::models::trip::TripTransition;
use crate::models::user::normalize_email;
use crate::models::{Driver, Entity, FuelLog, MaintenanceLog, Trip, User, Vehicle};
use crate::utils::errors::{not_found_error, AppResult};

pub struct LocalStore {
    vehicles: Arc<LocalRepository<Vehicle>>,
    drivers: Arc<LocalRepository<Driver>>,
    trips: Arc<LocalRepository<Trip>>,
    fuel_logs: Arc<LocalRepository<FuelLog>>,
    maintenance_logs: Arc<LocalRepository<MaintenanceLog>>,
    users: Arc<LocalRepository<User>>,
}

impl LocalStore {
    /// Almacén vacío, sólo en memoria
    pub fn in_memory() -> Self {
        Self::from_fleet(DemoFleet::default())
    }

    /// Almacén en memoria con la flota de demostración
    pub fn with_demo_fleet() -> Self {
        Self::from_fleet(DemoFleet::build())
    }

    fn from_fleet(fleet: DemoFleet) -> Self {
        Self {
            vehicles: Arc::new(LocalRepository::in_memory(fleet.vehicles)),
            drivers: Arc::new(LocalRepository::in_memory(fleet.drivers)),
            trips: Arc::new(LocalRepository::in_memory(fleet.trips)),
            fuel_logs: Arc::new(LocalRepository::in_memory(fleet.fuel_logs)),
            maintenance_logs: Arc::new(LocalRepository::in_memory(fleet.maintenance_logs)),
            users: Arc::new(LocalRepository::in_memory(Vec::new())),
        }
    }

    /// Almacén persistido en `dir`, un blob JSON por colección
    pub async fn open(dir: &Path, seed_demo: bool) -> AppResult<Self> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            crate::utils::errors::AppError::Storage(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        let fleet = if seed_demo { DemoFleet::build() } else { DemoFleet::default() };
        info!("📂 Abriendo almacén local en {}", dir.display());
        Ok(Self {
            vehicles: Arc::new(LocalRepository::open(dir, fleet.vehicles).await?),
            drivers: Arc::new(LocalRepository::open(dir, fleet.drivers).await?),
            trips: Arc::new(LocalRepository::open(dir, fleet.trips).await?),
            fuel_logs: Arc::new(LocalRepository::open(dir, fleet.fuel_logs).await?),
            maintenance_logs: Arc::new(LocalRepository::open(dir, fleet.maintenance_logs).await?),
            users: Arc::new(LocalRepository::open(dir, Vec::new()).await?),
        })
    }
}

fn position<E: Entity>(records: &[E], id: uuid::Uuid) -> AppResult<usize> {
    records
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| not_found_error(E::LABEL, &id.to_string()))
}

#[async_trait]
impl FleetStore for LocalStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Local
    }

    fn vehicles(&self) -> Arc<dyn Repository<Vehicle>> {
        self.vehicles.clone()
    }

    fn drivers(&self) -> Arc<dyn Repository<Driver>> {
        self.drivers.clone()
    }

    fn trips(&self) -> Arc<dyn Repository<Trip>> {
        self.trips.clone()
    }

    fn fuel_logs(&self) -> Arc<dyn Repository<FuelLog>> {
        self.fuel_logs.clone()
    }

    fn maintenance_logs(&self) -> Arc<dyn Repository<MaintenanceLog>> {
        self.maintenance_logs.clone()
    }

    fn users(&self) -> Arc<dyn Repository<User>> {
        self.users.clone()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .find(|u| normalize_email(&u.email) == email))
    }

    async fn commit_trip_transition(&self, transition: &TripTransition) -> AppResult<()> {
        // Orden fijo de locks: trips -> vehicles -> drivers
        let mut trips = self.trips.lock().await;
        let mut vehicles = self.vehicles.lock().await;
        let mut drivers = self.drivers.lock().await;

        let ti = position(trips.as_slice(), transition.trip_id)?;
        let vi = position(vehicles.as_slice(), transition.vehicle_id)?;
        let di = position(drivers.as_slice(), transition.driver_id)?;

        let mut trip = trips[ti].clone();
        let mut vehicle = vehicles[vi].clone();
        let mut driver = drivers[di].clone();
        transition.apply(&mut trip, &mut vehicle, &mut driver)?;

        let previous = (trips[ti].clone(), vehicles[vi].clone(), drivers[di].clone());
        trips[ti] = trip;
        vehicles[vi] = vehicle;
        drivers[di] = driver;

        let persisted = async {
            self.trips.persist(&trips).await?;
            self.vehicles.persist(&vehicles).await?;
            self.drivers.persist(&drivers).await
        }
        .await;

        if let Err(e) = persisted {
            warn!("↩️ Transición de viaje {} revertida: {}", transition.trip_id, e);
            trips[ti] = previous.0;
            vehicles[vi] = previous.1;
            drivers[di] = previous.2;
            // Volver a escribir lo que sí llegó a disco
            if let Err(restore) = self.trips.persist(&trips).await {
                warn!("⚠️ No se pudo restaurar trips en disco: {}", restore);
            }
            if let Err(restore) = self.vehicles.persist(&vehicles).await {
                warn!("⚠️ No se pudo restaurar vehicles en disco: {}", restore);
            }
            return Err(e);
        }

        info!(
            "🚚 Viaje {} -> {} (vehículo {}, conductor {})",
            transition.trip_id,
            transition.to.as_str(),
            transition.vehicle_status.as_str(),
            transition.driver_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::{DriverPatch, NewDriver};
    use crate::models::trip::NewTrip;
    use crate::models::vehicle::NewVehicle;
    use crate::models::{DriverStatus, DutyStatus, TripStatus, VehicleStatus, VehicleType};
    use crate::utils::errors::AppError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    async fn seed(store: &LocalStore) -> (Trip, Vehicle, Driver) {
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
                license_expiry: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
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
        let trip = store
            .trips()
            .add(NewTrip {
                vehicle_id: vehicle.id,
                driver_id: driver.id,
                origin: "Warehouse A".to_string(),
                destination: "City Center".to_string(),
                cargo_weight_kg: Decimal::from(450),
                estimated_fuel_cost: None,
            })
            .await
            .unwrap();
        (trip, vehicle, driver)
    }

    #[tokio::test]
    async fn test_dispatch_commits_all_three() {
        let store = LocalStore::in_memory();
        let (trip, vehicle, driver) = seed(&store).await;

        store.commit_trip_transition(&TripTransition::dispatch(&trip)).await.unwrap();

        assert_eq!(store.trips().get(trip.id).await.unwrap().status, TripStatus::Dispatched);
        assert_eq!(store.vehicles().get(vehicle.id).await.unwrap().status, VehicleStatus::OnTrip);
        assert_eq!(store.drivers().get(driver.id).await.unwrap().status, DriverStatus::OnTrip);
    }

    #[tokio::test]
    async fn test_missing_driver_leaves_everything_untouched() {
        let store = LocalStore::in_memory();
        let (trip, vehicle, _) = seed(&store).await;

        let mut transition = TripTransition::dispatch(&trip);
        transition.driver_id = uuid::Uuid::new_v4();
        let err = store.commit_trip_transition(&transition).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(store.trips().get(trip.id).await.unwrap().status, TripStatus::Draft);
        assert_eq!(store.vehicles().get(vehicle.id).await.unwrap().status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn test_write_failure_between_steps_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), false).await.unwrap();
        let (trip, vehicle, driver) = seed(&store).await;

        // trips y vehicles se escriben bien; drivers falla
        let drivers_path = dir.path().join("drivers.json");
        std::fs::remove_file(&drivers_path).unwrap();
        std::fs::create_dir(&drivers_path).unwrap();

        let err = store
            .commit_trip_transition(&TripTransition::dispatch(&trip))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        assert_eq!(store.trips().get(trip.id).await.unwrap().status, TripStatus::Draft);
        assert_eq!(store.vehicles().get(vehicle.id).await.unwrap().status, VehicleStatus::Available);
        assert_eq!(store.drivers().get(driver.id).await.unwrap().status, DriverStatus::Available);

        // El disco tampoco conserva el viaje despachado
        let on_disk: Vec<Trip> =
            serde_json::from_slice(&std::fs::read(dir.path().join("trips.json")).unwrap()).unwrap();
        assert!(on_disk.iter().all(|t| t.status == TripStatus::Draft));
    }

    #[tokio::test]
    async fn test_complete_requires_dispatched() {
        let store = LocalStore::in_memory();
        let (trip, _, _) = seed(&store).await;
        let err = store
            .commit_trip_transition(&TripTransition::complete(&trip))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_retired_vehicle_blocks_transition() {
        let store = LocalStore::in_memory();
        let (trip, vehicle, driver) = seed(&store).await;
        store
            .vehicles()
            .update(vehicle.id, crate::models::vehicle::VehiclePatch::status(VehicleStatus::Retired))
            .await
            .unwrap();

        assert!(store.commit_trip_transition(&TripTransition::dispatch(&trip)).await.is_err());
        assert_eq!(store.trips().get(trip.id).await.unwrap().status, TripStatus::Draft);
        assert_eq!(store.drivers().get(driver.id).await.unwrap().status, DriverStatus::Available);
    }
}
