//! Escenario completo de despacho sobre el almacén local, sin HTTP

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use fleetflow_backend::{
    models::{
        driver::{DriverPatch, NewDriver},
        trip::NewTrip,
        vehicle::NewVehicle,
        DriverStatus, DutyStatus, TripStatus, VehicleStatus, VehicleType,
    },
    realtime::{ChangeBridge, FleetViews},
    repositories::{FleetStore, LocalStore, SharedStore},
    services::{
        analytics_service::{available_vehicles, driver_completion_rate, eligible_drivers, fleet_utilization},
        DispatchService,
    },
};

#[tokio::test]
async fn test_create_dispatch_complete_scenario() {
    let store: SharedStore = Arc::new(LocalStore::in_memory());
    let views = FleetViews::open(&store, &ChangeBridge::inert()).await.unwrap();
    let dispatch = DispatchService::new(store.clone());
    let now = Utc::now();

    let vehicle = views
        .vehicles
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
    let driver = views
        .drivers
        .add(NewDriver {
            full_name: "Alex Mercer".to_string(),
            phone: "+1234567890".to_string(),
            license_expiry: (now + Duration::days(365)).date_naive(),
            license_type: "Van".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(driver.duty_status, DutyStatus::OffDuty);
    assert!(eligible_drivers(&views.drivers.snapshot().await, now).is_empty());

    views
        .drivers
        .update(
            driver.id,
            DriverPatch {
                duty_status: Some(DutyStatus::OnDuty),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(eligible_drivers(&views.drivers.snapshot().await, now).len(), 1);

    let trip = dispatch
        .create_trip(
            NewTrip {
                vehicle_id: vehicle.id,
                driver_id: driver.id,
                origin: "Warehouse A".to_string(),
                destination: "City Center".to_string(),
                cargo_weight_kg: Decimal::from(450),
                estimated_fuel_cost: None,
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(trip.status, TripStatus::Draft);
    assert_eq!(trip.ref_id, "TRP-0046");
    views.refresh_dispatch().await.unwrap();
    assert_eq!(views.trips.snapshot().await.len(), 1);

    dispatch.dispatch(trip.id).await.unwrap();
    views.refresh_dispatch().await.unwrap();
    let vehicles = views.vehicles.snapshot().await;
    let drivers = views.drivers.snapshot().await;
    assert_eq!(vehicles[0].status, VehicleStatus::OnTrip);
    assert_eq!(drivers[0].status, DriverStatus::OnTrip);
    assert!(available_vehicles(&vehicles).is_empty());
    assert!(eligible_drivers(&drivers, now).is_empty());
    assert_eq!(fleet_utilization(&vehicles), 100);

    dispatch.complete(trip.id).await.unwrap();
    views.refresh_dispatch().await.unwrap();
    let vehicles = views.vehicles.snapshot().await;
    let drivers = views.drivers.snapshot().await;
    let trips = views.trips.snapshot().await;
    assert_eq!(trips[0].status, TripStatus::Completed);
    assert_eq!(available_vehicles(&vehicles).len(), 1);
    assert_eq!(eligible_drivers(&drivers, now).len(), 1);
    assert_eq!(driver_completion_rate(driver.id, &trips), 100);
    assert_eq!(fleet_utilization(&vehicles), 0);
}

#[tokio::test]
async fn test_persistent_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = LocalStore::open(dir.path(), true).await.unwrap();
        assert_eq!(store.vehicles().list().await.unwrap().len(), 5);
        store
            .vehicles()
            .add(NewVehicle {
                name: "Tata Ace".to_string(),
                plate: "VAN-7781".to_string(),
                vehicle_type: VehicleType::Van,
                capacity_kg: Decimal::from(750),
                odometer_km: None,
                roi_cost: None,
            })
            .await
            .unwrap();
    }

    // Con blobs ya escritos la semilla demo no se vuelve a aplicar
    let reopened = LocalStore::open(dir.path(), true).await.unwrap();
    let vehicles = reopened.vehicles().list().await.unwrap();
    assert_eq!(vehicles.len(), 6);
    assert_eq!(vehicles[0].plate, "VAN-7781");
    assert_eq!(reopened.trips().list().await.unwrap().len(), 3);
}
