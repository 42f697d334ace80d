//! Flota de demostración para el modo local
//!
//! Mismos registros que usaba el panel en modo demo, con ids estables
//! para que las referencias cruzadas se resuelvan.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::trip::format_ref_id;
use crate::models::{
    Driver, DriverStatus, DutyStatus, FuelLog, MaintenanceLog, Trip, TripStatus, Vehicle, VehicleStatus,
    VehicleType,
};

#[derive(Debug, Default)]
pub struct DemoFleet {
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub trips: Vec<Trip>,
    pub fuel_logs: Vec<FuelLog>,
    pub maintenance_logs: Vec<MaintenanceLog>,
}

fn demo_id(n: u128) -> Uuid {
    Uuid::from_u128(0x0f1e_e7f1_0000_4000_8000_0000_0000_0000 | n)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn money(units: i64, cents: u32) -> Decimal {
    Decimal::new(units * 100 + i64::from(cents), 2)
}

impl DemoFleet {
    pub fn build() -> Self {
        let base: DateTime<Utc> = Utc::now();
        let at = |minutes_ago: i64| base - Duration::minutes(minutes_ago);

        let vehicle = |n: u128, name: &str, t: VehicleType, plate: &str, cap: i64, odo: i64, status, roi: i64| Vehicle {
            id: demo_id(0x100 + n),
            name: name.to_string(),
            plate: plate.to_string(),
            vehicle_type: t,
            capacity_kg: Decimal::from(cap),
            odometer_km: Decimal::from(odo),
            status,
            roi_cost: Decimal::from(roi),
            created_at: at(n as i64 * 10),
        };
        let vehicles = vec![
            vehicle(1, "Ford Transit", VehicleType::Van, "VAN-0921", 800, 45_200, VehicleStatus::Available, 12_500),
            vehicle(2, "Volvo FH16", VehicleType::Truck, "TRK-5542", 20_000, 125_000, VehicleStatus::OnTrip, 45_000),
            vehicle(3, "Mercedes Sprinter", VehicleType::Van, "VAN-1120", 1_200, 82_000, VehicleStatus::InShop, 18_200),
            vehicle(4, "Honda Activa", VehicleType::Bike, "BK-9901", 50, 12_500, VehicleStatus::Available, 450),
            vehicle(5, "Isuzu NNR", VehicleType::Truck, "TRK-2210", 4_500, 210_000, VehicleStatus::Retired, 89_000),
        ];

        let driver = |n: u128, name: &str, expiry: NaiveDate, license: &str, status, duty, score: i32, phone: &str| Driver {
            id: demo_id(0x200 + n),
            full_name: name.to_string(),
            phone: phone.to_string(),
            license_expiry: expiry,
            license_type: license.to_string(),
            status,
            duty_status: duty,
            safety_score: score,
            created_at: at(n as i64 * 10),
        };
        let drivers = vec![
            driver(1, "Alex Mercer", date(2026, 10, 15), "Truck", DriverStatus::Available, DutyStatus::OnDuty, 98, "+1234567890"),
            driver(2, "Sarah Connor", date(2025, 5, 22), "Van", DriverStatus::OnTrip, DutyStatus::OnDuty, 100, "+1987654321"),
            driver(3, "John Smith", date(2024, 3, 1), "Truck", DriverStatus::Available, DutyStatus::Suspended, 65, "+1122334455"),
            driver(4, "Emily Davis", date(2024, 11, 10), "Bike", DriverStatus::Available, DutyStatus::OffDuty, 92, "+1555666777"),
        ];

        let trip = |n: u128, counter: u64, v: u128, d: u128, origin: &str, dest: &str, cargo: i64, status| Trip {
            id: demo_id(0x300 + n),
            ref_id: format_ref_id(counter),
            vehicle_id: demo_id(0x100 + v),
            driver_id: demo_id(0x200 + d),
            origin: origin.to_string(),
            destination: dest.to_string(),
            cargo_weight_kg: Decimal::from(cargo),
            estimated_fuel_cost: None,
            status,
            created_at: at(100 - n as i64),
        };
        let trips = vec![
            trip(1, 42, 1, 1, "Warehouse A", "City Center", 450, TripStatus::Dispatched),
            trip(2, 43, 2, 2, "Port B", "Distribution Node", 1_200, TripStatus::Draft),
            trip(3, 44, 1, 1, "Store 1", "Customer X", 15, TripStatus::Completed),
        ];

        let fuel = |n: u128, v: u128, t: Option<u128>, gallons: Decimal, cost: Decimal, d: NaiveDate, station: &str| FuelLog {
            id: demo_id(0x400 + n),
            vehicle_id: demo_id(0x100 + v),
            trip_id: t.map(|t| demo_id(0x300 + t)),
            date: d,
            gallons,
            cost,
            station: station.to_string(),
            created_at: base,
        };
        let fuel_logs = vec![
            fuel(1, 1, Some(1), money(15, 50), money(45, 50), date(2026, 2, 21), "Shell Central"),
            fuel(2, 2, Some(2), money(80, 0), money(240, 0), date(2026, 2, 20), "Love's Travel Stop"),
            fuel(3, 1, None, money(12, 0), money(36, 0), date(2026, 2, 18), "BP Express"),
        ];

        let maintenance = |n: u128, v: u128, description: &str, cost: i64, d: NaiveDate| MaintenanceLog {
            id: demo_id(0x500 + n),
            vehicle_id: demo_id(0x100 + v),
            date: d,
            description: description.to_string(),
            cost: Decimal::from(cost),
            created_at: base,
        };
        let maintenance_logs = vec![
            maintenance(1, 1, "Oil Change & Brake Inspection", 1_250, date(2026, 10, 15)),
            maintenance(2, 3, "Engine Overhaul & Transmission check", 45_000, date(2026, 10, 10)),
            maintenance(3, 2, "Tire Replacement (All 6)", 18_000, date(2026, 9, 28)),
        ];

        Self {
            vehicles,
            drivers,
            trips,
            fuel_logs,
            maintenance_logs,
        }
    }
}
