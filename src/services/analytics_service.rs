//! Agregador de vistas derivadas
//!
//! Funciones puras sobre listas ya cargadas. Ninguna lee el reloj: quien
//! necesite la fecha actual la recibe como parámetro. El resultado no
//! depende del orden de entrada.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::analytics::{
    DashboardSummary, ExpenseBucket, FinancialSummary, VehicleCost, VehicleStatusBreakdown,
};
use crate::models::{
    sort_for_listing, Driver, DriverStatus, FuelLog, MaintenanceLog, Trip, TripStatus, Vehicle, VehicleStatus,
};

/// Días que muestra la serie de gastos
pub const EXPENSE_TIMELINE_DAYS: usize = 14;
/// Vehículos en el ranking de coste
pub const COSTLIEST_VEHICLES: usize = 5;
/// Viajes recientes en el dashboard
pub const RECENT_TRIPS: usize = 5;

/// Etiqueta de un vehículo que ya no existe
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Porcentaje entero redondeando .5 hacia arriba
fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * part + total) / (2 * total)) as u32
}

/// % de vehículos en ruta; 0 con la flota vacía
pub fn fleet_utilization(vehicles: &[Vehicle]) -> u32 {
    let on_trip = vehicles.iter().filter(|v| v.status == VehicleStatus::OnTrip).count();
    percent(on_trip, vehicles.len())
}

pub fn total_fuel_cost(fuel_logs: &[FuelLog]) -> Decimal {
    fuel_logs.iter().map(|l| l.cost).sum()
}

pub fn total_maintenance_cost(maintenance_logs: &[MaintenanceLog]) -> Decimal {
    maintenance_logs.iter().map(|l| l.cost).sum()
}

pub fn grand_total(fuel_logs: &[FuelLog], maintenance_logs: &[MaintenanceLog]) -> Decimal {
    total_fuel_cost(fuel_logs) + total_maintenance_cost(maintenance_logs)
}

/// Matrícula del vehículo, o "Unknown"
pub fn vehicle_label(vehicles: &[Vehicle], id: Uuid) -> String {
    vehicles
        .iter()
        .find(|v| v.id == id)
        .map(|v| v.plate.clone())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Los `n` vehículos con más gasto de mantenimiento.
///
/// Empates por etiqueta y después por id, para que el orden sea estable.
pub fn costliest_vehicles(
    maintenance_logs: &[MaintenanceLog],
    vehicles: &[Vehicle],
    n: usize,
) -> Vec<VehicleCost> {
    let mut by_vehicle: HashMap<Uuid, Decimal> = HashMap::new();
    for log in maintenance_logs {
        *by_vehicle.entry(log.vehicle_id).or_insert(Decimal::ZERO) += log.cost;
    }

    let mut ranking: Vec<VehicleCost> = by_vehicle
        .into_iter()
        .map(|(vehicle_id, cost)| VehicleCost {
            vehicle_id,
            label: vehicle_label(vehicles, vehicle_id),
            cost,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.cost
            .cmp(&a.cost)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
    });
    ranking.truncate(n);
    ranking
}

fn bucket_for(buckets: &mut BTreeMap<NaiveDate, ExpenseBucket>, date: NaiveDate) -> &mut ExpenseBucket {
    buckets.entry(date).or_insert(ExpenseBucket {
        date,
        fuel: Decimal::ZERO,
        maintenance: Decimal::ZERO,
    })
}

/// Gasto diario (combustible y mantenimiento), ascendente, últimas 14 fechas
pub fn expense_timeline(fuel_logs: &[FuelLog], maintenance_logs: &[MaintenanceLog]) -> Vec<ExpenseBucket> {
    let mut buckets: BTreeMap<NaiveDate, ExpenseBucket> = BTreeMap::new();
    for log in fuel_logs {
        bucket_for(&mut buckets, log.date).fuel += log.cost;
    }
    for log in maintenance_logs {
        bucket_for(&mut buckets, log.date).maintenance += log.cost;
    }

    let all: Vec<ExpenseBucket> = buckets.into_values().collect();
    let skip = all.len().saturating_sub(EXPENSE_TIMELINE_DAYS);
    all.into_iter().skip(skip).collect()
}

/// % de viajes completados del conductor; 100 si no tiene viajes
pub fn driver_completion_rate(driver_id: Uuid, trips: &[Trip]) -> u32 {
    let (total, completed) = trips
        .iter()
        .filter(|t| t.driver_id == driver_id)
        .fold((0, 0), |(total, completed), t| {
            (total + 1, completed + usize::from(t.status == TripStatus::Completed))
        });
    if total == 0 {
        return 100;
    }
    percent(completed, total)
}

/// Conductores que se pueden asignar a un viaje nuevo
pub fn eligible_drivers(drivers: &[Driver], now: DateTime<Utc>) -> Vec<Driver> {
    drivers.iter().filter(|d| d.is_eligible(now)).cloned().collect()
}

pub fn available_vehicles(vehicles: &[Vehicle]) -> Vec<Vehicle> {
    vehicles
        .iter()
        .filter(|v| v.status == VehicleStatus::Available)
        .cloned()
        .collect()
}

pub fn vehicle_status_breakdown(vehicles: &[Vehicle]) -> VehicleStatusBreakdown {
    vehicles.iter().fold(VehicleStatusBreakdown::default(), |mut acc, v| {
        match v.status {
            VehicleStatus::Available => acc.available += 1,
            VehicleStatus::OnTrip => acc.on_trip += 1,
            VehicleStatus::InShop => acc.in_shop += 1,
            VehicleStatus::Retired => acc.retired += 1,
        }
        acc
    })
}

fn count_trips(trips: &[Trip], status: TripStatus) -> usize {
    trips.iter().filter(|t| t.status == status).count()
}

pub fn dashboard_summary(vehicles: &[Vehicle], drivers: &[Driver], trips: &[Trip]) -> DashboardSummary {
    let breakdown = vehicle_status_breakdown(vehicles);

    let mut recent_trips = trips.to_vec();
    sort_for_listing(&mut recent_trips);
    recent_trips.truncate(RECENT_TRIPS);

    DashboardSummary {
        active_vehicles: breakdown.on_trip,
        available_drivers: drivers
            .iter()
            .filter(|d| d.status == DriverStatus::Available)
            .count(),
        trips_completed: count_trips(trips, TripStatus::Completed),
        vehicles_in_shop: breakdown.in_shop,
        pending_trips: count_trips(trips, TripStatus::Draft),
        utilization_rate: fleet_utilization(vehicles),
        recent_trips,
    }
}

pub fn financial_summary(
    vehicles: &[Vehicle],
    trips: &[Trip],
    fuel_logs: &[FuelLog],
    maintenance_logs: &[MaintenanceLog],
) -> FinancialSummary {
    let total_fuel_cost = total_fuel_cost(fuel_logs);
    let total_maintenance_cost = total_maintenance_cost(maintenance_logs);

    FinancialSummary {
        total_fuel_cost,
        total_maintenance_cost,
        total_fleet_expenses: total_fuel_cost + total_maintenance_cost,
        utilization_rate: fleet_utilization(vehicles),
        total_trips: trips.len(),
        completed_trips: count_trips(trips, TripStatus::Completed),
        status_breakdown: vehicle_status_breakdown(vehicles),
        costliest_vehicles: costliest_vehicles(maintenance_logs, vehicles, COSTLIEST_VEHICLES),
        expense_timeline: expense_timeline(fuel_logs, maintenance_logs),
    }
}
