//! Modelos de Analytics
//!
//! Estructuras de salida del agregador: resúmenes del dashboard,
//! series de gasto y rankings por vehículo.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Trip;

/// Gasto de un día, separado por categoría
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBucket {
    pub date: NaiveDate,
    pub fuel: Decimal,
    pub maintenance: Decimal,
}

/// Coste acumulado de mantenimiento de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleCost {
    pub vehicle_id: Uuid,
    /// Matrícula, o "Unknown" si el vehículo ya no existe
    pub label: String,
    pub cost: Decimal,
}

/// Distribución de la flota por estado
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatusBreakdown {
    pub available: usize,
    pub on_trip: usize,
    pub in_shop: usize,
    pub retired: usize,
}

/// Resumen para dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub active_vehicles: usize,
    pub available_drivers: usize,
    pub trips_completed: usize,
    pub vehicles_in_shop: usize,
    pub pending_trips: usize,
    pub utilization_rate: u32,
    pub recent_trips: Vec<Trip>,
}

/// Resumen financiero para la página de analytics y las exportaciones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
    pub total_fleet_expenses: Decimal,
    pub utilization_rate: u32,
    pub total_trips: usize,
    pub completed_trips: usize,
    pub status_breakdown: VehicleStatusBreakdown,
    pub costliest_vehicles: Vec<VehicleCost>,
    pub expense_timeline: Vec<ExpenseBucket>,
}
