//! Exportaciones del resumen financiero
//!
//! CSV de gastos y reporte en texto plano, a partir de las mismas listas
//! que usa el agregador.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::analytics_service::{total_fuel_cost, total_maintenance_cost, vehicle_label};
use crate::models::analytics::FinancialSummary;
use crate::models::{FuelLog, MaintenanceLog, Vehicle};

pub const CSV_FILENAME: &str = "FleetFlow_Financial_Summary.csv";
pub const REPORT_FILENAME: &str = "FleetFlow_Financial_Report.txt";

const RULE: &str = "========================================";

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Gastos línea a línea: primero combustible, luego mantenimiento, y totales al final
pub fn expenses_csv(vehicles: &[Vehicle], fuel_logs: &[FuelLog], maintenance_logs: &[MaintenanceLog]) -> String {
    let fuel_total = total_fuel_cost(fuel_logs);
    let maintenance_total = total_maintenance_cost(maintenance_logs);

    let mut rows: Vec<String> = Vec::with_capacity(fuel_logs.len() + maintenance_logs.len() + 5);
    rows.push("Date,Vehicle,Type,Cost (INR)".to_string());
    for log in fuel_logs {
        rows.push(format!(
            "{},{},Fuel,{}",
            log.date.format("%Y-%m-%d"),
            vehicle_label(vehicles, log.vehicle_id),
            money(log.cost)
        ));
    }
    for log in maintenance_logs {
        rows.push(format!(
            "{},{},Maintenance,{}",
            log.date.format("%Y-%m-%d"),
            vehicle_label(vehicles, log.vehicle_id),
            money(log.cost)
        ));
    }
    rows.push(String::new());
    rows.push(format!(",,Fuel Total,{}", money(fuel_total)));
    rows.push(format!(",,Maintenance Total,{}", money(maintenance_total)));
    rows.push(format!(",,Grand Total,{}", money(fuel_total + maintenance_total)));
    rows.join("\n")
}

pub fn financial_report(summary: &FinancialSummary, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "FLEETFLOW FINANCIAL SUMMARY REPORT".to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        RULE.to_string(),
        format!("Total Fuel Cost:        INR {}", money(summary.total_fuel_cost)),
        format!("Total Maintenance:      INR {}", money(summary.total_maintenance_cost)),
        format!("Total Fleet Expenses:   INR {}", money(summary.total_fleet_expenses)),
        format!("Utilization Rate:       {}%", summary.utilization_rate),
        format!("Total Trips:            {}", summary.total_trips),
        format!("Completed Trips:        {}", summary.completed_trips),
        RULE.to_string(),
        "TOP COSTLIEST VEHICLES (MAINTENANCE)".to_string(),
    ];
    if summary.costliest_vehicles.is_empty() {
        lines.push("(no maintenance recorded)".to_string());
    }
    for (i, vehicle) in summary.costliest_vehicles.iter().enumerate() {
        lines.push(format!("{}. {} - INR {}", i + 1, vehicle.label, money(vehicle.cost)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics_service::financial_summary;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn test_csv_layout() {
        let van_id = Uuid::new_v4();
        let vehicles = vec![Vehicle {
            id: van_id,
            name: "Ford Transit".to_string(),
            plate: "VAN-0921".to_string(),
            vehicle_type: crate::models::VehicleType::Van,
            capacity_kg: Decimal::from(800),
            odometer_km: Decimal::ZERO,
            status: crate::models::VehicleStatus::Available,
            roi_cost: Decimal::ZERO,
            created_at: Utc::now(),
        }];
        let fuel_logs = vec![FuelLog {
            id: Uuid::new_v4(),
            vehicle_id: van_id,
            trip_id: None,
            date: NaiveDate::from_ymd_opt(2026, 2, 21).unwrap(),
            gallons: Decimal::new(155, 1),
            cost: Decimal::new(455, 1),
            station: "Shell Central".to_string(),
            created_at: Utc::now(),
        }];
        let maintenance_logs = vec![MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            description: "Engine Overhaul".to_string(),
            cost: Decimal::from(45_000),
            created_at: Utc::now(),
        }];

        let csv = expenses_csv(&vehicles, &fuel_logs, &maintenance_logs);
        assert_eq!(
            csv,
            "Date,Vehicle,Type,Cost (INR)\n\
             2026-02-21,VAN-0921,Fuel,45.50\n\
             2026-10-10,Unknown,Maintenance,45000.00\n\
             \n\
             ,,Fuel Total,45.50\n\
             ,,Maintenance Total,45000.00\n\
             ,,Grand Total,45045.50"
        );
    }

    #[test]
    fn test_report_on_empty_fleet() {
        let summary = financial_summary(&[], &[], &[], &[]);
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let report = financial_report(&summary, at);
        assert!(report.starts_with("FLEETFLOW FINANCIAL SUMMARY REPORT\nGenerated: 2026-10-18 09:30:00 UTC"));
        assert!(report.contains("Utilization Rate:       0%"));
        assert!(report.contains("Total Fleet Expenses:   INR 0.00"));
        assert!(report.ends_with("(no maintenance recorded)"));
    }
}
