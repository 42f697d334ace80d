//! API endpoints
//!
//! Este módulo contiene los endpoints de la API. Todo cuelga de `/api`;
//! salvo registro, login y health, las rutas pasan por el middleware JWT.

pub mod analytics;
pub mod auth;
pub mod drivers;
pub mod events;
pub mod logs;
pub mod trips;
pub mod vehicles;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Crear el router de la API (sin el prefijo `/api`)
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route("/vehicles/available", get(vehicles::list_available_vehicles))
        .route("/vehicles/:id", patch(vehicles::update_vehicle))
        .route("/drivers", get(drivers::list_drivers).post(drivers::create_driver))
        .route("/drivers/eligible", get(drivers::list_eligible_drivers))
        .route("/drivers/:id", patch(drivers::update_driver))
        .route("/drivers/:id/completion-rate", get(drivers::driver_completion))
        .route("/trips", get(trips::list_trips).post(trips::create_trip))
        .route("/trips/:id/dispatch", post(trips::dispatch_trip))
        .route("/trips/:id/complete", post(trips::complete_trip))
        .route("/fuel-logs", get(logs::list_fuel_logs).post(logs::create_fuel_log))
        .route(
            "/maintenance-logs",
            get(logs::list_maintenance_logs).post(logs::create_maintenance_log),
        )
        .route("/analytics/dashboard", get(analytics::get_dashboard_summary))
        .route("/analytics/summary", get(analytics::get_financial_summary))
        .route("/analytics/export.csv", get(analytics::export_csv))
        .route("/analytics/report.txt", get(analytics::export_report))
        .route("/events", get(events::stream_changes))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.store.mode().as_str(),
        "live_updates": state.bridge.is_live(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
