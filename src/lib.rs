//! FleetFlow backend
//!
//! API de operaciones de flota: registro de vehículos y conductores,
//! despacho de viajes, registros de gasto y analytics. El almacén puede
//! ser local (memoria / JSON) o PostgreSQL en vivo.

pub mod api;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .nest("/api", api::create_api_router(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
