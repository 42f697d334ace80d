//! Handlers de Analytics
//!
//! Dashboard y resumen financiero calculados sobre las vistas en caché,
//! más las dos exportaciones descargables.

use axum::{
    extract::{Extension, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::{
    middleware::auth::AuthenticatedUser,
    models::{
        analytics::{DashboardSummary, FinancialSummary},
        user::Section,
    },
    services::{
        analytics_service::{dashboard_summary, financial_summary},
        export_service::{expenses_csv, financial_report, CSV_FILENAME, REPORT_FILENAME},
    },
    state::AppState,
    utils::errors::AppResult,
};

/// Obtener resumen del dashboard
pub async fn get_dashboard_summary(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSummary>> {
    user.ensure_access(Section::Dashboard)?;
    let vehicles = state.views.vehicles.snapshot().await;
    let drivers = state.views.drivers.snapshot().await;
    let trips = state.views.trips.snapshot().await;

    Ok(Json(dashboard_summary(&vehicles, &drivers, &trips)))
}

pub async fn get_financial_summary(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<FinancialSummary>> {
    user.ensure_access(Section::Finance)?;
    Ok(Json(current_financial_summary(&state).await))
}

/// CSV de gastos
pub async fn export_csv(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    user.ensure_access(Section::Finance)?;
    let vehicles = state.views.vehicles.snapshot().await;
    let fuel_logs = state.views.fuel_logs.snapshot().await;
    let maintenance_logs = state.views.maintenance_logs.snapshot().await;

    let body = expenses_csv(&vehicles, &fuel_logs, &maintenance_logs);
    info!("📤 {} exportó {}", user.email, CSV_FILENAME);
    Ok(attachment("text/csv; charset=utf-8", CSV_FILENAME, body))
}

/// Reporte financiero en texto plano
pub async fn export_report(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    user.ensure_access(Section::Finance)?;
    let summary = current_financial_summary(&state).await;

    let body = financial_report(&summary, Utc::now());
    info!("📤 {} exportó {}", user.email, REPORT_FILENAME);
    Ok(attachment("text/plain; charset=utf-8", REPORT_FILENAME, body))
}

async fn current_financial_summary(state: &AppState) -> FinancialSummary {
    let vehicles = state.views.vehicles.snapshot().await;
    let trips = state.views.trips.snapshot().await;
    let fuel_logs = state.views.fuel_logs.snapshot().await;
    let maintenance_logs = state.views.maintenance_logs.snapshot().await;
    financial_summary(&vehicles, &trips, &fuel_logs, &maintenance_logs)
}

fn attachment(content_type: &str, filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response()
}
