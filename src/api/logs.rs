//! Handlers de registros de combustible y mantenimiento

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        log_dto::{CreateFuelLogRequest, CreateMaintenanceLogRequest},
        ApiResponse,
    },
    middleware::auth::AuthenticatedUser,
    models::{user::Section, vehicle::VehiclePatch, FuelLog, MaintenanceLog, VehicleStatus},
    state::AppState,
    utils::errors::AppResult,
};

pub async fn list_fuel_logs(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FuelLog>>> {
    user.ensure_access(Section::Finance)?;
    Ok(Json(state.views.fuel_logs.snapshot().await))
}

pub async fn create_fuel_log(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateFuelLogRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<FuelLog>>)> {
    user.ensure_access(Section::Finance)?;
    request.validate()?;

    let log = state.views.fuel_logs.add(request.into()).await?;
    info!("⛽ Repostaje registrado: {} ({})", log.cost, log.date);

    Ok((StatusCode::CREATED, Json(ApiResponse::success(log))))
}

pub async fn list_maintenance_logs(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MaintenanceLog>>> {
    user.ensure_access(Section::Finance)?;
    Ok(Json(state.views.maintenance_logs.snapshot().await))
}

pub async fn create_maintenance_log(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceLogRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MaintenanceLog>>)> {
    user.ensure_access(Section::Finance)?;
    request.validate()?;

    let mark_in_shop = request.mark_in_shop;
    if mark_in_shop {
        // Validar antes de registrar para no dejar un log huérfano
        state.store.vehicles().get(request.vehicle_id).await?.ensure_can_enter_shop()?;
    }

    let log = state.views.maintenance_logs.add(request.into()).await?;
    info!("🔧 Mantenimiento registrado: {} ({})", log.description, log.cost);

    if mark_in_shop {
        let vehicle = state
            .views
            .vehicles
            .update(log.vehicle_id, VehiclePatch::status(VehicleStatus::InShop))
            .await?;
        info!("🛠️ Vehículo {} enviado al taller", vehicle.plate);
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::success(log))))
}
