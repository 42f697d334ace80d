//! Handlers de Vehicles
//!
//! Registro de vehículos de la flota. Los listados salen de la vista en
//! caché, no del almacén.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        fleet_dto::{CreateVehicleRequest, UpdateVehicleRequest},
        ApiResponse,
    },
    middleware::auth::AuthenticatedUser,
    models::{user::Section, Role, Vehicle},
    services::analytics_service::available_vehicles,
    state::AppState,
    utils::errors::AppResult,
};

/// Roles que ven el selector de vehículos del formulario de viajes
const AVAILABLE_VEHICLE_ROLES: &[Role] = &[Role::Manager, Role::Safety, Role::Dispatcher];

pub async fn list_vehicles(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Vehicle>>> {
    user.ensure_access(Section::Fleet)?;
    Ok(Json(state.views.vehicles.snapshot().await))
}

pub async fn create_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    user.ensure_access(Section::Fleet)?;
    request.validate()?;

    let vehicle = state.views.vehicles.add(request.into()).await?;
    info!("🚐 Vehículo {} registrado por {}", vehicle.plate, user.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vehicle, "Vehicle registered".to_string())),
    ))
}

/// Vehículos disponibles para un viaje nuevo
pub async fn list_available_vehicles(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Vehicle>>> {
    user.require_roles(AVAILABLE_VEHICLE_ROLES)?;
    let vehicles = state.views.vehicles.snapshot().await;
    Ok(Json(available_vehicles(&vehicles)))
}

pub async fn update_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    user.ensure_access(Section::Fleet)?;
    request.validate()?;

    let vehicle = state.views.vehicles.update(id, request.into()).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}
