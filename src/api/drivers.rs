//! Handlers de Drivers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        fleet_dto::{CompletionRateResponse, CreateDriverRequest, UpdateDriverRequest},
        ApiResponse,
    },
    middleware::auth::AuthenticatedUser,
    models::{user::Section, Driver, Role},
    services::analytics_service::{driver_completion_rate, eligible_drivers},
    state::AppState,
    utils::errors::AppResult,
};

const ELIGIBLE_DRIVER_ROLES: &[Role] = &[Role::Manager, Role::Safety, Role::Dispatcher];

pub async fn list_drivers(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Driver>>> {
    user.ensure_access(Section::Fleet)?;
    Ok(Json(state.views.drivers.snapshot().await))
}

pub async fn create_driver(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Driver>>)> {
    user.ensure_access(Section::Fleet)?;
    request.validate()?;

    let driver = state.views.drivers.add(request.into()).await?;
    info!("🧑‍✈️ Conductor {} dado de alta por {}", driver.full_name, user.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(driver, "Driver registered".to_string())),
    ))
}

/// Conductores que pueden recibir un viaje ahora mismo
pub async fn list_eligible_drivers(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Driver>>> {
    user.require_roles(ELIGIBLE_DRIVER_ROLES)?;
    let drivers = state.views.drivers.snapshot().await;
    Ok(Json(eligible_drivers(&drivers, Utc::now())))
}

pub async fn update_driver(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverRequest>,
) -> AppResult<Json<ApiResponse<Driver>>> {
    user.ensure_access(Section::Fleet)?;
    request.validate()?;

    let driver = state.views.drivers.update(id, request.into()).await?;
    Ok(Json(ApiResponse::success(driver)))
}

pub async fn driver_completion(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CompletionRateResponse>> {
    user.ensure_access(Section::Fleet)?;
    let driver = state.store.drivers().get(id).await?;
    let trips = state.views.trips.snapshot().await;

    Ok(Json(CompletionRateResponse {
        driver_id: driver.id,
        completion_rate: driver_completion_rate(driver.id, &trips),
    }))
}
