//! Handlers de Trips
//!
//! Formulario "New Dispatch" y las transiciones dispatch / complete. Tras
//! cada cambio se releen viajes, vehículos y conductores para que los
//! selectores del formulario queden al día.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{trip_dto::CreateTripRequest, ApiResponse},
    middleware::auth::AuthenticatedUser,
    models::{user::Section, Role, Trip},
    state::AppState,
    utils::errors::AppResult,
};

/// Finanzas consulta los viajes pero no los gestiona
const TRIP_READER_ROLES: &[Role] = &[Role::Manager, Role::Dispatcher, Role::Finance];

pub async fn list_trips(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Trip>>> {
    user.require_roles(TRIP_READER_ROLES)?;
    Ok(Json(state.views.trips.snapshot().await))
}

pub async fn create_trip(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Trip>>)> {
    user.ensure_access(Section::Trips)?;
    request.validate()?;

    let trip = state.dispatch.create_trip(request.into(), Utc::now()).await?;
    refresh_after_transition(&state).await;

    let message = format!("Trip {} created as draft", trip.ref_id);
    Ok((StatusCode::CREATED, Json(ApiResponse::success_with_message(trip, message))))
}

pub async fn dispatch_trip(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Trip>>> {
    user.ensure_access(Section::Trips)?;

    let trip = state.dispatch.dispatch(id).await?;
    refresh_after_transition(&state).await;
    info!("🚚 {} despachó {}", user.email, trip.ref_id);

    let message = format!("Trip {} dispatched", trip.ref_id);
    Ok(Json(ApiResponse::success_with_message(trip, message)))
}

pub async fn complete_trip(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Trip>>> {
    user.ensure_access(Section::Trips)?;

    let trip = state.dispatch.complete(id).await?;
    refresh_after_transition(&state).await;
    info!("🏁 {} completó {}", user.email, trip.ref_id);

    let message = format!("Trip {} completed", trip.ref_id);
    Ok(Json(ApiResponse::success_with_message(trip, message)))
}

/// El cambio ya está confirmado en el almacén
async fn refresh_after_transition(state: &AppState) {
    if let Err(e) = state.views.refresh_dispatch().await {
        warn!("⚠️ Vistas de despacho sin refrescar: {}", e);
    }
}
