//! Handlers de autenticación
//!
//! Registro, login y datos del usuario de la sesión actual.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    dto::{
        auth_dto::{AuthResponse, LoginRequest, RegisterRequest, UserInfo},
        ApiResponse,
    },
    middleware::auth::AuthenticatedUser,
    state::AppState,
    utils::errors::AppResult,
};

/// Registrar un usuario del panel
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    request.validate()?;
    let session = state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(session, "User registered".to_string())),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    request.validate()?;
    let session = state.auth.login(request).await?;
    Ok(Json(session))
}

/// Usuario de la sesión, con las secciones que su rol puede ver
pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserInfo>> {
    let record = state.store.users().get(user.user_id).await?;
    Ok(Json(UserInfo::from(&record)))
}
