//! Middleware de autenticación JWT
//!
//! Valida el bearer token de cada request protegida e inyecta el
//! [`AuthenticatedUser`] en las extensions. Los handlers deciden después
//! qué roles pueden entrar a cada sección.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    models::{user::Section, Role},
    state::AppState,
    utils::{
        errors::{AppError, AppResult},
        jwt::{extract_token_from_header, verify_token, JwtClaims},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: JwtClaims) -> AppResult<Self> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;
        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }

    /// Acceso a una sección del panel según su tabla de roles
    pub fn ensure_access(&self, section: Section) -> AppResult<()> {
        self.require_roles(section.allowed_roles())
    }

    pub fn require_roles(&self, roles: &[Role]) -> AppResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role.as_str()
            )))
        }
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, state.auth.jwt_config())?;
    let user = AuthenticatedUser::from_claims(claims)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "someone@fleetflow.io".to_string(),
            role,
        }
    }

    #[test]
    fn test_section_gating() {
        assert!(user(Role::Dispatcher).ensure_access(Section::Trips).is_ok());
        assert!(user(Role::Dispatcher).ensure_access(Section::Fleet).is_err());
        assert!(user(Role::Safety).ensure_access(Section::Fleet).is_ok());
        assert!(user(Role::Finance).ensure_access(Section::Trips).is_err());
        assert!(user(Role::Finance).ensure_access(Section::Dashboard).is_ok());
    }

    #[test]
    fn test_forbidden_error_kind() {
        let err = user(Role::Safety).require_roles(&[Role::Finance]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_bad_subject_rejected() {
        let claims = JwtClaims {
            sub: "not-a-uuid".to_string(),
            email: "a@b.io".to_string(),
            role: Role::Manager,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(
            AuthenticatedUser::from_claims(claims),
            Err(AppError::Unauthorized(_))
        ));
    }
}
