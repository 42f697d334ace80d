//! Servicio de autenticación
//!
//! Alta e inicio de sesión de usuarios del panel. Las contraseñas sólo
//! existen como hash bcrypt; la comparación la hace `bcrypt::verify`.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use tracing::{info, warn};

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use crate::models::user::NewUser;
use crate::models::User;
use crate::repositories::SharedStore;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

#[derive(Clone)]
pub struct AuthService {
    store: SharedStore,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: SharedStore, jwt: JwtConfig) -> Self {
        Self {
            store,
            jwt,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    /// Coste de bcrypt más bajo para tests
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let password = request.password;
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .store
            .users()
            .add(NewUser {
                email: request.email,
                full_name: request.full_name,
                role: request.role,
                password_hash,
            })
            .await?;

        info!("👤 Usuario {} registrado como {}", user.email, user.role.as_str());
        self.session_for(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = match self.store.find_user_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                warn!("🔒 Login fallido para {}", request.email);
                return Err(invalid());
            }
        };

        let password = request.password;
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !matches {
            warn!("🔒 Login fallido para {}", user.email);
            return Err(invalid());
        }

        info!("🔑 Sesión iniciada: {}", user.email);
        self.session_for(&user)
    }

    fn session_for(&self, user: &User) -> AppResult<AuthResponse> {
        let token = generate_token(user.id, &user.email, user.role, Utc::now(), &self.jwt)?;
        Ok(AuthResponse {
            token,
            expires_in: self.jwt.expiration,
            user: UserInfo::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::repositories::LocalStore;
    use crate::utils::jwt::verify_token;
    use std::sync::Arc;

    fn service() -> AuthService {
        let jwt = JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        };
        AuthService::new(Arc::new(LocalStore::in_memory()), jwt).with_bcrypt_cost(4)
    }

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            full_name: "Fleet Manager".to_string(),
            password: "correct-horse".to_string(),
            role: Role::Manager,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let registered = service.register(register("manager@fleetflow.io")).await.unwrap();
        assert_eq!(registered.user.role, Role::Manager);

        let session = service
            .login(LoginRequest {
                email: "Manager@FleetFlow.io".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        let claims = verify_token(&session.token, service.jwt_config()).unwrap();
        assert_eq!(claims.sub, registered.user.id.to_string());
    }

    #[tokio::test]
    async fn test_password_is_never_stored_in_plaintext() {
        let service = service();
        service.register(register("safety@fleetflow.io")).await.unwrap();
        let user = service.store.find_user_by_email("safety@fleetflow.io").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "correct-horse");
        assert!(user.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_duplicate_email() {
        let service = service();
        service.register(register("finance@fleetflow.io")).await.unwrap();

        let err = service
            .login(LoginRequest {
                email: "finance@fleetflow.io".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = service.register(register("FINANCE@fleetflow.io")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
