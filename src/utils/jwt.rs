//! Utilidades JWT
//!
//! Este módulo contiene funciones helper para emitir y validar los tokens
//! de sesión del panel.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::environment::EnvironmentConfig, models::Role, utils::errors::AppError};

/// Claims del JWT token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    pub sub: String,   // user_id
    pub email: String,
    pub role: Role,
    pub exp: usize,    // expiration timestamp
    pub iat: usize,    // issued at timestamp
}

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Generar JWT token para un usuario
pub fn generate_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    now: DateTime<Utc>,
    config: &JwtConfig,
) -> Result<String, AppError> {
    let expires_at = now + Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::Jwt(format!("Token inválido: {}", e)))?;

    Ok(token_data.claims)
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token must not be empty".to_string()));
    }

    Ok(token)
}
