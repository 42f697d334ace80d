//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    /// Código HTTP asociado al error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                ErrorResponse::new(
                    "Database Error",
                    "An error occurred while accessing the database".to_string(),
                    "DB_ERROR",
                )
                .with_details(json!({ "sql_error": e.to_string() }))
            }

            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                ErrorResponse::new(
                    "Validation Error",
                    "The provided data is invalid".to_string(),
                    "VALIDATION_ERROR",
                )
                .with_details(json!(e))
            }

            AppError::Unauthorized(msg) => {
                warn!("🔒 Unauthorized access: {}", msg);
                ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED")
            }

            AppError::Forbidden(msg) => {
                warn!("🚫 Forbidden access: {}", msg);
                ErrorResponse::new("Forbidden", msg, "FORBIDDEN")
            }

            AppError::NotFound(msg) => {
                warn!("🔍 Resource not found: {}", msg);
                ErrorResponse::new("Not Found", msg, "NOT_FOUND")
            }

            AppError::Conflict(msg) => {
                warn!("⚠️ Conflict: {}", msg);
                ErrorResponse::new("Conflict", msg, "CONFLICT")
            }

            AppError::BadRequest(msg) => {
                warn!("⚠️ Bad request: {}", msg);
                ErrorResponse::new("Bad Request", msg, "BAD_REQUEST")
            }

            AppError::Storage(msg) => {
                error!("💾 Storage error: {}", msg);
                ErrorResponse::new(
                    "Storage Error",
                    "The change could not be persisted".to_string(),
                    "STORAGE_ERROR",
                )
                .with_details(json!({ "storage_error": msg }))
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                ErrorResponse::new(
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    "INTERNAL_ERROR",
                )
                .with_details(json!({ "internal_error": msg }))
            }

            AppError::Jwt(msg) => {
                warn!("🔒 JWT error: {}", msg);
                ErrorResponse::new("JWT Error", msg, "JWT_ERROR")
            }

            AppError::Hash(msg) => {
                error!("❌ Hash error: {}", msg);
                ErrorResponse::new(
                    "Hash Error",
                    "An error occurred while processing credentials".to_string(),
                    "HASH_ERROR",
                )
                .with_details(json!({ "hash_error": msg }))
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Traduce violaciones de unicidad de PostgreSQL (23505) a conflictos
pub fn map_unique_violation(e: sqlx::Error, resource: &str, field: &str, value: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            conflict_error(resource, field, value)
        }
        _ => AppError::Database(e),
    }
}
