//! DTOs de la API
//!
//! Requests validadas con `validator` y respuestas serializables.

pub mod auth_dto;
pub mod fleet_dto;
pub mod log_dto;
pub mod trip_dto;

use serde::Serialize;

/// Envoltorio de respuesta para operaciones de escritura
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}
