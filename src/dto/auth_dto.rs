use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::Section;
use crate::models::{Role, User};

// Registro de usuario
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    pub role: Role,
}

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

// Usuario visible para el panel (nunca incluye el hash)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub role_label: String,
    pub sections: Vec<Section>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            role_label: user.role.label().to_string(),
            sections: user.role.sections(),
        }
    }
}

// Login / registro correctos
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: UserInfo,
}
