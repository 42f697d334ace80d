//! Modelo de usuario y roles
//!
//! Los roles determinan qué secciones del panel puede ver cada usuario.
//! La contraseña sólo se guarda como hash bcrypt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::cmp::Ordering;
use uuid::Uuid;

use super::Entity;
use crate::utils::errors::{conflict_error, AppResult};

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Dispatcher,
    Safety,
    Finance,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Dispatcher => "dispatcher",
            Role::Safety => "safety",
            Role::Finance => "finance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manager" => Some(Role::Manager),
            "dispatcher" => Some(Role::Dispatcher),
            "safety" => Some(Role::Safety),
            "finance" => Some(Role::Finance),
            _ => None,
        }
    }

    /// Etiqueta mostrada en el panel
    pub fn label(&self) -> &'static str {
        match self {
            Role::Manager => "Fleet Manager",
            Role::Dispatcher => "Trip Dispatcher",
            Role::Safety => "Safety Officer",
            Role::Finance => "Financial Analyst",
        }
    }

    /// Secciones de navegación visibles para el rol
    pub fn sections(&self) -> Vec<Section> {
        Section::ALL.iter().copied().filter(|s| s.allows(*self)).collect()
    }
}

/// Secciones del panel protegidas por rol
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Trips,
    Fleet,
    Finance,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Dashboard, Section::Trips, Section::Fleet, Section::Finance];

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Section::Dashboard => &[Role::Manager, Role::Dispatcher, Role::Safety, Role::Finance],
            Section::Trips => &[Role::Manager, Role::Dispatcher],
            Section::Fleet => &[Role::Manager, Role::Safety],
            Section::Finance => &[Role::Manager, Role::Finance],
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Alta de usuario; el hash ya viene calculado por el servicio de auth
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

/// Los emails se comparan sin distinguir mayúsculas
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Entity for User {
    type New = NewUser;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }

    fn create(new: NewUser, existing: &[Self], id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        let email = normalize_email(&new.email);
        if existing.iter().any(|u| normalize_email(&u.email) == email) {
            return Err(conflict_error("User", "email", &email));
        }
        Ok(Self {
            id,
            email,
            full_name: new.full_name.trim().to_string(),
            role: new.role,
            password_hash: new.password_hash,
            created_at: now,
        })
    }

    fn apply(&mut self, patch: UserPatch) -> AppResult<()> {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_per_role() {
        assert_eq!(Role::Manager.sections(), Section::ALL.to_vec());
        assert_eq!(Role::Dispatcher.sections(), vec![Section::Dashboard, Section::Trips]);
        assert_eq!(Role::Safety.sections(), vec![Section::Dashboard, Section::Fleet]);
        assert_eq!(Role::Finance.sections(), vec![Section::Dashboard, Section::Finance]);
    }

    #[test]
    fn test_email_unique_case_insensitive() {
        let new = |email: &str| NewUser {
            email: email.to_string(),
            full_name: "Fleet Manager".to_string(),
            role: Role::Manager,
            password_hash: "$2b$04$hash".to_string(),
        };
        let first = User::create(new("Manager@FleetFlow.io"), &[], Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(first.email, "manager@fleetflow.io");
        assert!(User::create(new("manager@fleetflow.io"), &[first], Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Manager, Role::Dispatcher, Role::Safety, Role::Finance] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
    }
}
