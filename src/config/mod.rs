//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y el modo de almacenamiento elegido al arrancar.

pub mod database;
pub mod environment;

pub use environment::*;

use serde::Serialize;

/// Backend de almacenamiento activo; se decide una vez al arrancar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Memoria local (demo/offline), con persistencia JSON opcional
    Local,
    /// PostgreSQL con notificaciones de cambios
    Live,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Local => "local",
            StoreMode::Live => "live",
        }
    }
}
