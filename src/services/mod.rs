//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los
//! servicios encapsulan operaciones que involucran varios modelos.

pub mod analytics_service;
pub mod auth_service;
pub mod dispatch_service;
pub mod export_service;

pub use auth_service::AuthService;
pub use dispatch_service::DispatchService;
