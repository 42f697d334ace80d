//! Middleware del sistema
//!
//! Autenticación JWT con roles y CORS.

pub mod auth;
pub mod cors;

pub use auth::*;
pub use cors::*;
