//! Middleware de CORS
//!
//! Sin `CORS_ORIGINS` se acepta cualquier origen (desarrollo); con una
//! lista, sólo esos orígenes.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::warn;

/// CORS a partir de la lista de orígenes configurada
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    cors_middleware_with_origins(origins)
}

/// Crear middleware de CORS con orígenes específicos
pub fn cors_middleware_with_origins(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ Origen CORS ignorado: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
