//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El almacén se elige una sola vez en el
//! arranque; todo lo demás se construye encima.

use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::realtime::{ChangeBridge, FleetViews};
use crate::repositories::SharedStore;
use crate::services::{AuthService, DispatchService};
use crate::utils::errors::AppResult;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub bridge: ChangeBridge,
    pub views: Arc<FleetViews>,
    pub config: EnvironmentConfig,
    pub auth: AuthService,
    pub dispatch: DispatchService,
}

impl AppState {
    /// Cargar las vistas iniciales y montar los servicios sobre el almacén
    pub async fn build(store: SharedStore, bridge: ChangeBridge, config: EnvironmentConfig) -> AppResult<Self> {
        let views = FleetViews::open(&store, &bridge).await?;
        let auth = AuthService::new(store.clone(), JwtConfig::from(&config));
        let dispatch = DispatchService::new(store.clone());

        Ok(Self {
            store,
            bridge,
            views: Arc::new(views),
            config,
            auth,
            dispatch,
        })
    }

    /// Sustituir el servicio de auth (tests con coste bcrypt bajo)
    pub fn with_auth(mut self, auth: AuthService) -> Self {
        self.auth = auth;
        self
    }
}
