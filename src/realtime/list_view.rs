//! Vistas de lista
//!
//! Copia en caché de una colección que se refresca sola: con cada evento
//! del puente para su tabla y tras cada mutación hecha a través de ella.
//! Si un refresco falla se conserva la última lista buena.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::change_bridge::{ChangeBridge, Subscription};
use crate::models::{Driver, Entity, FuelLog, MaintenanceLog, Trip, Vehicle};
use crate::repositories::{Repository, SharedStore};
use crate::utils::errors::AppResult;

pub struct ListView<E: Entity> {
    repo: Arc<dyn Repository<E>>,
    items: Arc<RwLock<Vec<E>>>,
    _subscription: Subscription,
}

impl<E: Entity> ListView<E> {
    /// Cargar la colección y suscribirse a sus cambios
    pub async fn open(repo: Arc<dyn Repository<E>>, bridge: &ChangeBridge) -> AppResult<Self> {
        let items = Arc::new(RwLock::new(repo.list().await?));

        let subscription = {
            let repo = repo.clone();
            let items = items.clone();
            bridge.subscribe(E::COLLECTION, move || {
                let repo = repo.clone();
                let items = items.clone();
                async move {
                    let mut items = items.write().await;
                    match repo.list().await {
                        Ok(fresh) => *items = fresh,
                        Err(e) => warn!("⚠️ No se pudo refrescar '{}': {}", E::COLLECTION, e),
                    }
                }
            })
        };

        Ok(Self {
            repo,
            items,
            _subscription: subscription,
        })
    }

    /// Lista actual, sin ir al almacén
    pub async fn snapshot(&self) -> Vec<E> {
        self.items.read().await.clone()
    }

    /// Se relee con el lock de escritura tomado: una lectura antigua nunca
    /// pisa a una más reciente
    pub async fn refresh(&self) -> AppResult<Vec<E>> {
        let mut items = self.items.write().await;
        let fresh = self.repo.list().await?;
        *items = fresh.clone();
        Ok(fresh)
    }

    pub async fn add(&self, new: E::New) -> AppResult<E> {
        let record = self.repo.add(new).await?;
        self.refresh_quietly().await;
        Ok(record)
    }

    pub async fn update(&self, id: Uuid, patch: E::Patch) -> AppResult<E> {
        let record = self.repo.update(id, patch).await?;
        self.refresh_quietly().await;
        Ok(record)
    }

    /// La mutación ya se hizo; un fallo al releer sólo deja la caché atrasada
    async fn refresh_quietly(&self) {
        if let Err(e) = self.refresh().await {
            warn!("⚠️ Vista '{}' sin refrescar tras mutación: {}", E::COLLECTION, e);
        }
    }
}

/// Las cinco vistas del panel
pub struct FleetViews {
    pub vehicles: ListView<Vehicle>,
    pub drivers: ListView<Driver>,
    pub trips: ListView<Trip>,
    pub fuel_logs: ListView<FuelLog>,
    pub maintenance_logs: ListView<MaintenanceLog>,
}

impl FleetViews {
    pub async fn open(store: &SharedStore, bridge: &ChangeBridge) -> AppResult<Self> {
        Ok(Self {
            vehicles: ListView::open(store.vehicles(), bridge).await?,
            drivers: ListView::open(store.drivers(), bridge).await?,
            trips: ListView::open(store.trips(), bridge).await?,
            fuel_logs: ListView::open(store.fuel_logs(), bridge).await?,
            maintenance_logs: ListView::open(store.maintenance_logs(), bridge).await?,
        })
    }

    /// Releer viajes, vehículos y conductores tras una transición de viaje
    pub async fn refresh_dispatch(&self) -> AppResult<()> {
        self.trips.refresh().await?;
        self.vehicles.refresh().await?;
        self.drivers.refresh().await?;
        Ok(())
    }
}
