//! Puente de notificaciones de cambios
//!
//! En modo en vivo un `PgListener` escucha el canal `fleet_changes`, que
//! alimentan los triggers de las migraciones, y reparte cada evento por un
//! canal `broadcast`. En modo local el puente es inerte: las suscripciones
//! existen pero nunca se disparan.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::utils::errors::AppResult;

/// Canal de NOTIFY usado por los triggers
pub const CHANGE_CHANNEL: &str = "fleet_changes";

const EVENT_BUFFER: usize = 256;

/// Cambio en una tabla: `{"table": "trips", "op": "UPDATE"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub op: String,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            op: op.into(),
        }
    }
}

#[derive(Clone)]
pub struct ChangeBridge {
    sender: broadcast::Sender<ChangeEvent>,
    live: bool,
}

impl ChangeBridge {
    /// Puente del modo local: nunca emite eventos
    pub fn inert() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender, live: false }
    }

    /// Puente sin base de datos alimentado a mano con [`ChangeBridge::publish`]
    pub fn manual() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender, live: true }
    }

    /// Escuchar `fleet_changes` en PostgreSQL y reenviar cada notificación
    pub async fn live(pool: &PgPool) -> AppResult<Self> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        info!("📡 Escuchando cambios en el canal '{}'", CHANGE_CHANNEL);

        let bridge = Self::manual();
        let sender = bridge.sender.clone();
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<ChangeEvent>(notification.payload()) {
                            Ok(event) => {
                                debug!("📨 Cambio en '{}' ({})", event.table, event.op);
                                // Sin receptores no es un error
                                let _ = sender.send(event);
                            }
                            Err(e) => warn!("⚠️ Notificación ilegible '{}': {}", notification.payload(), e),
                        }
                    }
                    Err(e) => {
                        // PgListener se reconecta en el siguiente recv
                        error!("❌ Error del listener de cambios: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(bridge)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Emitir un evento; devuelve cuántos receptores lo recibieron
    pub fn publish(&self, event: ChangeEvent) -> usize {
        if !self.live {
            return 0;
        }
        self.sender.send(event).unwrap_or(0)
    }

    /// Receptor crudo de todos los eventos (stream SSE)
    pub fn events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Invocar `on_change` por cada cambio en `table` mientras viva la
    /// [`Subscription`] devuelta
    pub fn subscribe<F, Fut>(&self, table: &str, on_change: F) -> Subscription
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if !self.live {
            return Subscription { task: None };
        }

        let mut receiver = self.sender.subscribe();
        let table = table.to_string();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.table == table => on_change().await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("⚠️ Suscripción a '{}' perdió {} eventos, refrescando", table, skipped);
                        on_change().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription { task: Some(task) }
    }
}

/// Suscripción activa; al soltarla se deja de recibir eventos
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_subscription(bridge: &ChangeBridge, table: &str) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let subscription = bridge.subscribe(table, move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        (hits, subscription)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_only_matching_table_fires() {
        let bridge = ChangeBridge::manual();
        let (hits, _subscription) = counter_subscription(&bridge, "trips");
        settle().await;

        bridge.publish(ChangeEvent::new("vehicles", "UPDATE"));
        bridge.publish(ChangeEvent::new("trips", "INSERT"));
        bridge.publish(ChangeEvent::new("trips", "UPDATE"));
        settle().await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bridge = ChangeBridge::manual();
        let (hits, subscription) = counter_subscription(&bridge, "drivers");
        assert!(subscription.is_active());
        subscription.unsubscribe();
        settle().await;

        bridge.publish(ChangeEvent::new("drivers", "UPDATE"));
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inert_bridge_never_fires() {
        let bridge = ChangeBridge::inert();
        let (hits, subscription) = counter_subscription(&bridge, "trips");
        assert!(!subscription.is_active());
        assert_eq!(bridge.publish(ChangeEvent::new("trips", "INSERT")), 0);
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_payload_format() {
        let event: ChangeEvent = serde_json::from_str(r#"{"table":"fuel_logs","op":"INSERT"}"#).unwrap();
        assert_eq!(event, ChangeEvent::new("fuel_logs", "INSERT"));
    }
}
