use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleetflow_backend::{
    config::{EnvironmentConfig, StoreMode},
    create_app,
    database::{connect_and_migrate, mask_database_url},
    realtime::ChangeBridge,
    repositories::{LocalStore, PgStore, SharedStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fleetflow_backend=debug,tower_http=info")),
        )
        .init();

    info!("🚚 FleetFlow - API de operaciones de flota");
    info!("==========================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);

    // El modo de almacén se decide una sola vez
    let (store, bridge) = open_store(&config).await?;

    let state = AppState::build(store, bridge, config.clone())
        .await
        .context("No se pudieron cargar las vistas iniciales")?;
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST/PORT no forman una dirección válida")?;

    info!("🌐 Servidor iniciando en {}", config.server_url());
    info!("🔍 Endpoints disponibles:");
    info!("   POST /api/auth/register | /api/auth/login, GET /api/auth/me");
    info!("   GET/POST /api/vehicles, PATCH /api/vehicles/:id, GET /api/vehicles/available");
    info!("   GET/POST /api/drivers, PATCH /api/drivers/:id, GET /api/drivers/eligible");
    info!("   GET/POST /api/trips, POST /api/trips/:id/dispatch | /complete");
    info!("   GET/POST /api/fuel-logs | /api/maintenance-logs");
    info!("   GET /api/analytics/dashboard | summary | export.csv | report.txt");
    info!("   GET /api/events (SSE), GET /api/health");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

async fn open_store(config: &EnvironmentConfig) -> Result<(SharedStore, ChangeBridge)> {
    match (config.store_mode(), config.database()) {
        (StoreMode::Live, Some(database)) => {
            info!("🐘 Modo en vivo: {}", mask_database_url(&database.url));
            let pool = connect_and_migrate(&database).await?;
            let bridge = ChangeBridge::live(&pool)
                .await
                .context("No se pudo iniciar el puente de cambios")?;
            let store: SharedStore = Arc::new(PgStore::new(pool));
            Ok((store, bridge))
        }
        _ => {
            let store = match &config.local_data_dir {
                Some(dir) => {
                    info!("💾 Modo local con persistencia en {}", dir.display());
                    LocalStore::open(dir, config.local_seed_demo)
                        .await
                        .context("No se pudo abrir el almacén local")?
                }
                None if config.local_seed_demo => {
                    info!("🧪 Modo local en memoria con flota de demo");
                    LocalStore::with_demo_fleet()
                }
                None => {
                    warn!("🧪 Modo local en memoria: los datos se pierden al reiniciar");
                    LocalStore::in_memory()
                }
            };
            let store: SharedStore = Arc::new(store);
            Ok((store, ChangeBridge::inert()))
        }
    }
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
