//! Configuración de conexión a PostgreSQL
//!
//! Crea el pool y aplica las migraciones embebidas en `migrations/`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Crear el pool y ejecutar las migraciones pendientes
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<PgPool> {
    info!("🗄️ Conectando a PostgreSQL en {}", mask_database_url(&config.url));
    let pool = config
        .create_pool()
        .await
        .context("Failed to connect to PostgreSQL")?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    info!("✅ Migraciones aplicadas");
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    match url.rfind('@') {
        Some(at_pos) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
