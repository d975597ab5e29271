//! Configuración de conexión a PostgreSQL
//!
//! Crea el pool y aplica las migraciones embebidas de `migrations/`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Crear el pool de conexiones y aplicar migraciones pendientes
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool> {
    info!("🗄️ Conectando a PostgreSQL en {}", mask_database_url(database_url));

    let pool = DatabaseConfig::new(database_url)
        .create_pool()
        .await
        .context("No se pudo conectar a la base de datos")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Error aplicando migraciones")?;

    info!("✅ Base de datos lista, migraciones aplicadas");
    Ok(pool)
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
