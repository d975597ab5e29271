use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use return_freight::build_router;
use return_freight::config::environment::{EnvironmentConfig, StorageBackend};
use return_freight::database::{connect_and_migrate, seed_demo_data};
use return_freight::repositories::Repositories;
use return_freight::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenvy::dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    info!("🚚 Return Freight - Marketplace de fretes de retorno");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    info!("⚙️ Entorno: {} | almacenamiento: {:?}", config.environment, config.storage_backend);

    let repos = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL es obligatoria con STORAGE_BACKEND=postgres")?;
            Repositories::postgres(connect_and_migrate(url).await?)
        }
        StorageBackend::Memory => {
            warn!("⚠️ Usando almacenamiento en memoria: los datos se pierden al reiniciar");
            Repositories::in_memory()
        }
    };

    if config.seed_demo_data {
        seed_demo_data(&repos, config.bcrypt_cost)
            .await
            .context("Error cargando datos de demostración")?;
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("No se pudo crear {}", config.upload_dir.display()))?;

    let addr = config.server_url();
    let app = build_router(AppState::new(repos, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("No se pudo abrir {}", addr))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   POST /api/auth/register | /api/auth/login | /api/auth/logout");
    info!("   GET|PATCH /api/users/profile");
    info!("   GET|POST /api/vehicles, GET|PATCH|DELETE /api/vehicles/:id");
    info!("   GET|POST /api/availabilities, GET /api/availabilities/search");
    info!("   GET|POST /api/chats, GET /api/chats/:id, POST /api/messages");
    info!("   POST|DELETE /api/upload, PATCH /api/photos/:id/primary");
    info!("   GET /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Error del servidor")?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("⚠️ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("⚠️ No se pudo escuchar SIGTERM: {}", e);
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
