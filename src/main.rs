use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use toll_collection::{
    cache::{CacheConfig, RedisClient, TagIndex},
    config::{database::DatabaseConfig, EnvironmentConfig},
    database::DatabaseConnection,
    repositories::{BalanceStore, MemoryBalanceStore, PgBalanceStore},
    routes::create_router,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env().context("invalid configuration")?;

    // Configurar logging
    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🛣️  Toll Collection Backend");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    // Balance Store: PostgreSQL si hay DATABASE_URL, memoria en otro caso
    let store: Arc<dyn BalanceStore> = match DatabaseConfig::from_environment(&config) {
        Some(db_config) => {
            let connection = DatabaseConnection::connect(&db_config).await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                e
            })?;
            Arc::new(PgBalanceStore::new(connection.pool().clone()))
        }
        None => {
            if config.is_production() {
                warn!("⚠️  DATABASE_URL no configurada en producción: los saldos no sobreviven a un reinicio");
            } else {
                warn!("⚠️  DATABASE_URL no configurada, usando store en memoria");
            }
            Arc::new(MemoryBalanceStore::new())
        }
    };

    // Índice RFID opcional en Redis; sin Redis se usa el recorrido completo
    let tag_index: Option<Arc<dyn TagIndex>> = match &config.redis_url {
        Some(redis_url) => {
            let cache_config = CacheConfig {
                redis_url: redis_url.clone(),
                default_ttl: config.tag_index_ttl,
            };
            match RedisClient::new(cache_config).await {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!("⚠️  Redis no disponible, continuando sin índice RFID: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let addr = config.server_addr();
    let app = create_router(AppState::new(config, store, tag_index));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("🚦 Lectores:");
    info!("   POST /api/toll/rfid-scan - Procesar escaneo RFID");
    info!("   POST /api/scanner/heartbeat - Heartbeat de lector");
    info!("🚗 Vehículos:");
    info!("   GET  /api/vehicle/:id - Obtener vehículo");
    info!("   POST /api/vehicle/:id/recharge - Recargar saldo");
    info!("   POST /api/vehicle/:id/suspend - Suspender vehículo");
    info!("   POST /api/vehicle/:id/reactivate - Reactivar vehículo");
    info!("👤 Propietarios:");
    info!("   GET  /api/owner/:id - Propietario y vehículos");
    info!("   GET  /api/owner/:id/vehicles|tolls|payments - Historiales");
    info!("🛠️  Administración:");
    info!("   GET  /api/admin/vehicles - Listar vehículos (?status=)");
    info!("   GET  /api/admin/suspended-vehicles - Vehículos suspendidos");
    info!("   GET  /api/admin/owners - Listar propietarios");
    info!("   POST /api/admin/owners - Registrar propietario");
    info!("   POST /api/admin/vehicles - Registrar vehículo");
    info!("   GET  /api/admin/scanners - Último heartbeat por lector");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
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
