use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{CacheConfig, TagIndex};

/// Cliente Redis con connection manager y operaciones async
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(config: CacheConfig) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())?;
        let manager = ConnectionManager::new(client).await?;

        // Test de conexión usando un comando simple
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager, config })
    }

    /// Generar clave de cache con prefijo
    fn make_key(&self, prefix: &str, identifier: &str) -> String {
        format!("toll_collection:{}:{}", prefix, identifier)
    }

    /// Generar clave del índice de etiquetas
    pub fn tag_key(&self, rfid: &str) -> String {
        self.make_key("rfid", rfid)
    }
}

#[async_trait]
impl TagIndex for RedisClient {
    async fn lookup(&self, rfid: &str) -> Option<Uuid> {
        let mut conn = self.manager.clone();
        let key = self.tag_key(rfid);

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => {
                debug!("📥 Cache HIT para clave: {}", key);
                match Uuid::parse_str(&value) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!("⚠️ Valor corrupto en cache para clave {}: {}", key, e);
                        None
                    }
                }
            }
            Ok(None) => {
                debug!("❌ Cache MISS para clave: {}", key);
                None
            }
            Err(e) => {
                warn!("⚠️ Error leyendo cache para clave {}: {}", key, e);
                None
            }
        }
    }

    async fn remember(&self, rfid: &str, vehicle_id: Uuid) {
        let mut conn = self.manager.clone();
        let key = self.tag_key(rfid);

        let result: RedisResult<()> = conn
            .set_ex(&key, vehicle_id.to_string(), self.config.default_ttl)
            .await;

        match result {
            Ok(()) => debug!("💾 Cache SET para clave: {} (TTL: {}s)", key, self.config.default_ttl),
            Err(e) => warn!("⚠️ Error guardando en cache para clave {}: {}", key, e),
        }
    }

    async fn forget(&self, rfid: &str) {
        let mut conn = self.manager.clone();
        let key = self.tag_key(rfid);

        let result: RedisResult<i64> = conn.del(&key).await;
        match result {
            Ok(count) => debug!("🗑️ Cache DELETE para clave: {} (eliminados: {})", key, count),
            Err(e) => warn!("⚠️ Error eliminando cache para clave {}: {}", key, e),
        }
    }
}
