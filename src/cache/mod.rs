//! Cache
//!
//! Índice opcional `rfid -> vehicle_id` delante del Vehicle Directory.
//! El índice solo guarda identificadores: saldo y estado siempre se leen
//! del Balance Store. Un fallo del cache nunca hace fallar un escaneo.

pub mod cache_config;
pub mod redis_client;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use cache_config::CacheConfig;
pub use redis_client::RedisClient;

#[async_trait]
pub trait TagIndex: Send + Sync {
    async fn lookup(&self, rfid: &str) -> Option<Uuid>;
    async fn remember(&self, rfid: &str, vehicle_id: Uuid);
    async fn forget(&self, rfid: &str);
}

/// Índice en proceso, útil sin Redis y en tests
#[derive(Default)]
pub struct MemoryTagIndex {
    entries: RwLock<HashMap<String, Uuid>>,
}

impl MemoryTagIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagIndex for MemoryTagIndex {
    async fn lookup(&self, rfid: &str) -> Option<Uuid> {
        self.entries.read().await.get(rfid).copied()
    }

    async fn remember(&self, rfid: &str, vehicle_id: Uuid) {
        self.entries.write().await.insert(rfid.to_string(), vehicle_id);
    }

    async fn forget(&self, rfid: &str) {
        self.entries.write().await.remove(rfid);
    }
}
