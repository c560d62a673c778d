//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: configuración, Balance Store, servicios
//! y el registro de heartbeats de los lectores.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::TagIndex;
use crate::config::environment::EnvironmentConfig;
use crate::repositories::BalanceStore;
use crate::services::{
    AccountService, LifecycleService, RechargeService, TollService, VehicleDirectory, VehicleLocks,
};

/// Último heartbeat conocido de un lector
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScannerHeartbeat {
    pub scanner_id: String,
    pub status: String,
    pub last_seen: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub store: Arc<dyn BalanceStore>,
    pub directory: VehicleDirectory,
    pub tolls: TollService,
    pub lifecycle: LifecycleService,
    pub recharges: RechargeService,
    pub accounts: AccountService,
    pub scanners: Arc<RwLock<HashMap<String, ScannerHeartbeat>>>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn BalanceStore>,
        tag_index: Option<Arc<dyn TagIndex>>,
    ) -> Self {
        let locks = VehicleLocks::new();
        let attempts = config.max_commit_attempts;
        let directory = VehicleDirectory::new(store.clone(), tag_index);

        Self {
            tolls: TollService::new(store.clone(), directory.clone(), locks.clone(), attempts),
            lifecycle: LifecycleService::new(store.clone(), locks.clone(), attempts),
            recharges: RechargeService::new(store.clone(), locks, attempts),
            accounts: AccountService::new(store.clone()),
            directory,
            store,
            config,
            scanners: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registrar un heartbeat de lector
    pub async fn record_heartbeat(&self, scanner_id: String, status: String) -> ScannerHeartbeat {
        let heartbeat = ScannerHeartbeat {
            scanner_id: scanner_id.clone(),
            status,
            last_seen: Utc::now(),
        };
        debug!("💓 Heartbeat de '{}' ({})", heartbeat.scanner_id, heartbeat.status);
        self.scanners.write().await.insert(scanner_id, heartbeat.clone());
        heartbeat
    }

    /// Lectores conocidos, ordenados por id
    pub async fn list_scanners(&self) -> Vec<ScannerHeartbeat> {
        let mut scanners: Vec<_> = self.scanners.read().await.values().cloned().collect();
        scanners.sort_by(|a, b| a.scanner_id.cmp(&b.scanner_id));
        scanners
    }
}
