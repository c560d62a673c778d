//! Exclusión mutua por vehículo
//!
//! Todas las mutaciones de saldo y estado de un mismo vehículo pasan por su
//! lock; vehículos distintos nunca se bloquean entre sí. Dentro de un mismo
//! proceso esto serializa el read-modify-write; entre procesos la escritura
//! condicional por `version` del Balance Store cubre el resto.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct VehicleLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Espera el lock del vehículo; se libera al soltar el guard
    pub async fn acquire(&self, vehicle_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Descartar locks que nadie está usando
            locks.retain(|id, lock| *id == vehicle_id || Arc::strong_count(lock) > 1);
            locks
                .entry(vehicle_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
