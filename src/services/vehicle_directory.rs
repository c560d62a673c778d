//! Vehicle Directory
//!
//! Resuelve una etiqueta RFID a su vehículo. El store no tiene índice por
//! etiqueta, así que la búsqueda base recorre toda la colección (O(n)) y
//! gana la primera coincidencia. Si hay un `TagIndex` configurado se prueba
//! primero, pero el vehículo siempre se relee del store por id para que
//! saldo y estado estén al día.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{TollError, TollResult};
use crate::cache::TagIndex;
use crate::models::{Vehicle, VehicleStatus};
use crate::repositories::BalanceStore;

#[derive(Clone)]
pub struct VehicleDirectory {
    store: Arc<dyn BalanceStore>,
    index: Option<Arc<dyn TagIndex>>,
}

impl VehicleDirectory {
    pub fn new(store: Arc<dyn BalanceStore>, index: Option<Arc<dyn TagIndex>>) -> Self {
        Self { store, index }
    }

    pub async fn find_by_rfid(&self, rfid: &str) -> TollResult<Vehicle> {
        if let Some(vehicle) = self.find_indexed(rfid).await? {
            return Ok(vehicle);
        }

        let vehicles = self.store.list_vehicles().await?;
        debug!(rfid, candidates = vehicles.len(), "full scan for RFID tag");

        let vehicle = vehicles
            .into_iter()
            .find(|v| v.rfid == rfid)
            .ok_or_else(|| TollError::VehicleNotFound { rfid: rfid.to_string() })?;

        if let Some(index) = &self.index {
            index.remember(rfid, vehicle.id).await;
        }
        Ok(vehicle)
    }

    async fn find_indexed(&self, rfid: &str) -> TollResult<Option<Vehicle>> {
        let Some(index) = &self.index else {
            return Ok(None);
        };
        let Some(vehicle_id) = index.lookup(rfid).await else {
            return Ok(None);
        };

        match self.store.get_vehicle(vehicle_id).await? {
            Some(vehicle) if vehicle.rfid == rfid => Ok(Some(vehicle)),
            _ => {
                warn!(rfid, %vehicle_id, "stale RFID index entry, falling back to full scan");
                index.forget(rfid).await;
                Ok(None)
            }
        }
    }

    pub async fn get(&self, vehicle_id: Uuid) -> TollResult<Vehicle> {
        self.store
            .get_vehicle(vehicle_id)
            .await?
            .ok_or(TollError::UnknownVehicle { vehicle_id })
    }

    pub async fn list(&self) -> TollResult<Vec<Vehicle>> {
        Ok(self.store.list_vehicles().await?)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> TollResult<Vec<Vehicle>> {
        let vehicles = self.store.list_vehicles().await?;
        Ok(vehicles.into_iter().filter(|v| v.owner_id == owner_id).collect())
    }

    pub async fn list_by_status(&self, status: VehicleStatus) -> TollResult<Vec<Vehicle>> {
        let vehicles = self.store.list_vehicles().await?;
        Ok(vehicles.into_iter().filter(|v| v.status == status).collect())
    }
}
