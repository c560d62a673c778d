//! Vehicle Lifecycle Manager
//!
//! Transiciones suspend/reactivate. Usan el mismo lock por vehículo y la
//! misma escritura condicional que el débito de peajes, así una suspensión
//! nunca se intercala con un cobro en curso.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::{TollError, TollResult};
use super::vehicle_locks::VehicleLocks;
use crate::models::{Vehicle, VehicleFields, VehicleStatus};
use crate::repositories::{BalanceStore, WriteOutcome};

#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn BalanceStore>,
    locks: VehicleLocks,
    max_commit_attempts: u32,
}

impl LifecycleService {
    pub fn new(store: Arc<dyn BalanceStore>, locks: VehicleLocks, max_commit_attempts: u32) -> Self {
        Self {
            store,
            locks,
            max_commit_attempts: max_commit_attempts.max(1),
        }
    }

    /// Suspender un vehículo (p. ej. reportado robado). Suspender uno ya
    /// suspendido no es error y no reescribe `suspended_at`.
    pub async fn suspend(&self, vehicle_id: Uuid) -> TollResult<Vehicle> {
        let vehicle = self
            .transition(vehicle_id, "suspend", |vehicle| {
                if vehicle.status == VehicleStatus::Suspended {
                    return Ok(None);
                }
                Ok(Some(VehicleFields {
                    status: Some(VehicleStatus::Suspended),
                    suspended_at: Some(Some(Utc::now())),
                    reactivated_at: Some(None),
                    ..Default::default()
                }))
            })
            .await?;
        info!(%vehicle_id, license_plate = %vehicle.license_plate, "🚫 vehicle suspended");
        Ok(vehicle)
    }

    /// Reactivar un vehículo suspendido; cualquier otro estado es una transición inválida
    pub async fn reactivate(&self, vehicle_id: Uuid) -> TollResult<Vehicle> {
        let vehicle = self
            .transition(vehicle_id, "reactivate", |vehicle| {
                if vehicle.status != VehicleStatus::Suspended {
                    return Err(TollError::InvalidTransition {
                        from: vehicle.status,
                        action: "reactivate",
                    });
                }
                Ok(Some(VehicleFields {
                    status: Some(VehicleStatus::Active),
                    reactivated_at: Some(Some(Utc::now())),
                    suspended_at: Some(None),
                    ..Default::default()
                }))
            })
            .await?;
        info!(%vehicle_id, license_plate = %vehicle.license_plate, "✅ vehicle reactivated");
        Ok(vehicle)
    }

    /// Lectura fresca bajo lock + escritura condicional con reintentos.
    /// `plan` devuelve `Ok(None)` cuando no hay nada que escribir.
    async fn transition<F>(&self, vehicle_id: Uuid, action: &'static str, plan: F) -> TollResult<Vehicle>
    where
        F: Fn(&Vehicle) -> TollResult<Option<VehicleFields>>,
    {
        let _guard = self.locks.acquire(vehicle_id).await;

        for attempt in 1..=self.max_commit_attempts {
            let vehicle = self
                .store
                .get_vehicle(vehicle_id)
                .await?
                .ok_or(TollError::UnknownVehicle { vehicle_id })?;

            let fields = match plan(&vehicle) {
                Ok(Some(fields)) => fields,
                Ok(None) => return Ok(vehicle),
                Err(e) => {
                    warn!(%vehicle_id, action, "lifecycle transition rejected: {}", e);
                    return Err(e);
                }
            };

            match self.store.update_vehicle_fields(vehicle_id, vehicle.version, fields).await? {
                WriteOutcome::Committed(updated) => return Ok(updated),
                WriteOutcome::Conflict => {
                    warn!(%vehicle_id, action, attempt, "vehicle changed concurrently, retrying transition");
                }
            }
        }

        error!(%vehicle_id, action, "lifecycle transition gave up after repeated write conflicts");
        Err(TollError::Persistence(format!(
            "{} of vehicle {} kept conflicting after {} attempts",
            action, vehicle_id, self.max_commit_attempts
        )))
    }
}
