use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{ApiResponse, CreateVehicleRequest, LifecycleResponse, RechargeRequest, RechargeResponse, VehicleResponse};
use crate::models::{NewVehicle, VehicleStatus};
use crate::services::{AccountService, LifecycleService, RechargeService, VehicleDirectory};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError};

pub struct VehicleController {
    directory: VehicleDirectory,
    lifecycle: LifecycleService,
    recharges: RechargeService,
    accounts: AccountService,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: state.directory.clone(),
            lifecycle: state.lifecycle.clone(),
            recharges: state.recharges.clone(),
            accounts: state.accounts.clone(),
        }
    }

    pub async fn get(&self, vehicle_id: Uuid) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let vehicle = self.directory.get(vehicle_id).await?;
        Ok(ApiResponse::success(vehicle.into()))
    }

    pub async fn list(&self, status: Option<VehicleStatus>) -> Result<ApiResponse<Vec<VehicleResponse>>, AppError> {
        let vehicles = match status {
            Some(status) => self.directory.list_by_status(status).await?,
            None => self.directory.list().await?,
        };
        Ok(ApiResponse::success(vehicles.into_iter().map(Into::into).collect()))
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;

        let vehicle = self
            .accounts
            .provision_vehicle(NewVehicle {
                owner_id: request.owner_id,
                rfid: request.rfid.trim().to_string(),
                license_plate: request.license_plate.trim().to_string(),
                vehicle_type: request.vehicle_type,
                initial_balance: request.initial_balance.unwrap_or(Decimal::ZERO),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehicle registered".to_string(),
        ))
    }

    pub async fn recharge(&self, vehicle_id: Uuid, request: RechargeRequest) -> Result<RechargeResponse, AppError> {
        let amount = request.amount.ok_or_else(|| bad_request_error("amount is required"))?;
        let payment = self.recharges.recharge(vehicle_id, amount).await?;
        Ok(payment.into())
    }

    pub async fn suspend(&self, vehicle_id: Uuid) -> Result<LifecycleResponse, AppError> {
        let vehicle = self.lifecycle.suspend(vehicle_id).await?;
        let message = format!("Vehicle {} has been suspended", vehicle.license_plate);
        Ok(LifecycleResponse::new(vehicle, message))
    }

    pub async fn reactivate(&self, vehicle_id: Uuid) -> Result<LifecycleResponse, AppError> {
        let vehicle = self.lifecycle.reactivate(vehicle_id).await?;
        let message = format!("Vehicle {} has been reactivated", vehicle.license_plate);
        Ok(LifecycleResponse::new(vehicle, message))
    }
}
