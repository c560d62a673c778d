use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    ApiResponse, CreateOwnerRequest, OwnerDetailsResponse, PaymentHistory, TollHistory, VehicleResponse,
};
use crate::models::Owner;
use crate::services::{AccountService, VehicleDirectory};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct OwnerController {
    accounts: AccountService,
    directory: VehicleDirectory,
}

impl OwnerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            accounts: state.accounts.clone(),
            directory: state.directory.clone(),
        }
    }

    pub async fn create(&self, request: CreateOwnerRequest) -> Result<ApiResponse<Owner>, AppError> {
        request.validate()?;
        let owner = self.accounts.add_owner(request.into()).await?;
        Ok(ApiResponse::success_with_message(owner, "Owner registered".to_string()))
    }

    pub async fn list(&self) -> Result<ApiResponse<Vec<Owner>>, AppError> {
        Ok(ApiResponse::success(self.accounts.list_owners().await?))
    }

    pub async fn details(&self, owner_id: Uuid) -> Result<ApiResponse<OwnerDetailsResponse>, AppError> {
        let owner = self.accounts.get_owner(owner_id).await?;
        let vehicles = self.vehicle_responses(owner_id).await?;
        Ok(ApiResponse::success(OwnerDetailsResponse::new(owner, vehicles)))
    }

    pub async fn vehicles(&self, owner_id: Uuid) -> Result<ApiResponse<Vec<VehicleResponse>>, AppError> {
        self.accounts.get_owner(owner_id).await?;
        Ok(ApiResponse::success(self.vehicle_responses(owner_id).await?))
    }

    pub async fn tolls(&self, owner_id: Uuid) -> Result<ApiResponse<TollHistory>, AppError> {
        self.accounts.get_owner(owner_id).await?;
        let history = self.accounts.owner_tolls(owner_id).await?;
        Ok(ApiResponse::success(history.into()))
    }

    pub async fn payments(&self, owner_id: Uuid) -> Result<ApiResponse<PaymentHistory>, AppError> {
        self.accounts.get_owner(owner_id).await?;
        let history = self.accounts.owner_payments(owner_id).await?;
        Ok(ApiResponse::success(history.into()))
    }

    async fn vehicle_responses(&self, owner_id: Uuid) -> Result<Vec<VehicleResponse>, AppError> {
        let vehicles = self.directory.list_by_owner(owner_id).await?;
        Ok(vehicles.into_iter().map(Into::into).collect())
    }
}
