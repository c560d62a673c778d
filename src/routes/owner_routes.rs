use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::path_id;
use crate::controllers::OwnerController;
use crate::dto::{ApiResponse, OwnerDetailsResponse, PaymentHistory, TollHistory, VehicleResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `/api/owner`: panel del propietario (solo lectura)
pub fn create_owner_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(owner_details))
        .route("/:id/vehicles", get(owner_vehicles))
        .route("/:id/tolls", get(owner_tolls))
        .route("/:id/payments", get(owner_payments))
}

async fn owner_details(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<OwnerDetailsResponse>>, AppError> {
    let id = path_id(id)?;
    Ok(Json(OwnerController::new(&state).details(id).await?))
}

async fn owner_vehicles(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let id = path_id(id)?;
    Ok(Json(OwnerController::new(&state).vehicles(id).await?))
}

async fn owner_tolls(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<TollHistory>>, AppError> {
    let id = path_id(id)?;
    Ok(Json(OwnerController::new(&state).tolls(id).await?))
}

async fn owner_payments(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<PaymentHistory>>, AppError> {
    let id = path_id(id)?;
    Ok(Json(OwnerController::new(&state).payments(id).await?))
}
