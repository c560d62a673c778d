use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::json_body;
use crate::controllers::{OwnerController, VehicleController};
use crate::dto::{ApiResponse, CreateOwnerRequest, CreateVehicleRequest, VehicleResponse};
use crate::models::{Owner, VehicleStatus};
use crate::state::{AppState, ScannerHeartbeat};
use crate::utils::errors::AppError;

/// `/api/admin`: panel de administración
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/suspended-vehicles", get(list_suspended_vehicles))
        .route("/owners", get(list_owners).post(create_owner))
        .route("/scanners", get(list_scanners))
}

#[derive(Debug, Deserialize)]
struct VehicleFilter {
    status: Option<VehicleStatus>,
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filter): Query<VehicleFilter>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    Ok(Json(VehicleController::new(&state).list(filter.status).await?))
}

async fn list_suspended_vehicles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    Ok(Json(
        VehicleController::new(&state)
            .list(Some(VehicleStatus::Suspended))
            .await?,
    ))
}

async fn create_vehicle(
    State(state): State<AppState>,
    payload: Result<Json<CreateVehicleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let request = json_body(payload)?;
    Ok(Json(VehicleController::new(&state).create(request).await?))
}

async fn list_owners(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Owner>>>, AppError> {
    Ok(Json(OwnerController::new(&state).list().await?))
}

async fn create_owner(
    State(state): State<AppState>,
    payload: Result<Json<CreateOwnerRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Owner>>, AppError> {
    let request = json_body(payload)?;
    Ok(Json(OwnerController::new(&state).create(request).await?))
}

async fn list_scanners(State(state): State<AppState>) -> Json<ApiResponse<Vec<ScannerHeartbeat>>> {
    Json(ApiResponse::success(state.list_scanners().await))
}
