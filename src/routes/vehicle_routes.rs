use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::{json_body, path_id};
use crate::controllers::VehicleController;
use crate::dto::{ApiResponse, LifecycleResponse, RechargeRequest, RechargeResponse, VehicleResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `/api/vehicle`
pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_vehicle))
        .route("/:id/recharge", post(recharge))
        .route("/:id/suspend", post(suspend))
        .route("/:id/reactivate", post(reactivate))
}

async fn get_vehicle(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let id = path_id(id)?;
    let controller = VehicleController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn recharge(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RechargeRequest>, JsonRejection>,
) -> Result<Json<RechargeResponse>, AppError> {
    let id = path_id(id)?;
    let request = json_body(payload)?;
    let controller = VehicleController::new(&state);
    Ok(Json(controller.recharge(id, request).await?))
}

async fn suspend(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<LifecycleResponse>, AppError> {
    let id = path_id(id)?;
    let controller = VehicleController::new(&state);
    Ok(Json(controller.suspend(id).await?))
}

async fn reactivate(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<LifecycleResponse>, AppError> {
    let id = path_id(id)?;
    let controller = VehicleController::new(&state);
    Ok(Json(controller.reactivate(id).await?))
}
