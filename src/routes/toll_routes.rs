use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::post,
    Extension, Json, Router,
};

use super::json_body;
use crate::controllers::{ScannerController, TollController};
use crate::dto::{HeartbeatRequest, HeartbeatResponse, ScanRequest, ScanResponse};
use crate::middleware::scanner_auth_middleware;
use crate::models::ScanOrigin;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `/api/toll`: el escaneo exige credenciales de lector u operador
pub fn create_toll_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/rfid-scan", post(process_scan))
        .route_layer(middleware::from_fn_with_state(state, scanner_auth_middleware))
}

/// `/api/scanner`
pub fn create_scanner_router() -> Router<AppState> {
    Router::new().route("/heartbeat", post(heartbeat))
}

async fn process_scan(
    State(state): State<AppState>,
    Extension(origin): Extension<ScanOrigin>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let request = json_body(payload)?;
    let controller = TollController::new(&state);
    let response = controller.process_scan(request, origin).await?;
    Ok(Json(response))
}

async fn heartbeat(
    State(state): State<AppState>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> Json<HeartbeatResponse> {
    // Un cuerpo ausente o ilegible cuenta como heartbeat anónimo
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let controller = ScannerController::new(&state);
    Json(controller.heartbeat(request).await)
}
