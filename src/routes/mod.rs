//! Rutas HTTP
//!
//! Ensambla los routers por área y las capas comunes (trazas, timeout, CORS).

pub mod admin_routes;
pub mod owner_routes;
pub mod toll_routes;
pub mod vehicle_routes;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::dto::HealthResponse;
use crate::middleware::cors_layer;
use crate::state::AppState;
use crate::utils::errors::{panic_response, AppError};

pub use admin_routes::create_admin_router;
pub use owner_routes::create_owner_router;
pub use toll_routes::{create_scanner_router, create_toll_router};
pub use vehicle_routes::create_vehicle_router;

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout;
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/toll", create_toll_router(state.clone()))
        .nest("/api/scanner", create_scanner_router())
        .nest("/api/vehicle", create_vehicle_router())
        .nest("/api/owner", create_owner_router())
        .nest("/api/admin", create_admin_router())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Cuerpos JSON ausentes o mal formados son un 400 con el formato de error común
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Identificadores de ruta mal formados, mismo tratamiento que `json_body`
pub(crate) fn path_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = if state.config.database_url.is_some() {
        "postgres"
    } else {
        "memory"
    };
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "toll-collection".to_string(),
        store: store.to_string(),
        server_time: Utc::now(),
    })
}
