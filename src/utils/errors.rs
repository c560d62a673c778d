//! Sistema de manejo de errores
//!
//! Este módulo define los errores de la capa HTTP y su conversión a
//! respuestas JSON. Los errores internos se registran pero nunca se
//! devuelven al cliente.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::TollError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error(transparent)]
    Toll(#[from] TollError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message,
            details: None,
            code: code.to_string(),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn toll_error_response(err: TollError) -> (StatusCode, ErrorResponse) {
    let code = err.code();
    let message = err.to_string();
    match err {
        TollError::VehicleNotFound { rfid } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Vehicle not found", message, code).with_details(json!({ "rfid": rfid })),
        ),
        TollError::UnknownVehicle { vehicle_id } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Vehicle not found", message, code)
                .with_details(json!({ "vehicle_id": vehicle_id })),
        ),
        TollError::UnknownOwner { owner_id } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Owner not found", message, code).with_details(json!({ "owner_id": owner_id })),
        ),
        TollError::VehicleNotActive { status, license_plate } => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new("Vehicle not active", message, code)
                .with_details(json!({ "status": status, "license_plate": license_plate })),
        ),
        TollError::InsufficientBalance {
            balance,
            required,
            license_plate,
        } => (
            StatusCode::PAYMENT_REQUIRED,
            ErrorResponse::new("Insufficient balance", message, code).with_details(json!({
                "current_balance": balance,
                "required_amount": required,
                "license_plate": license_plate,
            })),
        ),
        TollError::InvalidAmount { amount } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid amount", message, code).with_details(json!({ "amount": amount })),
        ),
        TollError::InvalidTransition { from, action } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid transition", message, code)
                .with_details(json!({ "status": from, "action": action })),
        ),
        TollError::Duplicate(_) => (
            StatusCode::CONFLICT,
            ErrorResponse::new("Conflict", message, code),
        ),
        TollError::Persistence(detail) => {
            error!("Persistence failure: {}", detail);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(
                    "Persistence failure",
                    "The operation could not be stored, it is safe to retry".to_string(),
                    code,
                ),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Validation Error", "The provided data is invalid".to_string(), "VALIDATION_ERROR")
                        .with_details(json!(e)),
                )
            }

            AppError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"))
            }

            AppError::Unauthorized(msg) => {
                warn!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"))
            }

            AppError::Jwt(msg) => {
                warn!("JWT error: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("Unauthorized", "Invalid bearer token".to_string(), "JWT_ERROR"),
                )
            }

            AppError::Toll(e) => toll_error_response(e),

            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Internal Server Error",
                        "An unexpected error occurred".to_string(),
                        "INTERNAL_ERROR",
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Respuesta para un handler que entró en pánico (`CatchPanicLayer`)
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
