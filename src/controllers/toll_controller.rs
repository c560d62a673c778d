//! Controller del ingreso de escaneos
//!
//! Traduce el cuerpo HTTP a un `ScanEvent` validado: etiqueta obligatoria,
//! checkpoint y lector con valores por defecto, tarifa resuelta por
//! checkpoint. El resto lo decide el motor de peajes; una etiqueta que no
//! pertenece a ningún vehículo, tenga el formato que tenga, es un 404.

use chrono::Utc;
use tracing::info;

use crate::config::TollRateTable;
use crate::dto::{
    HeartbeatRequest, HeartbeatResponse, ScanRequest, ScanResponse, UNKNOWN_CHECKPOINT, UNKNOWN_SCANNER,
};
use crate::models::{ScanEvent, ScanOrigin};
use crate::services::TollService;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError};

pub struct TollController {
    tolls: TollService,
    rates: TollRateTable,
}

impl TollController {
    pub fn new(state: &AppState) -> Self {
        Self {
            tolls: state.tolls.clone(),
            rates: state.config.toll_rates.clone(),
        }
    }

    pub async fn process_scan(&self, request: ScanRequest, origin: ScanOrigin) -> Result<ScanResponse, AppError> {
        let event = build_scan_event(request, &origin, &self.rates)?;
        let receipt = self.tolls.process_scan(event).await?;
        Ok(ScanResponse::from(receipt))
    }
}

/// Construir un `ScanEvent` a partir del cuerpo de la petición
pub fn build_scan_event(
    request: ScanRequest,
    origin: &ScanOrigin,
    rates: &TollRateTable,
) -> Result<ScanEvent, AppError> {
    let rfid_tag = request
        .rfid
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .ok_or_else(|| bad_request_error("RFID tag is required"))?;

    let checkpoint_id = request
        .checkpoint
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_CHECKPOINT.to_string());

    let scanner_id = match origin {
        ScanOrigin::Scanner => request
            .scanner_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SCANNER.to_string()),
        ScanOrigin::Manual { operator } => format!("manual:{}", operator),
    };

    Ok(ScanEvent {
        toll_amount: rates.rate_for(&checkpoint_id),
        rfid_tag,
        checkpoint_id,
        scanner_id,
        timestamp: Utc::now(),
    })
}

pub struct ScannerController {
    state: AppState,
}

impl ScannerController {
    pub fn new(state: &AppState) -> Self {
        Self { state: state.clone() }
    }

    pub async fn heartbeat(&self, request: HeartbeatRequest) -> HeartbeatResponse {
        let scanner_id = request
            .scanner_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let status = request.status.unwrap_or_else(|| "online".to_string());

        let heartbeat = self.state.record_heartbeat(scanner_id, status).await;
        info!("💓 Heartbeat recibido de '{}'", heartbeat.scanner_id);

        HeartbeatResponse {
            success: true,
            message: "Heartbeat received".to_string(),
            scanner_id: heartbeat.scanner_id,
            server_time: heartbeat.last_seen,
        }
    }
}
