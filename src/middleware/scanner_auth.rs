//! Middleware de autenticación de escaneos
//!
//! Un escaneo se acepta si trae el token compartido de los lectores en
//! `X-Scanner-Token`, o un JWT de operador con rol `admin` (entrada manual).
//! El origen autenticado se inyecta en las extensiones del request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    models::ScanOrigin,
    state::AppState,
    utils::{errors::AppError, jwt},
};

pub const SCANNER_TOKEN_HEADER: &str = "x-scanner-token";

/// Comparación en tiempo constante respecto al contenido
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Resolver el origen de un escaneo a partir de sus headers
pub fn authenticate_scan(
    headers: &HeaderMap,
    scanner_token: &str,
    jwt_secret: &str,
) -> Result<ScanOrigin, AppError> {
    if let Some(presented) = headers.get(SCANNER_TOKEN_HEADER) {
        let presented = presented.to_str().unwrap_or_default();
        if tokens_match(presented, scanner_token) {
            return Ok(ScanOrigin::Scanner);
        }
        warn!("🚫 Token de lector inválido");
        return Err(AppError::Unauthorized("Invalid scanner token".to_string()));
    }

    if let Some(auth_header) = headers.get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        let token = jwt::extract_token_from_header(auth_header)?;
        let claims = jwt::verify_token(token, jwt_secret)?;
        if !claims.is_admin() {
            warn!("🚫 Escaneo manual rechazado para '{}' (rol {})", claims.sub, claims.role);
            return Err(AppError::Unauthorized("Manual scans require an admin token".to_string()));
        }
        debug!("🧑‍💼 Escaneo manual de '{}'", claims.sub);
        return Ok(ScanOrigin::Manual { operator: claims.sub });
    }

    Err(AppError::Unauthorized("Missing scanner credentials".to_string()))
}

/// Middleware que protege el endpoint de escaneo
pub async fn scanner_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let origin = authenticate_scan(
        request.headers(),
        &state.config.scanner_token,
        &state.config.jwt_secret,
    )?;
    request.extensions_mut().insert(origin);
    Ok(next.run(request).await)
}
