//! Utilidades JWT
//!
//! Tokens de operador para la entrada manual de escaneos. Solo los tokens
//! con rol `admin` autorizan un escaneo manual.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::errors::AppError;

pub const ADMIN_ROLE: &str = "admin";

/// Claims del JWT de operador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,  // operador
    pub role: String, // "admin" para escaneos manuales
    pub exp: usize,   // expiration timestamp
    pub iat: usize,   // issued at timestamp
}

impl AdminClaims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Generar JWT para un operador
pub fn issue_token(subject: &str, role: &str, secret: &str, ttl_secs: i64) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl_secs);

    let claims = AdminClaims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))
        .map_err(|e| AppError::Jwt(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar un JWT
pub fn verify_token(token: &str, secret: &str) -> Result<AdminClaims, AppError> {
    let token_data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Jwt(format!("Token inválido: {}", e)))?;

    Ok(token_data.claims)
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Jwt("Header Authorization debe comenzar con 'Bearer '".to_string()))?;

    if token.is_empty() {
        return Err(AppError::Jwt("Token no puede estar vacío".to_string()));
    }

    Ok(token)
}
