//! Utilidades de validación
//!
//! Validadores usados por los DTOs de entrada (`#[validate(custom = ...)]`)
//! y por el ingreso de escaneos.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    // Etiquetas EPC/TID en hex o identificadores alfanuméricos cortos
    static ref RFID_TAG: Regex = Regex::new(r"^[A-Za-z0-9:_-]{1,64}$").unwrap();
}

/// Validar formato de una etiqueta RFID
pub fn validate_rfid_tag(value: &str) -> Result<(), ValidationError> {
    if !RFID_TAG.is_match(value) {
        let mut error = ValidationError::new("rfid_tag");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty"));
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}
