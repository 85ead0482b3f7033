//! Utilidades de validación
//!
//! Validadores personalizados para los derives de `validator` usados en los
//! modelos.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// RUC peruano: exactamente 11 dígitos
    pub static ref RUC_REGEX: Regex = Regex::new(r"^\d{11}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Email bien formado; en blanco equivale a ausente
pub fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || validator::validate_email(value.trim()) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

pub fn is_valid_ruc(value: &str) -> bool {
    RUC_REGEX.is_match(value.trim())
}
