//! Modelo de Orden de pago
//!
//! La base guarda el estado como un código de un carácter; los registros
//! exponen siempre la palabra de presentación.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{not_blank, RUC_REGEX};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PaymentOrder {
    #[validate(custom = "not_blank")]
    pub code: String,
    pub date: Option<NaiveDate>,
    #[validate(regex = "RUC_REGEX")]
    pub client_ruc: String,
    /// Palabra de presentación ("Pendiente", "Emitida", "Confirmada", ...)
    pub status: String,
}

/// Estados conocidos de una orden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pendiente,
    Emitida,
    Confirmada,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Pendiente, OrderStatus::Emitida, OrderStatus::Confirmada];

    pub fn code(self) -> char {
        match self {
            OrderStatus::Pendiente => 'P',
            OrderStatus::Emitida => 'E',
            OrderStatus::Confirmada => 'C',
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "Pendiente",
            OrderStatus::Emitida => "Emitida",
            OrderStatus::Confirmada => "Confirmada",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Coincidencia por subcadena, sin distinguir mayúsculas
    pub fn from_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("pend") {
            Some(OrderStatus::Pendiente)
        } else if lower.contains("emit") {
            Some(OrderStatus::Emitida)
        } else if lower.contains("confirm") {
            Some(OrderStatus::Confirmada)
        } else {
            None
        }
    }
}

/// Valor almacenado → palabra de presentación
pub fn status_for_display(stored: Option<&str>) -> String {
    let value = match stored.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return String::new(),
    };

    let mut chars = value.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return OrderStatus::from_code(c)
            .map(|s| s.display().to_string())
            .unwrap_or_else(|| c.to_uppercase().to_string());
    }

    OrderStatus::from_text(value)
        .map(|s| s.display().to_string())
        .unwrap_or_else(|| capitalize(value))
}

/// Palabra de presentación → valor almacenado; vacío es NULL
///
/// Un texto libre no reconocido se guarda tal cual para que la lectura lo
/// devuelva capitalizado.
pub fn status_for_storage(display: &str) -> Option<String> {
    let value = display.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(status) = OrderStatus::from_text(value) {
        return Some(status.code().to_string());
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_uppercase().to_string()),
        _ => Some(value.to_string()),
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
