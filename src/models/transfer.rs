//! Modelo de Traslado
//!
//! Sin fecha de fin registrada, la lectura devuelve la fecha de inicio.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Transfer {
    #[validate(custom = "not_blank")]
    pub code: String,
    #[validate(custom = "not_blank")]
    pub waybill_code: String,
    #[validate(custom = "not_blank")]
    pub plate: String,
    #[validate(custom = "not_blank")]
    pub license: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub status: String,
    pub notes: String,
}

impl Transfer {
    /// Fin efectivo: la fecha de fin o, si falta, la de inicio
    pub fn effective_end(&self) -> NaiveDateTime {
        self.end.unwrap_or(self.start)
    }
}
