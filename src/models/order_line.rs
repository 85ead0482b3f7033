//! Modelo de Detalle de orden

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct OrderLine {
    #[validate(custom = "not_blank")]
    pub order_code: String,
    /// Asignado por la base; 0 antes de insertar
    pub line_number: i32,
    #[validate(custom = "not_blank")]
    pub product_code: String,
    /// Nombre del producto según el catálogo; `None` si el código no existe
    pub product_name: Option<String>,
    #[validate(custom = "non_negative")]
    pub quantity: Decimal,
    #[validate(custom = "non_negative")]
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl OrderLine {
    pub fn computed_subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}
