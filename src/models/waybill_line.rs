//! Modelo de Detalle de guía

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct WaybillLine {
    #[validate(custom = "not_blank")]
    pub waybill_code: String,
    pub line_number: i32,
    pub normalized_goods: String,
    pub goods_code: String,
    pub sunat_product_code: String,
    pub tariff_heading: String,
    pub gtin: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    pub unit: String,
    /// Texto libre tal como se registra en la guía
    pub quantity: String,
}
