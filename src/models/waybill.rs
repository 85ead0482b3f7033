//! Modelo de Guía de remisión (cabecera)
//!
//! Mapea la tabla `guia_remision`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{not_blank, RUC_REGEX};

pub const STATUS_ISSUED: &str = "emitida";
pub const STATUS_IN_TRANSIT: &str = "en tránsito";
pub const STATUS_DELIVERED: &str = "entregada";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Waybill {
    #[validate(custom = "not_blank")]
    pub code: String,
    pub series: String,
    pub number: String,
    pub order_code: Option<String>,
    pub sender_ruc: String,
    #[validate(regex = "RUC_REGEX")]
    pub recipient_ruc: String,
    pub origin_address: String,
    pub destination_address: String,
    #[validate(custom = "not_blank")]
    pub origin_location: String,
    #[validate(custom = "not_blank")]
    pub destination_location: String,
    pub motive: String,
    pub modality: String,
    #[validate(range(min = 0.0))]
    pub total_weight: f64,
    #[validate(range(min = 0))]
    pub bundle_count: i32,
    pub issue_date: Option<NaiveDate>,
    pub issue_time: Option<NaiveTime>,
    pub status: String,
}
