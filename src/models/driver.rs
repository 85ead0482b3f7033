//! Modelo de Conductor

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Driver {
    #[validate(custom = "not_blank")]
    pub license: String,
    pub national_id: String,
    #[validate(custom = "not_blank")]
    pub name: String,
    pub phone: String,
    pub license_expiry: Option<NaiveDate>,
}
