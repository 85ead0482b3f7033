//! Modelo de Remitente

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{not_blank, optional_email, RUC_REGEX};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Sender {
    #[validate(regex = "RUC_REGEX")]
    pub ruc: String,

    #[validate(custom = "not_blank")]
    pub company_name: String,

    pub legal_name: String,
    pub phone: String,

    #[validate(custom = "optional_email")]
    pub email: String,

    pub street: String,
    pub location_code: String,
}
