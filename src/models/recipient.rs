//! Modelo de Destinatario
//!
//! Mapea la tabla `destinatario`. El borrado es lógico (`eliminado`).

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{not_blank, optional_email, RUC_REGEX};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Recipient {
    #[validate(regex = "RUC_REGEX")]
    pub ruc: String,

    #[validate(custom = "not_blank")]
    pub name: String,

    pub phone: String,
    pub street: String,

    #[validate(custom = "not_blank")]
    pub location_code: String,

    #[validate(custom = "optional_email")]
    pub email: String,
}
