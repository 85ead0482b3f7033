//! Modelo de Ubigeo (departamento / provincia / distrito)

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(custom = "not_blank")]
    pub code: String,
    pub department: String,
    pub province: String,
    pub district: String,
}
