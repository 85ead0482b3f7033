//! Modelo de Producto

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Product {
    #[validate(custom = "not_blank")]
    pub code: String,
    #[validate(custom = "not_blank")]
    pub name: String,
    /// NULL en la base se lee como 0.0
    #[validate(range(min = 0.0))]
    pub base_price: f64,
    pub unit: String,
}
