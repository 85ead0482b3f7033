//! Modelo de Vehículo
//!
//! Mapea la tabla `vehiculo`. Una carga máxima de 0.0 se guarda como NULL y
//! un NULL se lee como 0.0.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Vehicle {
    #[validate(custom = "not_blank")]
    pub plate: String,
    pub registration_number: String,
    pub vehicle_type: String,
    pub make: String,
    pub model: String,
    #[validate(range(min = 0.0))]
    pub max_load: f64,
}
