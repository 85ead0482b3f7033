//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores y validación.

pub mod errors;
pub mod validation;

pub use errors::{DataError, DataResult, ErrorKind};
