//! Configuración del proyecto
//!
//! Este módulo contiene la resolución de los parámetros de conexión a la base
//! de datos.

pub mod database;

pub use database::{ConnectionOverrides, ConnectionSettings, PoolSettings, SettingsSource};
