//! Capa de acceso a datos de guías de remisión
//!
//! Cada operación intenta primero la rutina almacenada del servidor y, si la
//! rutina no existe o no es compatible, recurre a SQL directo sobre las
//! tablas base.

pub mod config;
pub mod database;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::{ConnectionOverrides, ConnectionSettings};
pub use database::{build_provider, ConnectionProvider, DbSession, ResultSet, SqlValue, Statement};
pub use utils::errors::{DataError, DataResult, ErrorKind};
