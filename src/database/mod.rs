//! Módulo de base de datos
//!
//! Maneja la conexión con PostgreSQL y la representación de sentencias y
//! resultados.

pub mod connection;
pub mod value;

use std::sync::Arc;

pub use connection::{ConnectionProvider, DbSession, DirectConnectionProvider, PooledConnectionProvider};
pub use value::{ResultSet, RowRef, SqlType, SqlValue, Statement};

use crate::config::database::ConnectionSettings;
use crate::utils::errors::DataResult;

/// Construir el proveedor adecuado: pool si está configurado, si no conexión directa
pub fn build_provider(settings: &ConnectionSettings) -> DataResult<Arc<dyn ConnectionProvider>> {
    if let Some(pool) = &settings.pool {
        log::info!("🔄 Usando pool de conexiones (máximo {})", pool.max_connections);
        Ok(Arc::new(PooledConnectionProvider::new(settings)?))
    } else {
        log::info!("🔌 Usando una conexión nueva por operación");
        Ok(Arc::new(DirectConnectionProvider::new(settings)?))
    }
}
