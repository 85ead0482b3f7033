//! Conexión a PostgreSQL
//!
//! Cada llamada a `acquire()` entrega una sesión nueva que el llamador cierra
//! en cuanto termina su sentencia. `DirectConnectionProvider` abre una
//! conexión por llamada; `PooledConnectionProvider` la toma de un `PgPool`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgColumn, PgConnectOptions, PgPool, PgRow};
use sqlx::query::Query;
use sqlx::{Column, ConnectOptions, Connection, Executor, PgConnection, Postgres, Row, TypeInfo};
use sqlx::Statement as _;

use crate::config::database::ConnectionSettings;
use crate::database::value::{ResultSet, SqlType, SqlValue, Statement};
use crate::utils::errors::{classify_sqlx_error, DataError, DataResult};

/// Sesión viva sobre la base de datos
#[async_trait]
pub trait DbSession: Send {
    /// Ejecutar una sentencia y devolver las filas afectadas
    async fn execute(&mut self, stmt: &Statement) -> DataResult<u64>;

    /// Ejecutar una consulta y devolver el resultado completo
    async fn query(&mut self, stmt: &Statement) -> DataResult<ResultSet>;

    /// Liberar la sesión
    async fn close(self: Box<Self>);
}

/// Proveedor de sesiones: una sesión nueva por llamada
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn acquire(&self) -> DataResult<Box<dyn DbSession>>;

    /// Destino de la conexión para diagnósticos (credenciales enmascaradas)
    fn target(&self) -> String;
}

/// Abre una conexión nueva en cada `acquire()`
pub struct DirectConnectionProvider {
    options: PgConnectOptions,
    target: String,
}

impl DirectConnectionProvider {
    pub fn new(settings: &ConnectionSettings) -> DataResult<Self> {
        let target = settings.masked_target();
        let options = settings
            .connect_options()
            .map_err(|e| DataError::connection(&target, e))?;
        Ok(Self { options, target })
    }
}

#[async_trait]
impl ConnectionProvider for DirectConnectionProvider {
    async fn acquire(&self) -> DataResult<Box<dyn DbSession>> {
        let conn = self
            .options
            .connect()
            .await
            .map_err(|e| DataError::connection(&self.target, e))?;
        log::debug!("🔌 Conexión abierta a {}", self.target);
        Ok(Box::new(PgSession {
            handle: Handle::Direct(conn),
            target: self.target.clone(),
        }))
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

/// Toma conexiones de un pool; cerrar la sesión la devuelve al pool
pub struct PooledConnectionProvider {
    pool: PgPool,
    target: String,
}

impl PooledConnectionProvider {
    pub fn new(settings: &ConnectionSettings) -> DataResult<Self> {
        let target = settings.masked_target();
        let pool = settings
            .lazy_pool()
            .map_err(|e| DataError::connection(&target, e))?;
        Ok(Self { pool, target })
    }
}

#[async_trait]
impl ConnectionProvider for PooledConnectionProvider {
    async fn acquire(&self) -> DataResult<Box<dyn DbSession>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DataError::connection(&self.target, e))?;
        Ok(Box::new(PgSession {
            handle: Handle::Pooled(conn),
            target: self.target.clone(),
        }))
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

enum Handle {
    Direct(PgConnection),
    Pooled(PoolConnection<Postgres>),
}

impl Handle {
    fn conn(&mut self) -> &mut PgConnection {
        match self {
            Handle::Direct(conn) => conn,
            Handle::Pooled(conn) => conn,
        }
    }
}

/// Sesión sobre una conexión de sqlx
pub struct PgSession {
    handle: Handle,
    target: String,
}

#[async_trait]
impl DbSession for PgSession {
    async fn execute(&mut self, stmt: &Statement) -> DataResult<u64> {
        log::debug!("▶️ {}", stmt.sql);
        let result = build_query(stmt)
            .execute(self.handle.conn())
            .await
            .map_err(|e| classify_sqlx_error(&self.target, e))?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, stmt: &Statement) -> DataResult<ResultSet> {
        log::debug!("▶️ {}", stmt.sql);
        let rows = build_query(stmt)
            .fetch_all(self.handle.conn())
            .await
            .map_err(|e| classify_sqlx_error(&self.target, e))?;

        if rows.is_empty() {
            // Sin filas los nombres de columna salen de la sentencia preparada
            let prepared = self
                .handle
                .conn()
                .prepare(stmt.sql.as_str())
                .await
                .map_err(|e| classify_sqlx_error(&self.target, e))?;
            let columns = prepared.columns().iter().map(|c| c.name().to_string()).collect();
            return Ok(ResultSet::new(columns, Vec::new()));
        }
        rows_to_result_set(&rows).map_err(|e| classify_sqlx_error(&self.target, e))
    }

    async fn close(self: Box<Self>) {
        match self.handle {
            Handle::Direct(conn) => {
                if let Err(e) = conn.close().await {
                    log::warn!("⚠️ Error cerrando conexión a {}: {}", self.target, e);
                }
            }
            // Al soltarla vuelve al pool
            Handle::Pooled(conn) => drop(conn),
        }
    }
}

fn build_query(stmt: &Statement) -> Query<'_, Postgres, PgArguments> {
    stmt.params
        .iter()
        .fold(sqlx::query(&stmt.sql), |query, value| bind_value(query, value))
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null(ty) => match ty {
            SqlType::Text => query.bind(None::<String>),
            SqlType::Integer => query.bind(None::<i32>),
            SqlType::BigInt => query.bind(None::<i64>),
            SqlType::Numeric => query.bind(None::<Decimal>),
            SqlType::Double => query.bind(None::<f64>),
            SqlType::Boolean => query.bind(None::<bool>),
            SqlType::Date => query.bind(None::<NaiveDate>),
            SqlType::Timestamp => query.bind(None::<NaiveDateTime>),
            SqlType::Time => query.bind(None::<NaiveTime>),
        },
        SqlValue::Text(v) => query.bind(v.as_str()),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::BigInt(v) => query.bind(*v),
        SqlValue::Numeric(v) => query.bind(*v),
        SqlValue::Double(v) => query.bind(*v),
        SqlValue::Boolean(v) => query.bind(*v),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::Time(v) => query.bind(*v),
    }
}

fn rows_to_result_set(rows: &[PgRow]) -> Result<ResultSet, sqlx::Error> {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let values = rows
        .iter()
        .map(|row| {
            row.columns()
                .iter()
                .map(|col| decode_column(row, col))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResultSet::new(columns, values))
}

fn decode_column(row: &PgRow, col: &PgColumn) -> Result<SqlValue, sqlx::Error> {
    let idx = col.ordinal();
    let value = match col.type_info().name() {
        "BOOL" => row
            .try_get::<Option<bool>, _>(idx)?
            .map(SqlValue::Boolean)
            .unwrap_or(SqlValue::Null(SqlType::Boolean)),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| SqlValue::Integer(i32::from(v)))
            .unwrap_or(SqlValue::Null(SqlType::Integer)),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)?
            .map(SqlValue::Integer)
            .unwrap_or(SqlValue::Null(SqlType::Integer)),
        "INT8" => row
            .try_get::<Option<i64>, _>(idx)?
            .map(SqlValue::BigInt)
            .unwrap_or(SqlValue::Null(SqlType::BigInt)),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Double(f64::from(v)))
            .unwrap_or(SqlValue::Null(SqlType::Double)),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(idx)?
            .map(SqlValue::Double)
            .unwrap_or(SqlValue::Null(SqlType::Double)),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(idx)?
            .map(SqlValue::Numeric)
            .unwrap_or(SqlValue::Null(SqlType::Numeric)),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(idx)?
            .map(SqlValue::Date)
            .unwrap_or(SqlValue::Null(SqlType::Date)),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(SqlValue::Timestamp)
            .unwrap_or(SqlValue::Null(SqlType::Timestamp)),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| SqlValue::Timestamp(v.naive_utc()))
            .unwrap_or(SqlValue::Null(SqlType::Timestamp)),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)?
            .map(SqlValue::Time)
            .unwrap_or(SqlValue::Null(SqlType::Time)),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
            .try_get::<Option<String>, _>(idx)?
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null(SqlType::Text)),
        "VOID" => SqlValue::Null(SqlType::Text),
        other => {
            log::warn!("⚠️ Tipo de columna no soportado '{}' en '{}'", other, col.name());
            return Err(unsupported_column(col.name(), other));
        }
    };
    Ok(value)
}

/// Columna cuyo tipo no tiene representación en `SqlValue`
fn unsupported_column(column: &str, type_name: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("tipo {} no soportado", type_name).into(),
    }
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
