//! Sistema de manejo de errores
//!
//! Este módulo define los errores de la capa de acceso a datos y su
//! clasificación a partir del SQLSTATE que reporta PostgreSQL.

use thiserror::Error;

/// SQLSTATE que indican que la rutina preferida no existe o no es compatible
/// con la llamada (firma distinta, CALL sobre una función, etc.).
const ROUTINE_UNAVAILABLE_CODES: &[&str] = &[
    "42883", // undefined_function
    "42809", // wrong_object_type
    "42725", // ambiguous_function
    "42P13", // invalid_function_definition
    "42804", // datatype_mismatch
    "42846", // cannot_coerce
    "42P18", // indeterminate_datatype
    "42703", // undefined_column
    "42601", // syntax_error (CALL no soportado)
    "0A000", // feature_not_supported
];

/// Categorías de la taxonomía de errores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    RoutineUnavailable,
    IntegrityViolation,
    Validation,
    Terminal,
}

/// Errores de la capa de acceso a datos
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Connection error ({target}): {cause}")]
    Connection { target: String, cause: String },

    #[error("Routine unavailable [{}]: {message}", .sqlstate.as_deref().unwrap_or("-"))]
    RoutineUnavailable {
        sqlstate: Option<String>,
        message: String,
    },

    #[error("Integrity violation [{sqlstate}]: {message}")]
    IntegrityViolation {
        sqlstate: String,
        message: String,
        constraint: Option<String>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("No rows affected: {0}")]
    NoRowsAffected(String),

    #[error("Mapping error: {0}")]
    Mapping(String),
}

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Connection { .. } => ErrorKind::Connection,
            DataError::RoutineUnavailable { .. } => ErrorKind::RoutineUnavailable,
            DataError::IntegrityViolation { .. } => ErrorKind::IntegrityViolation,
            DataError::Validation(_) => ErrorKind::Validation,
            DataError::Database(_) | DataError::NoRowsAffected(_) | DataError::Mapping(_) => {
                ErrorKind::Terminal
            }
        }
    }

    /// Sólo una rutina ausente o incompatible habilita el siguiente nivel
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::RoutineUnavailable
    }

    pub fn routine_unavailable(message: impl Into<String>) -> Self {
        DataError::RoutineUnavailable {
            sqlstate: None,
            message: message.into(),
        }
    }

    pub fn connection(target: &str, cause: impl std::fmt::Display) -> Self {
        DataError::Connection {
            target: target.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for DataError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DataError::Validation(errors.to_string())
    }
}

/// Resultado tipado para operaciones de acceso a datos
pub type DataResult<T> = Result<T, DataError>;

/// Clasificar un SQLSTATE junto con su mensaje
pub fn classify_sqlstate(code: Option<&str>, message: &str, constraint: Option<&str>) -> DataError {
    match code {
        Some(c) if c.starts_with("23") => DataError::IntegrityViolation {
            sqlstate: c.to_string(),
            message: message.to_string(),
            constraint: constraint.map(str::to_string),
        },
        Some(c) if ROUTINE_UNAVAILABLE_CODES.contains(&c) => DataError::RoutineUnavailable {
            sqlstate: Some(c.to_string()),
            message: message.to_string(),
        },
        _ => DataError::Database(message.to_string()),
    }
}

/// Convertir un error de sqlx en un `DataError` clasificado
pub fn classify_sqlx_error(target: &str, e: sqlx::Error) -> DataError {
    match &e {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            classify_sqlstate(code.as_deref(), db_err.message(), db_err.constraint())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DataError::connection(target, e),
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_) => {
            DataError::Mapping(e.to_string())
        }
        _ => DataError::Database(e.to_string()),
    }
}

/// Función helper para crear errores de validación
pub fn validation_error(field: &str, message: &str) -> DataError {
    DataError::Validation(format!("{}: {}", field, message))
}
