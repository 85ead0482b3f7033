//! Valores, sentencias y resultados tabulares
//!
//! Representación independiente del driver de los parámetros que se enlazan
//! a una sentencia y de las filas que devuelve, para que el ejecutor y los
//! adaptadores no dependan de los tipos de sqlx.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::utils::errors::{DataError, DataResult};

/// Tipo SQL de un parámetro, necesario para enlazar NULL con tipo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SqlType {
    Text,
    Integer,
    BigInt,
    Numeric,
    Double,
    Boolean,
    Date,
    Timestamp,
    Time,
}

/// Valor enlazado a una sentencia o leído de una fila
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Text(String),
    Integer(i32),
    BigInt(i64),
    Numeric(Decimal),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Time(NaiveTime),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    /// Texto opcional: `None` y cadenas en blanco se envían como NULL
    pub fn opt_text(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => SqlValue::Text(v.to_string()),
            _ => SqlValue::Null(SqlType::Text),
        }
    }

    pub fn text_or_null(value: &str) -> Self {
        Self::opt_text(Some(value))
    }

    pub fn opt_date(value: Option<NaiveDate>) -> Self {
        value.map(SqlValue::Date).unwrap_or(SqlValue::Null(SqlType::Date))
    }

    pub fn opt_timestamp(value: Option<NaiveDateTime>) -> Self {
        value
            .map(SqlValue::Timestamp)
            .unwrap_or(SqlValue::Null(SqlType::Timestamp))
    }

    pub fn opt_numeric(value: Option<Decimal>) -> Self {
        value.map(SqlValue::Numeric).unwrap_or(SqlValue::Null(SqlType::Numeric))
    }

    /// Flotante enviado como NUMERIC para que coincida con la firma de la rutina
    pub fn numeric_from_f64(value: f64) -> Self {
        Decimal::from_f64_retain(value)
            .map(SqlValue::Numeric)
            .unwrap_or(SqlValue::Null(SqlType::Numeric))
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::Null(_) => None,
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::BigInt(i) => Some(i.to_string()),
            SqlValue::Numeric(d) => Some(d.to_string()),
            SqlValue::Double(f) => Some(f.to_string()),
            SqlValue::Boolean(b) => Some(b.to_string()),
            SqlValue::Date(d) => Some(d.to_string()),
            SqlValue::Timestamp(t) => Some(t.to_string()),
            SqlValue::Time(t) => Some(t.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(i) => Some(f64::from(*i)),
            SqlValue::BigInt(i) => Some(*i as f64),
            SqlValue::Numeric(d) => d.to_f64(),
            SqlValue::Double(f) => Some(*f),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            SqlValue::Integer(i) => Some(Decimal::from(*i)),
            SqlValue::BigInt(i) => Some(Decimal::from(*i)),
            SqlValue::Numeric(d) => Some(*d),
            SqlValue::Double(f) => Decimal::from_f64(*f),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(i64::from(*i)),
            SqlValue::BigInt(i) => Some(*i),
            SqlValue::Numeric(d) => d.to_i64(),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Boolean(b) => Some(*b),
            SqlValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "t" | "true" => Some(true),
                "f" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SqlValue::Date(d) => Some(*d),
            SqlValue::Timestamp(t) => Some(t.date()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            SqlValue::Timestamp(t) => Some(*t),
            SqlValue::Date(d) => d.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            SqlValue::Time(t) => Some(*t),
            SqlValue::Timestamp(t) => Some(t.time()),
            _ => None,
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null(_) => serializer.serialize_none(),
            SqlValue::Text(v) => serializer.serialize_str(v),
            SqlValue::Integer(v) => serializer.serialize_i32(*v),
            SqlValue::BigInt(v) => serializer.serialize_i64(*v),
            SqlValue::Numeric(v) => Serialize::serialize(v, serializer),
            SqlValue::Double(v) => serializer.serialize_f64(*v),
            SqlValue::Boolean(v) => serializer.serialize_bool(*v),
            SqlValue::Date(v) => Serialize::serialize(v, serializer),
            SqlValue::Timestamp(v) => Serialize::serialize(v, serializer),
            SqlValue::Time(v) => Serialize::serialize(v, serializer),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Numeric(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

/// Sentencia SQL con sus parámetros posicionales ($1, $2, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// `CALL rutina($1, ...)` - convención de procedimiento
    pub fn procedure_call(routine: &str, params: Vec<SqlValue>) -> Self {
        let sql = format!("CALL {}({})", routine, placeholders(params.len()));
        Self::with_params(sql, params)
    }

    /// `SELECT rutina($1, ...)` - misma rutina invocada como función escalar
    pub fn function_call(routine: &str, params: Vec<SqlValue>) -> Self {
        let sql = format!("SELECT {}({})", routine, placeholders(params.len()));
        Self::with_params(sql, params)
    }

    /// `SELECT * FROM rutina($1, ...)` - función que devuelve un conjunto de filas
    pub fn set_returning(routine: &str, params: Vec<SqlValue>) -> Self {
        let sql = format!("SELECT * FROM {}({})", routine, placeholders(params.len()));
        Self::with_params(sql, params)
    }
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resultado tabular genérico: nombres de columnas y valores por fila
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Posición de una columna; los nombres se comparan sin distinguir mayúsculas
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |values| RowRef {
            result: self,
            values,
        })
    }
}

/// Vista de una fila con acceso por nombre de columna
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    result: &'a ResultSet,
    values: &'a [SqlValue],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> DataResult<&'a SqlValue> {
        self.result
            .column_index(column)
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| DataError::Mapping(format!("column '{}' not present", column)))
    }

    /// Columna que puede no existir en todas las variantes del resultado
    pub fn try_get(&self, column: &str) -> Option<&'a SqlValue> {
        self.result
            .column_index(column)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn text(&self, column: &str) -> DataResult<String> {
        Ok(self.get(column)?.as_text().unwrap_or_default())
    }

    pub fn opt_text(&self, column: &str) -> DataResult<Option<String>> {
        Ok(self.get(column)?.as_text())
    }

    /// NULL se lee como 0.0
    pub fn f64_or_zero(&self, column: &str) -> DataResult<f64> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(0.0);
        }
        value
            .as_f64()
            .ok_or_else(|| mismatch(column, "a number", value))
    }

    pub fn opt_decimal(&self, column: &str) -> DataResult<Option<Decimal>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_decimal()
            .map(Some)
            .ok_or_else(|| mismatch(column, "a decimal", value))
    }

    pub fn opt_i64(&self, column: &str) -> DataResult<Option<i64>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| mismatch(column, "an integer", value))
    }

    pub fn opt_bool(&self, column: &str) -> DataResult<Option<bool>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_bool()
            .map(Some)
            .ok_or_else(|| mismatch(column, "a boolean", value))
    }

    pub fn opt_date(&self, column: &str) -> DataResult<Option<NaiveDate>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_date()
            .map(Some)
            .ok_or_else(|| mismatch(column, "a date", value))
    }

    pub fn opt_timestamp(&self, column: &str) -> DataResult<Option<NaiveDateTime>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_timestamp()
            .map(Some)
            .ok_or_else(|| mismatch(column, "a timestamp", value))
    }

    pub fn opt_time(&self, column: &str) -> DataResult<Option<NaiveTime>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_time()
            .map(Some)
            .ok_or_else(|| mismatch(column, "a time", value))
    }
}

fn mismatch(column: &str, expected: &str, found: &SqlValue) -> DataError {
    DataError::Mapping(format!(
        "column '{}' expected {}, found {:?}",
        column, expected, found
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_statement_shapes() {
        let call = Statement::procedure_call("sp_eliminar_vehiculo", vec!["ABC-123".into()]);
        assert_eq!(call.sql, "CALL sp_eliminar_vehiculo($1)");

        let func = Statement::function_call("sp_eliminar_vehiculo", vec!["ABC-123".into()]);
        assert_eq!(func.sql, "SELECT sp_eliminar_vehiculo($1)");

        let list = Statement::set_returning("sp_listar_vehiculos", vec![]);
        assert_eq!(list.sql, "SELECT * FROM sp_listar_vehiculos()");
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let rs = ResultSet::new(
            vec!["PLACA".to_string(), "carga_max".to_string()],
            vec![vec!["ABC-123".into(), SqlValue::Null(SqlType::Numeric)]],
        );
        let row = rs.iter().next().expect("one row");
        assert_eq!(row.text("placa").unwrap(), "ABC-123");
        assert_eq!(row.f64_or_zero("carga_max").unwrap(), 0.0);
        assert!(row.get("marca").is_err());
    }

    #[test]
    fn test_blank_optional_text_is_null() {
        assert_eq!(SqlValue::opt_text(Some("  ")), SqlValue::Null(SqlType::Text));
        assert_eq!(SqlValue::opt_text(None), SqlValue::Null(SqlType::Text));
        assert_eq!(SqlValue::opt_text(Some(" ORD-1 ")), SqlValue::Text("ORD-1".to_string()));
    }

    #[test]
    fn test_result_set_serializes_to_json() {
        let rs = ResultSet::new(
            vec!["placa".to_string(), "carga_max".to_string(), "fecha".to_string(), "marca".to_string()],
            vec![vec![
                "ABC-123".into(),
                Decimal::new(1250, 2).into(),
                SqlValue::Date(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()),
                SqlValue::Null(SqlType::Text),
            ]],
        );
        let json = serde_json::to_value(&rs).unwrap();
        assert_eq!(json["rows"][0][0], "ABC-123");
        assert_eq!(json["rows"][0][1], "12.50");
        assert_eq!(json["rows"][0][2], "2024-05-02");
        assert!(json["rows"][0][3].is_null());
    }
}
