//! Query result types for pg-gateway.
//!
//! Defines the structures used to represent ad-hoc query results and the
//! per-cell normalization applied before they are serialized.

use crate::error::{GatewayError, Result};
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of executing a SQL statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,

    /// Rows of data; each has exactly `columns.len()` cells.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Creates an empty result with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of cells every row must carry.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Normalizes a driver row and appends it.
    ///
    /// Rejects rows whose width differs from the column list.
    pub fn push_row(&mut self, row: Vec<RawValue>) -> Result<()> {
        if row.len() != self.width() {
            return Err(GatewayError::execution(format!(
                "row has {} values but the result has {} columns",
                row.len(),
                self.width()
            )));
        }

        self.rows.push(row.into_iter().map(Value::from).collect());
        Ok(())
    }
}

/// A row of normalized cells.
pub type Row = Vec<Value>;

/// A single cell as it appears in the JSON response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text value, including anything that arrived as raw bytes.
    String(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the cell as text, `NULL` for nulls.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// A cell as the driver surfaced it, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Binary payload, such as a `bytea` cell.
    Bytes(Vec<u8>),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Int(i) => Value::Int(i),
            RawValue::Float(f) => Value::Float(f),
            RawValue::Text(s) => Value::String(s),
            RawValue::Bytes(b) => Value::String(bytes_to_text(b)),
        }
    }
}

/// Reinterprets a byte payload as text, replacing invalid UTF-8 sequences.
fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

// Conversion implementations for common types
impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Int(v as i64)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        RawValue::Bytes(v)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<RawValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => RawValue::Null,
        }
    }
}

/// Drains a row cursor into a [`QueryResult`].
///
/// The first error, whether from the cursor or from a malformed row, aborts
/// the read; rows collected before it are dropped with the partial result.
pub async fn collect_rows<S>(columns: Vec<String>, rows: S) -> Result<QueryResult>
where
    S: Stream<Item = Result<Vec<RawValue>>>,
{
    rows.try_fold(QueryResult::new(columns), |mut result, row| async move {
        result.push_row(row)?;
        Ok::<_, GatewayError>(result)
    })
    .await
}
