//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{
    collect_rows, fold_tables, CatalogRow, DatabaseClient, QueryResult, RawValue, TableInfo,
};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use futures::{future, TryStreamExt};
use sqlx::postgres::{PgColumn, PgPool, PgRow};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::debug;

/// Columns of every table in the default schema, grouped by table and in
/// declared order.
const CATALOG_QUERY: &str = r#"
    SELECT
        table_name::text AS table_name,
        column_name::text AS column_name,
        data_type::text AS data_type
    FROM information_schema.columns
    WHERE table_schema = 'public'
    ORDER BY table_name, ordinal_position
"#;

/// PostgreSQL database client.
#[derive(Debug, Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Opens a pool with driver defaults and verifies one connection can be made.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        debug!("Connecting to {}", config.display_string());

        let pool = PgPool::connect(config.as_str())
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self { pool })
    }

}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let rows = sqlx::query_as::<_, CatalogRow>(CATALOG_QUERY)
            .fetch(&self.pool)
            .map_err(|e| GatewayError::query(format!("Failed to fetch tables: {e}")));

        fold_tables(rows).await
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            GatewayError::execution(format!("Failed to acquire connection: {e}"))
        })?;

        // Cached statements keep the result shape they were prepared with,
        // which goes stale once DDL touches the tables they read
        conn.clear_cached_statements()
            .await
            .map_err(|e| GatewayError::execution(format_query_error(e)))?;

        let statement = (&mut *conn).prepare(sql).await.map_err(map_prepare_error)?;

        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();
        debug!(columns = columns.len(), "Statement prepared");

        // The simple query protocol returns every cell in its text form
        let rows = sqlx::raw_sql(sql)
            .fetch(&mut *conn)
            .map_err(|e| GatewayError::execution(format_query_error(e)))
            .and_then(|row| future::ready(convert_row(&row)));

        collect_rows(columns, rows).await
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Splits prepare failures into caller mistakes and everything else.
///
/// Anything the server itself rejected is the statement's fault; I/O and
/// protocol failures are not.
fn map_prepare_error(error: sqlx::Error) -> GatewayError {
    if error.as_database_error().is_some() {
        GatewayError::validation(format_query_error(error))
    } else {
        GatewayError::execution(format_query_error(error))
    }
}

/// Converts a sqlx PgRow into one raw value per column.
fn convert_row(row: &PgRow) -> Result<Vec<RawValue>> {
    row.columns()
        .iter()
        .map(|col| convert_value(row, col))
        .collect()
}

/// Decodes a single column value from a text-format PgRow.
fn convert_value(row: &PgRow, col: &PgColumn) -> Result<RawValue> {
    let raw = row
        .try_get_raw(col.ordinal())
        .map_err(|e| decode_error(col, e))?;
    if raw.is_null() {
        return Ok(RawValue::Null);
    }

    let type_name = col.type_info().name().to_uppercase();
    if type_name == "BYTEA" {
        return row
            .try_get::<Vec<u8>, _>(col.ordinal())
            .map(RawValue::Bytes)
            .map_err(|e| decode_error(col, e));
    }

    let text = raw.as_str().map_err(|e| decode_error(col, e))?;
    Ok(text_cell(&type_name, text))
}

/// Maps PostgreSQL's text rendering of a cell to a JSON scalar where the
/// type has one. Everything else, including values a scalar cannot hold
/// (`NaN`, `Infinity`), stays as the server printed it.
fn text_cell(type_name: &str, text: &str) -> RawValue {
    match type_name {
        "BOOL" => match text {
            "t" => RawValue::Bool(true),
            "f" => RawValue::Bool(false),
            _ => RawValue::Text(text.to_string()),
        },
        "INT2" | "INT4" | "INT8" | "OID" => text
            .parse::<i64>()
            .map(RawValue::Int)
            .unwrap_or_else(|_| RawValue::Text(text.to_string())),
        "FLOAT4" | "FLOAT8" => match text.parse::<f64>() {
            Ok(f) if f.is_finite() => RawValue::Float(f),
            _ => RawValue::Text(text.to_string()),
        },
        _ => RawValue::Text(text.to_string()),
    }
}

fn decode_error(col: &PgColumn, error: impl std::fmt::Display) -> GatewayError {
    GatewayError::execution(format!(
        "Failed to decode column \"{}\" ({}): {error}",
        col.name(),
        col.type_info().name()
    ))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> GatewayError {
    let host = config.host().unwrap_or("localhost");
    let port = config.port();
    let user = config.user().unwrap_or("unknown");
    let database = config.database().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        GatewayError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        GatewayError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        GatewayError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        GatewayError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        GatewayError::connection(error.to_string())
    }
}

/// Formats a query error with PostgreSQL's detail and hint when available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }

        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }

        if let Some(constraint) = pg_error.constraint() {
            result.push_str("\n  CONSTRAINT: ");
            result.push_str(constraint);
        }
    }

    result
}
