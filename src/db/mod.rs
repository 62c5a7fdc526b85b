//! Database abstraction layer for pg-gateway.
//!
//! Provides a trait-based interface for the two database operations the
//! gateway exposes, so the HTTP layer can run against PostgreSQL or an
//! in-memory stand-in.

mod mock;
mod postgres;
mod schema;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient, MockQuery};
pub use postgres::PostgresClient;
pub use schema::{fold_tables, CatalogRow, ColumnInfo, TableFold, TableInfo};
pub use types::{collect_rows, QueryResult, RawValue, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Connects to the database named by the given configuration.
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Arc::new(client))
}

/// Trait defining the interface for database clients.
///
/// Implementations must be safe to share across concurrent requests; each
/// call builds its own result and holds no state between calls.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Lists the tables of the default schema with their columns in ordinal order.
    async fn list_tables(&self) -> Result<Vec<TableInfo>>;

    /// Prepares and executes a caller-supplied statement, materializing every row.
    ///
    /// Fails with `Validation` if the statement cannot be prepared and with
    /// `Execution` for anything that goes wrong afterwards.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
