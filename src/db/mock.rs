//! Mock database clients for testing.
//!
//! Provides in-memory `DatabaseClient` implementations so the HTTP layer can
//! be exercised without a running PostgreSQL server.

use super::{
    collect_rows, fold_tables, CatalogRow, DatabaseClient, QueryResult, RawValue, TableInfo,
};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use futures::stream;
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned result for one statement.
///
/// Rows are replayed in order; a failing row stands in for a decode error
/// partway through the cursor.
#[derive(Debug, Clone, Default)]
pub struct MockQuery {
    columns: Vec<String>,
    rows: Vec<std::result::Result<Vec<RawValue>, String>>,
}

impl MockQuery {
    /// Creates a result with the given column names and no rows.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn row(mut self, values: Vec<RawValue>) -> Self {
        self.rows.push(Ok(values));
        self
    }

    /// Appends a row that fails to decode with the given message.
    pub fn failing_row(mut self, message: impl Into<String>) -> Self {
        self.rows.push(Err(message.into()));
        self
    }
}

/// A mock database client that returns predefined results.
///
/// Only registered statements "prepare"; anything else is rejected as
/// invalid SQL, the way the server rejects text it cannot parse.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    catalog: Vec<CatalogRow>,
    queries: HashMap<String, MockQuery>,
    executed: Mutex<Vec<String>>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the catalog with `(column, type)` pairs in ordinal order.
    pub fn with_table(mut self, name: &str, columns: &[(&str, &str)]) -> Self {
        self.catalog.extend(
            columns
                .iter()
                .map(|(column, data_type)| CatalogRow::new(name, *column, *data_type)),
        );
        self
    }

    /// Registers the result returned for a statement.
    pub fn with_query(mut self, sql: impl Into<String>, query: MockQuery) -> Self {
        self.queries.insert(sql.into().trim().to_string(), query);
        self
    }

    /// Statements passed to `execute_query`, in call order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let rows = stream::iter(self.catalog.iter().cloned().map(Ok));
        fold_tables(rows).await
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sql.to_string());

        let query = self.queries.get(sql.trim()).ok_or_else(|| {
            GatewayError::validation(format!("ERROR: syntax error in statement \"{sql}\""))
        })?;

        let rows = stream::iter(
            query
                .rows
                .iter()
                .cloned()
                .map(|row| row.map_err(GatewayError::execution)),
        );
        collect_rows(query.columns.clone(), rows).await
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every call fails, for exercising error paths.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        Err(GatewayError::query(self.message.clone()))
    }

    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(GatewayError::execution(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
