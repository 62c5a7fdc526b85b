//! Catalog types and the table/column fold.
//!
//! The catalog is read as a flat stream of `(table, column, type)` triples
//! and folded into one [`TableInfo`] per table.

use crate::error::{GatewayError, Result};
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A table and its columns in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,

    /// Columns in declared order.
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Creates a new table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn with_column(mut self, column: ColumnInfo) -> Self {
        self.columns.push(column);
        self
    }
}

/// A column as reported by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Catalog type name (e.g., "integer", "character varying").
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// One row of `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogRow {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
}

impl CatalogRow {
    pub fn new(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Accumulates catalog rows into tables.
///
/// Tables come out in the order their first row was seen; columns in the
/// order their rows arrived.
#[derive(Debug, Default)]
pub struct TableFold {
    tables: Vec<TableInfo>,
    index: HashMap<String, usize>,
}

impl TableFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one catalog row to its table, creating the table on first sight.
    pub fn push(&mut self, row: CatalogRow) {
        let CatalogRow {
            table_name,
            column_name,
            data_type,
        } = row;

        let idx = match self.index.get(&table_name) {
            Some(&idx) => idx,
            None => {
                let idx = self.tables.len();
                self.tables.push(TableInfo::new(table_name.clone()));
                self.index.insert(table_name, idx);
                idx
            }
        };

        self.tables[idx]
            .columns
            .push(ColumnInfo::new(column_name, data_type));
    }

    pub fn finish(self) -> Vec<TableInfo> {
        self.tables
    }
}

impl FromIterator<CatalogRow> for TableFold {
    fn from_iter<I: IntoIterator<Item = CatalogRow>>(iter: I) -> Self {
        let mut fold = Self::new();
        for row in iter {
            fold.push(row);
        }
        fold
    }
}

/// Drains a catalog cursor into tables.
///
/// The stream is consumed once. The first error aborts the fold and nothing
/// collected so far is returned.
pub async fn fold_tables<S>(rows: S) -> Result<Vec<TableInfo>>
where
    S: Stream<Item = Result<CatalogRow>>,
{
    let fold = rows
        .try_fold(TableFold::new(), |mut fold, row| async move {
            fold.push(row);
            Ok::<_, GatewayError>(fold)
        })
        .await?;

    Ok(fold.finish())
}
