//! Request and result types for the query API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a query request sent to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Cypher statement (read only)
    pub cypher: String,
    /// Dataset name
    pub dataset: String,
}

/// Row-major materialization of a column-major query result.
///
/// Column order follows the response schema. Every row holds a value
/// (possibly `Value::Null`) for every column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl RowSet {
    /// Build a row set from schema-ordered column names and row objects.
    pub fn new(columns: Vec<String>, rows: Vec<Map<String, Value>>) -> Self {
        Self { columns, rows }
    }

    /// Column names in schema order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows as column-name-to-value records.
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, top to bottom.
    /// Returns `None` if the column is not part of the schema.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        if !self.columns.iter().any(|column| column == name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(name).unwrap_or(&Value::Null))
                .collect(),
        )
    }
}
