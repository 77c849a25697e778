//! Parameterized row insertion
//!
//! The normalizer produces rows as ordered `(column, value)` lists. Table
//! and column names are checked against the declared schema before an
//! `INSERT` statement is built, so only values are ever bound as
//! parameters.

use crate::db::schema::quote_ident;
use crate::db::table_schemas::columns_for;
use crate::{Error, Result};
use sqlx::SqliteConnection;

/// A single bound value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Null,
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

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map(SqlValue::Text).unwrap_or(SqlValue::Null)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<usize> for SqlValue {
    fn from(value: usize) -> Self {
        SqlValue::Integer(value as i64)
    }
}

/// One row destined for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub table: &'static str,
    pub values: Vec<(String, SqlValue)>,
}

impl TableRow {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            values: Vec::new(),
        }
    }

    /// Append a column value (builder style)
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Value bound to `column`, if present
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Build the INSERT statement for `row` after validating table and columns
pub fn insert_sql(row: &TableRow) -> Result<String> {
    let declared = columns_for(row.table)
        .ok_or_else(|| Error::InvalidInput(format!("unknown table '{}'", row.table)))?;

    for (column, _) in &row.values {
        if !declared.iter().any(|c| &c.name == column) {
            return Err(Error::InvalidInput(format!(
                "table '{}' has no column '{}'",
                row.table, column
            )));
        }
    }

    let columns = row
        .values
        .iter()
        .map(|(column, _)| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; row.values.len()].join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(row.table),
        columns,
        placeholders
    ))
}

/// Insert one row on `conn` (usually the batch transaction)
pub async fn insert_row(conn: &mut SqliteConnection, row: &TableRow) -> Result<()> {
    let sql = insert_sql(row)?;

    let mut query = sqlx::query(&sql);
    for (_, value) in &row.values {
        query = match value {
            SqlValue::Text(text) => query.bind(text.as_str()),
            SqlValue::Integer(number) => query.bind(*number),
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query.execute(&mut *conn).await?;

    Ok(())
}
