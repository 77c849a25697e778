//! Declarative table layouts and strict schema verification
//!
//! Each corpus table is declared once through [`TableSchema`]. The
//! declaration drives `CREATE TABLE` for a fresh store and is compared with
//! `PRAGMA table_info` when the table already exists. Existing tables are
//! never altered: any difference is reported as [`Error::Schema`].

use crate::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::fmt;
use tracing::{debug, info};

/// One declared column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// Declared SQL type ("TEXT", "INTEGER")
    pub sql_type: String,
    pub not_null: bool,
    /// Component of the (possibly composite) primary key
    pub primary_key: bool,
    /// Literal SQL default
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            default_value: None,
        }
    }

    /// Key component; key columns are always NOT NULL
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    fn to_sql(&self) -> String {
        let mut def = format!("{} {}", quote_ident(&self.name), self.sql_type);
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default_value {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }
}

/// `columns` of the declaring table reference `ref_columns` of `ref_table`
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub columns: Vec<&'static str>,
    pub ref_table: &'static str,
    pub ref_columns: Vec<&'static str>,
}

impl ForeignKey {
    pub fn new(
        columns: &[&'static str],
        ref_table: &'static str,
        ref_columns: &[&'static str],
    ) -> Self {
        Self {
            columns: columns.to_vec(),
            ref_table,
            ref_columns: ref_columns.to_vec(),
        }
    }
}

/// Layout of one table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Columns in creation order
    fn expected_columns() -> Vec<ColumnDefinition>;

    fn foreign_keys() -> Vec<ForeignKey> {
        Vec::new()
    }
}

/// Column as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq)]
pub struct StoredColumn {
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub primary_key: bool,
}

/// A difference between a declared and a stored table
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    MissingColumn(String),
    UnexpectedColumn(String),
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
    NotNullMismatch(String),
    PrimaryKeyMismatch(String),
}

impl fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDrift::MissingColumn(column) => write!(f, "column '{}' is missing", column),
            SchemaDrift::UnexpectedColumn(column) => {
                write!(f, "column '{}' is not declared", column)
            }
            SchemaDrift::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column '{}' has type '{}', expected '{}'",
                column, actual, expected
            ),
            SchemaDrift::NotNullMismatch(column) => {
                write!(f, "column '{}' differs in NOT NULL", column)
            }
            SchemaDrift::PrimaryKeyMismatch(column) => {
                write!(f, "column '{}' differs in key membership", column)
            }
        }
    }
}

/// Quote an identifier; header attribute columns are camelCase
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| quote_ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE TABLE IF NOT EXISTS` for a declared table
pub fn create_table_sql<T: TableSchema>() -> String {
    let columns = T::expected_columns();
    let mut parts: Vec<String> = columns.iter().map(ColumnDefinition::to_sql).collect();

    let key: Vec<&str> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();
    if !key.is_empty() {
        parts.push(format!("PRIMARY KEY ({})", quote_list(&key)));
    }

    for fk in T::foreign_keys() {
        parts.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_list(&fk.columns),
            quote_ident(fk.ref_table),
            quote_list(&fk.ref_columns)
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quote_ident(T::table_name()),
        parts.join(",\n    ")
    )
}

pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Stored columns of `table_name` in table order
pub async fn stored_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<StoredColumn>> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table_name));
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| StoredColumn {
            name: row.get("name"),
            type_name: row.get("type"),
            not_null: row.get::<i32, _>("notnull") != 0,
            primary_key: row.get::<i32, _>("pk") != 0,
        })
        .collect())
}

/// Every difference between `declared` and `stored`
pub fn schema_drift(declared: &[ColumnDefinition], stored: &[StoredColumn]) -> Vec<SchemaDrift> {
    let mut drift = Vec::new();

    for column in declared {
        let Some(found) = stored.iter().find(|s| s.name == column.name) else {
            drift.push(SchemaDrift::MissingColumn(column.name.clone()));
            continue;
        };
        if !same_affinity(&column.sql_type, &found.type_name) {
            drift.push(SchemaDrift::TypeMismatch {
                column: column.name.clone(),
                expected: column.sql_type.clone(),
                actual: found.type_name.clone(),
            });
        }
        if column.not_null != found.not_null {
            drift.push(SchemaDrift::NotNullMismatch(column.name.clone()));
        }
        if column.primary_key != found.primary_key {
            drift.push(SchemaDrift::PrimaryKeyMismatch(column.name.clone()));
        }
    }

    drift.extend(
        stored
            .iter()
            .filter(|s| !declared.iter().any(|c| c.name == s.name))
            .map(|s| SchemaDrift::UnexpectedColumn(s.name.clone())),
    );

    drift
}

/// SQLite type affinity of two type names agrees
fn same_affinity(declared: &str, stored: &str) -> bool {
    let affinity = |t: &str| {
        let t = t.to_uppercase();
        if t.contains("INT") {
            "INTEGER"
        } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
            "TEXT"
        } else {
            "OTHER"
        }
    };
    declared.eq_ignore_ascii_case(stored) || affinity(declared) == affinity(stored)
}

/// Create `T`'s table if absent, otherwise require the stored layout to match exactly
pub async fn ensure_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let table_name = T::table_name();

    if !table_exists(pool, table_name).await? {
        sqlx::query(&create_table_sql::<T>()).execute(pool).await?;
        info!("Created table '{}'", table_name);
        return Ok(());
    }

    let stored = stored_columns(pool, table_name).await?;
    let drift = schema_drift(&T::expected_columns(), &stored);
    if !drift.is_empty() {
        let details: Vec<String> = drift.iter().map(ToString::to_string).collect();
        return Err(Error::Schema(format!(
            "table '{}' does not match its declaration: {}",
            table_name,
            details.join("; ")
        )));
    }

    debug!("Table '{}' matches its declaration", table_name);
    Ok(())
}
