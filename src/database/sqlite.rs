use crate::database::{DatabaseExecutor, QueryResult};
use crate::error::{FolioError, Result};
use anyhow::Context;
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const EXECUTION_FAILED: &str = "Query execution failed. Please check the query syntax.";

static LEADING_TOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^(\s*SELECT\s+(?:DISTINCT\s+)?)TOP\s*\(?\s*(\d+)\s*\)?((?:\s+PERCENT)?(?:\s+WITH\s+TIES)?)\s+",
    )
        .expect("valid TOP pattern")
});

/// SQLite-backed warehouse executor
///
/// Opens the database file on every [`DatabaseExecutor::connect`] and
/// drops the handle on close. Warehouse SQL written in the T-SQL dialect
/// (`SELECT TOP n ...`) is rewritten to a trailing `LIMIT n` first.
pub struct SqliteExecutor {
    path: Option<PathBuf>,
    read_only: bool,
    conn: Option<Connection>,
}

impl SqliteExecutor {
    /// Executor for the database file at `path`
    pub fn new<P: Into<PathBuf>>(path: P, read_only: bool) -> Self {
        Self {
            path: Some(path.into()),
            read_only,
            conn: None,
        }
    }

    /// Executor backed by a fresh in-memory database on every connect
    pub fn in_memory() -> Self {
        Self {
            path: None,
            read_only: false,
            conn: None,
        }
    }

    /// Path of the database file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn open(&self) -> Result<Connection> {
        let conn = match &self.path {
            None => Connection::open_in_memory().context("Failed to open in-memory database"),
            Some(path) if self.read_only => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open {} read-only", path.display())),
            Some(path) => {
                Connection::open(path).with_context(|| format!("Failed to open {}", path.display()))
            }
        };
        conn.map_err(|e| FolioError::Database(format!("Database connection failed: {:#}", e)).into())
    }
}

/// Rewrite a leading `SELECT [DISTINCT] TOP n` into a trailing `LIMIT n`
///
/// Statements without a leading `TOP` are returned with only a trailing
/// semicolon removed. `TOP n PERCENT` and `TOP n WITH TIES` have no `LIMIT`
/// equivalent and are left for SQLite to reject.
///
/// # Examples
///
/// ```
/// use folio::database::sqlite::translate_top_to_limit;
///
/// assert_eq!(
///     translate_top_to_limit("SELECT TOP 5 AssetName FROM DimAsset ORDER BY AssetName"),
///     "SELECT AssetName FROM DimAsset ORDER BY AssetName LIMIT 5"
/// );
/// ```
pub fn translate_top_to_limit(sql: &str) -> String {
    let trimmed = sql.trim().trim_end_matches(';').trim_end();
    match LEADING_TOP.captures(trimmed) {
        Some(caps) if caps.get(3).is_some_and(|m| !m.as_str().is_empty()) => {
            tracing::debug!("TOP modifier has no LIMIT equivalent; statement left as is");
            trimmed.to_string()
        }
        Some(caps) => {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let limit = caps.get(2).map_or("", |m| m.as_str());
            let rest = &trimmed[caps.get(0).map_or(0, |m| m.end())..];
            format!("{}{} LIMIT {}", prefix, rest.trim_end(), limit)
        }
        None => trimmed.to_string(),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<{} bytes>", bytes.len())),
    }
}

impl DatabaseExecutor for SqliteExecutor {
    fn connect(&mut self) -> Result<()> {
        if self.conn.is_none() {
            self.conn = Some(self.open()?);
            tracing::debug!(
                "Opened warehouse connection: {}",
                self.path
                    .as_ref()
                    .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
            );
        }
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| FolioError::Database("Database connection failed".to_string()))?;

        let sql = translate_top_to_limit(sql);
        tracing::debug!("Executing SQL: {}", sql);

        let mut stmt = conn.prepare(&sql).map_err(|e| {
            tracing::warn!("SQL rejected by warehouse: {}", e);
            FolioError::Execution(EXECUTION_FAILED.to_string())
        })?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = stmt.query([]).map_err(|e| {
            tracing::warn!("Warehouse failed to run query: {}", e);
            FolioError::Execution(EXECUTION_FAILED.to_string())
        })?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| {
            tracing::warn!("Warehouse failed while reading rows: {}", e);
            FolioError::Execution(EXECUTION_FAILED.to_string())
        })? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row
                    .get_ref(i)
                    .map_err(|e| FolioError::Execution(format!("Failed to read column {}: {}", i, e)))?;
                values.push(to_json(value));
            }
            out.push(values);
        }

        Ok(QueryResult::new(columns, out))
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!("Failed to close warehouse connection cleanly: {}", e);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
}
