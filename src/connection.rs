//! DuckDB connection wrapper with schema bootstrap and query execution.
//!
//! Rows come back as `serde_json::Value` maps so query interfaces can
//! deserialize them straight into the typed models.

use crate::error::{Result, SwachhError};
use crate::schema;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Wraps a DuckDB connection holding the users, reports, rewards,
/// collection tasks and notifications tables.
pub struct Connection {
    conn: DuckDbConnection,
    /// Database file, or `None` for an in-memory database.
    pub path: Option<PathBuf>,
}

impl Connection {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = DuckDbConnection::open(&path)?;
        let conn = Self {
            conn,
            path: Some(path),
        };
        conn.ensure_schema()?;
        Ok(conn)
    }

    /// Open an in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let conn = Self { conn, path: None };
        conn.ensure_schema()?;
        Ok(conn)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        info!(
            path = %self
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            "database schema ready"
        );
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        debug!(sql, params = params.len(), "execute");
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let (column_names, column_count) = {
            let stmt_ref = rows_result.as_ref().ok_or_else(|| {
                SwachhError::InvalidArgument("statement produced no result set".into())
            })?;
            let names: Vec<String> = stmt_ref
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            (names, stmt_ref.column_count())
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and deserialize the first row, if any.
    pub fn execute_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<T>> {
        Ok(self.execute_into(sql, params)?.into_iter().next())
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Execute a data-modifying statement and return the affected row count.
    pub fn execute_update(&self, sql: &str, params: &[String]) -> Result<usize> {
        debug!(sql, params = params.len(), "execute_update");
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();
        Ok(self.conn.execute(sql, param_values.as_slice())?)
    }

    /// Run one or more statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Append rows from a newline-delimited JSON file to one of the tables.
    ///
    /// Columns are matched by name; omitted columns take their defaults, so
    /// seed files should leave `id` out and let the sequence assign it.
    /// Returns the number of rows inserted.
    pub fn import_ndjson<P: AsRef<Path>>(&self, table: &str, ndjson_path: P) -> Result<usize> {
        if !schema::TABLES.contains(&table) {
            return Err(SwachhError::InvalidArgument(format!(
                "Unknown table: {}",
                table
            )));
        }
        let path_fwd = ndjson_path
            .as_ref()
            .to_string_lossy()
            .replace('\\', "/")
            .replace('\'', "''");
        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO {} BY NAME \
                 SELECT * FROM read_json_auto('{}', format='newline_delimited')",
                table, path_fwd
            ),
            [],
        )?;
        info!(table, inserted, "imported ndjson rows");
        Ok(inserted)
    }

    /// Count the rows of one of the tables.
    pub fn count(&self, table: &str) -> Result<i64> {
        if !schema::TABLES.contains(&table) {
            return Err(SwachhError::InvalidArgument(format!(
                "Unknown table: {}",
                table
            )));
        }
        let value = self.execute_scalar(&format!("SELECT COUNT(*) FROM {}", table), &[])?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => serde_json::Value::Number(i.into()),
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        // Timestamps are formatted in SQL; anything else has no column here
        _ => serde_json::Value::Null,
    }
}
