use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::{
    DatabaseError,
    db::{
        column::ColumnInfo,
        row::{Row, RowData},
        value::Value,
    },
};

/// Store path used when none is given.
pub const DEFAULT_DB_PATH: &str = "database.db";

/// Response from running a statement through [`SqliteManager::query`].
///
/// Contains the result column names and the materialized rows.
#[derive(Debug)]
pub struct QueryResponse {
    /// Names of the result columns, in statement order.
    pub columns: Vec<String>,

    /// The rows returned by the statement.
    pub rows: Vec<Row>,
}

/// Session manager for one file-backed SQLite store.
///
/// `SqliteManager` is the primary interface of this crate. It owns at most
/// one open connection to the store at its configured path and exposes the
/// handful of operations the store needs:
/// - connect/disconnect lifecycle
/// - idempotent table creation
/// - parameterized single-row inserts
/// - ad-hoc queries with bound positional parameters
/// - introspection (list tables, describe columns)
///
/// # Lifecycle
///
/// The manager starts disconnected. Every data and schema operation requires
/// a prior successful [`SqliteManager::connect`]; calling one while
/// disconnected returns [`DatabaseError::NotConnected`]. Dropping the manager
/// closes the connection, so it is released on every exit path even if
/// [`SqliteManager::disconnect`] is never called.
///
/// Mutating operations auto-commit individually; there are no multi-statement
/// transaction boundaries.
#[derive(Debug)]
pub struct SqliteManager {
    /// Path of the store file. Created on first connect if absent.
    db_path: PathBuf,

    /// The open connection, if any. `None` while disconnected.
    conn: Option<Connection>,
}

impl Default for SqliteManager {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

impl SqliteManager {
    /// Creates a disconnected manager for the store at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            conn: None,
        }
    }

    /// The store path this manager was configured with.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the manager currently holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Opens the store, creating the file if it does not exist.
    ///
    /// A no-op when already connected; the manager never holds more than one
    /// connection. On failure the manager stays disconnected.
    pub fn connect(&mut self) -> Result<(), DatabaseError> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = Connection::open(&self.db_path).map_err(DatabaseError::Connection)?;
        self.conn = Some(conn);
        Ok(())
    }

    /// Releases the connection if one is open.
    ///
    /// Idempotent and best-effort: a failed close is not reported since the
    /// handle is gone either way.
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            let _ = conn.close();
        }
    }

    /// Borrows the open connection, or reports the lifecycle fault.
    fn conn(&self) -> Result<&Connection, DatabaseError> {
        self.conn.as_ref().ok_or(DatabaseError::NotConnected)
    }

    /// Creates a table if it does not already exist.
    ///
    /// `columns` is a non-empty ordered sequence of raw column-definition
    /// strings (`"id INTEGER PRIMARY KEY"`, `"name TEXT NOT NULL"`, table
    /// constraints like `"FOREIGN KEY (x) REFERENCES t (y)"`). The
    /// definitions are passed to the engine as written; only the engine
    /// validates them. Running the same definition twice is a no-op.
    pub fn create_table(&self, name: &str, columns: &[&str]) -> Result<(), DatabaseError> {
        let conn = self.conn()?;

        if columns.is_empty() {
            return Err(DatabaseError::InvalidRequest(format!(
                "table {name} needs at least one column definition"
            )));
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(name),
            columns.join(", ")
        );
        conn.execute(&sql, []).map_err(DatabaseError::Schema)?;
        Ok(())
    }

    /// Inserts one row, committing immediately.
    ///
    /// The statement is built from the row's column names; every value is
    /// bound as a parameter, never spliced into the SQL text.
    pub fn insert_row(&self, table: &str, row: &RowData) -> Result<(), DatabaseError> {
        let conn = self.conn()?;

        if row.is_empty() {
            return Err(DatabaseError::InvalidRequest(format!(
                "insert into {table} has no columns"
            )));
        }

        let columns = row.columns().map(quote_ident).collect::<Vec<_>>().join(", ");
        let placeholders = (1..=row.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns,
            placeholders
        );
        conn.execute(&sql, rusqlite::params_from_iter(row.values()))
            .map_err(DatabaseError::Data)?;
        Ok(())
    }

    /// Runs an arbitrary statement with bound positional parameters and
    /// returns the materialized result.
    ///
    /// Zero rows is an `Ok` response with an empty `rows` vector; a statement
    /// that fails to prepare or execute is an `Err`. The two are never
    /// conflated. Write statements are accepted and produce no rows.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResponse, DatabaseError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(sql).map_err(DatabaseError::Query)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = Vec::new();
        let mut result = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(DatabaseError::Query)?;

        while let Some(row) = result.next().map_err(DatabaseError::Query)? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let value = row.get_ref(index).map_err(DatabaseError::Query)?;
                values.push(Value::from(value));
            }
            rows.push(Row::new(values));
        }

        Ok(QueryResponse { columns, rows })
    }

    /// Lists the tables in the store, sorted by name.
    ///
    /// A fresh store yields an empty vector.
    pub fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .map_err(DatabaseError::Query)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(DatabaseError::Query)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(DatabaseError::Query)?;
        Ok(names)
    }

    /// Returns per-column metadata for a table.
    ///
    /// Backed by `pragma_table_info` with the table name bound as a
    /// parameter. A table the store does not know yields
    /// [`DatabaseError::TableNotFound`] rather than empty metadata.
    pub fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT cid, name, type, \"notnull\", dflt_value, pk \
                 FROM pragma_table_info(?1)",
            )
            .map_err(DatabaseError::Query)?;
        let columns = stmt
            .query_map([name], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    decl_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    primary_key: row.get::<_, i64>(5)? != 0,
                })
            })
            .map_err(DatabaseError::Query)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::Query)?;

        if columns.is_empty() {
            return Err(DatabaseError::TableNotFound(name.to_string()));
        }
        Ok(columns)
    }
}

/// Double-quote escapes an identifier the manager splices into SQL it builds.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn connected_manager(dir: &TempDir, file: &str) -> SqliteManager {
        let mut manager = SqliteManager::new(dir.path().join(file));
        manager.connect().expect("connect should succeed");
        manager
    }

    #[test]
    fn test_connect_creates_store_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.db");

        let mut manager = SqliteManager::new(&path);
        assert!(!manager.is_connected());

        manager.connect().unwrap();
        assert!(manager.is_connected());
        assert!(path.exists());
    }

    #[test]
    fn test_connect_twice_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let mut manager = connected_manager(&dir, "twice.db");

        assert!(manager.connect().is_ok());
        assert!(manager.is_connected());
    }

    #[test]
    fn test_operations_require_connection() {
        let manager = SqliteManager::new("never_opened.db");

        assert!(matches!(
            manager.create_table("t", &["id INTEGER"]),
            Err(DatabaseError::NotConnected)
        ));
        assert!(matches!(
            manager.insert_row("t", &RowData::new().set("id", 1)),
            Err(DatabaseError::NotConnected)
        ));
        assert!(matches!(
            manager.query("SELECT 1", &[]),
            Err(DatabaseError::NotConnected)
        ));
        assert!(matches!(
            manager.list_tables(),
            Err(DatabaseError::NotConnected)
        ));
        assert!(matches!(
            manager.describe_table("t"),
            Err(DatabaseError::NotConnected)
        ));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut manager = connected_manager(&dir, "close.db");

        manager.disconnect();
        assert!(!manager.is_connected());
        manager.disconnect();
        assert!(!manager.is_connected());
    }

    #[test]
    fn test_create_table_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "schema.db");
        let columns = ["id INTEGER PRIMARY KEY", "name TEXT"];

        manager.create_table("items", &columns).unwrap();
        manager.create_table("items", &columns).unwrap();

        assert_eq!(manager.list_tables().unwrap(), vec!["items"]);
    }

    #[test]
    fn test_create_table_rejects_empty_definitions() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "empty.db");

        assert!(matches!(
            manager.create_table("items", &[]),
            Err(DatabaseError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_malformed_definition_reports_schema_error() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "bad_schema.db");

        assert!(matches!(
            manager.create_table("items", &["id BANANA OR SOMETHING ELSE ENTIRELY ((("]),
            Err(DatabaseError::Schema(_))
        ));
    }

    #[test]
    fn test_insert_then_query_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "round_trip.db");

        manager
            .create_table(
                "test_table",
                &["id INTEGER PRIMARY KEY", "name TEXT", "value INTEGER"],
            )
            .unwrap();
        manager
            .insert_row(
                "test_table",
                &RowData::new().set("id", 1).set("name", "Test Item").set("value", 100),
            )
            .unwrap();

        let response = manager.query("SELECT * FROM test_table", &[]).unwrap();
        assert_eq!(response.columns, vec!["id", "name", "value"]);
        assert_eq!(
            response.rows,
            vec![Row::new(vec![
                Value::Integer(1),
                Value::Text("Test Item".to_string()),
                Value::Integer(100),
            ])]
        );
    }

    #[test]
    fn test_insert_rejects_empty_row() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "empty_row.db");
        manager.create_table("items", &["id INTEGER"]).unwrap();

        assert!(matches!(
            manager.insert_row("items", &RowData::new()),
            Err(DatabaseError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_unique_violation_reports_data_error() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "unique.db");

        manager
            .create_table("users", &["id INTEGER PRIMARY KEY", "username TEXT UNIQUE NOT NULL"])
            .unwrap();
        manager
            .insert_row("users", &RowData::new().set("id", 1).set("username", "alice"))
            .unwrap();

        let duplicate =
            manager.insert_row("users", &RowData::new().set("id", 2).set("username", "alice"));
        assert!(matches!(duplicate, Err(DatabaseError::Data(_))));

        let count = manager.query("SELECT COUNT(*) FROM users", &[]).unwrap();
        assert_eq!(count.rows[0].values, vec![Value::Integer(1)]);
    }

    #[test]
    fn test_query_binds_positional_parameters() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "params.db");

        manager.create_table("items", &["id INTEGER", "name TEXT"]).unwrap();
        manager
            .insert_row("items", &RowData::new().set("id", 1).set("name", "keep"))
            .unwrap();
        manager
            .insert_row("items", &RowData::new().set("id", 2).set("name", "skip"))
            .unwrap();

        let response = manager
            .query(
                "SELECT name FROM items WHERE id = ?1",
                &[Value::Integer(1)],
            )
            .unwrap();
        assert_eq!(response.rows, vec![Row::new(vec![Value::Text("keep".to_string())])]);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "zero_rows.db");
        manager.create_table("items", &["id INTEGER"]).unwrap();

        let response = manager.query("SELECT * FROM items", &[]).unwrap();
        assert!(response.rows.is_empty());
        assert_eq!(response.columns, vec!["id"]);
    }

    #[test]
    fn test_failed_query_is_an_error_not_empty() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "bad_query.db");

        assert!(matches!(
            manager.query("SELECT * FROM no_such_table", &[]),
            Err(DatabaseError::Query(_))
        ));
        assert!(matches!(
            manager.query("THIS IS NOT SQL", &[]),
            Err(DatabaseError::Query(_))
        ));
    }

    #[test]
    fn test_list_tables() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "catalog.db");

        assert!(manager.list_tables().unwrap().is_empty());

        manager.create_table("t", &["id INTEGER"]).unwrap();
        manager.create_table("a", &["id INTEGER"]).unwrap();

        assert_eq!(manager.list_tables().unwrap(), vec!["a", "t"]);
    }

    #[test]
    fn test_describe_missing_table() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "missing.db");

        assert!(matches!(
            manager.describe_table("ghosts"),
            Err(DatabaseError::TableNotFound(name)) if name == "ghosts"
        ));
    }

    #[test]
    fn test_describe_reports_column_metadata() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "describe.db");

        manager
            .create_table(
                "users",
                &[
                    "id INTEGER PRIMARY KEY",
                    "username TEXT NOT NULL",
                    "created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
                ],
            )
            .unwrap();

        let columns = manager.describe_table("users").unwrap();
        assert_eq!(columns.len(), 3);

        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].cid, 0);
        assert_eq!(columns[0].decl_type, "INTEGER");
        assert!(columns[0].primary_key);

        assert_eq!(columns[1].name, "username");
        assert!(columns[1].not_null);
        assert!(!columns[1].primary_key);

        assert_eq!(columns[2].name, "created_at");
        assert_eq!(
            columns[2].default_value.as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
    }

    #[test]
    fn test_quoted_identifiers_survive_odd_names() {
        let dir = TempDir::new().unwrap();
        let manager = connected_manager(&dir, "odd_names.db");

        manager.create_table("order", &["id INTEGER"]).unwrap();
        manager.insert_row("order", &RowData::new().set("id", 5)).unwrap();

        let response = manager.query("SELECT id FROM \"order\"", &[]).unwrap();
        assert_eq!(response.rows, vec![Row::new(vec![Value::Integer(5)])]);
    }

    #[test]
    fn test_full_session_scenario() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");

        let mut manager = SqliteManager::new(&path);
        manager.connect().unwrap();
        manager
            .create_table(
                "test_table",
                &["id INTEGER PRIMARY KEY", "name TEXT", "value INTEGER"],
            )
            .unwrap();
        manager
            .insert_row(
                "test_table",
                &RowData::new().set("id", 1).set("name", "Test Item").set("value", 100),
            )
            .unwrap();

        let response = manager.query("SELECT * FROM test_table", &[]).unwrap();
        assert_eq!(response.rows.len(), 1);

        manager.disconnect();
        std::fs::remove_file(&path).expect("store file should be removable after disconnect");
    }
}
