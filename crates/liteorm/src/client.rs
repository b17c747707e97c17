//! Storage seam: the generic client trait, result rows, and the SQLite client.

use crate::config::DaoConfig;
use crate::error::OrmResult;
use crate::value::Value;
use rusqlite::Connection;
use std::sync::Arc;

/// A fetched row: column names (shared by every row of one result) and values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        let columns = self.columns;
        self.values
            .into_iter()
            .enumerate()
            .map(move |(idx, v)| (columns[idx].clone(), v))
    }
}

/// Anything that accepts parameterized statements and returns rows.
///
/// Parameters are positional: `params[i]` binds placeholder `?{i + 1}`.
pub trait GenericClient {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;

    /// Execute an INSERT and return the row id the engine assigned.
    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<i64>;

    /// Execute a query and return the first row, if any.
    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }
}

/// SQLite client over one `rusqlite` connection.
///
/// Every statement is logged at `debug` on the `liteorm.sql` target. SQLite runs in
/// autocommit mode, so each mutating statement commits on its own.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Connection,
    max_sql_log_length: Option<usize>,
}

impl SqliteClient {
    /// Open (or create) the database described by `config`.
    pub fn open(config: &DaoConfig) -> OrmResult<Self> {
        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };

        if config.foreign_keys {
            conn.pragma_update(None, "foreign_keys", true)?;
        }
        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout)?;
        }

        tracing::debug!(
            target: "liteorm.sql",
            path = %config.path,
            foreign_keys = config.foreign_keys,
            "opened sqlite connection"
        );

        Ok(Self {
            conn,
            max_sql_log_length: config.max_sql_log_length,
        })
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            max_sql_log_length: DaoConfig::default().max_sql_log_length,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn log(&self, sql: &str, param_count: usize) {
        let sql = match self.max_sql_log_length {
            Some(max) => truncate_sql(sql, max),
            None => sql.to_string(),
        };
        tracing::debug!(target: "liteorm.sql", param_count, sql = %sql, "executing statement");
    }

    /// Run a query, stopping after `limit` rows when given.
    fn query_rows(&self, sql: &str, params: &[Value], limit: Option<usize>) -> OrmResult<Vec<Row>> {
        self.log(sql, params.len());

        let mut stmt = self.conn.prepare(sql)?;
        let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while limit.is_none_or(|max| out.len() < max) {
            let Some(row) = rows.next()? else { break };
            let values = (0..width)
                .map(|idx| row.get_ref(idx).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            out.push(Row::new(Arc::clone(&columns), values));
        }

        tracing::trace!(target: "liteorm.sql", rows = out.len(), "query finished");
        Ok(out)
    }
}

impl GenericClient for SqliteClient {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.query_rows(sql, params, None)
    }

    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query_rows(sql, params, Some(1))?.into_iter().next())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.log(sql, params.len());

        let affected = self
            .conn
            .execute(sql, rusqlite::params_from_iter(params.iter()))?;

        tracing::trace!(target: "liteorm.sql", affected, "statement finished");
        Ok(affected as u64)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<i64> {
        self.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }
}

/// Truncate to at most `max` chars, marking the cut with `...`.
fn truncate_sql(sql: &str, max: usize) -> String {
    match sql.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SqliteClient {
        SqliteClient::open(&DaoConfig::new()).unwrap()
    }

    #[test]
    fn test_query_returns_named_columns() {
        let client = client();
        let rows = client
            .query(
                "SELECT ?1 AS a, ?2 AS b;",
                &[Value::Integer(7), Value::from("x")],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), ["a", "b"]);
        assert_eq!(rows[0].get("b"), Some(&Value::from("x")));
        assert_eq!(rows[0].get("c"), None);
    }

    #[test]
    fn test_query_opt_stops_at_first_row() {
        let client = client();
        client
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT);", &[])
            .unwrap();
        for v in ["a", "b", "c"] {
            client.insert("INSERT INTO t (v) VALUES (?1);", &[Value::from(v)]).unwrap();
        }

        let row = client.query_opt("SELECT v FROM t;", &[]).unwrap().unwrap();
        assert_eq!(row.get("v"), Some(&Value::from("a")));
        assert_eq!(client.query_rows("SELECT v FROM t;", &[], Some(2)).unwrap().len(), 2);
        assert!(client.query_opt("SELECT v FROM t WHERE v = 'z';", &[]).unwrap().is_none());
    }

    #[test]
    fn test_insert_returns_row_id() {
        let client = client();
        client
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT);", &[])
            .unwrap();
        assert_eq!(client.insert("INSERT INTO t (v) VALUES (?1);", &[Value::from("a")]).unwrap(), 1);
        assert_eq!(client.insert("INSERT INTO t (v) VALUES (?1);", &[Value::from("b")]).unwrap(), 2);
        assert_eq!(
            client.execute("UPDATE t SET v = ?1;", &[Value::from("c")]).unwrap(),
            2
        );
    }

    #[test]
    fn test_storage_errors_pass_through() {
        let err = client().query("SELECT * FROM missing;", &[]).unwrap_err();
        assert!(matches!(err, crate::OrmError::Storage(_)));
    }

    #[test]
    fn test_truncate_sql() {
        assert_eq!(truncate_sql("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql("SELECT 1", 6), "SELECT...");
        assert_eq!(truncate_sql("ééé", 2), "éé...");
    }
}
