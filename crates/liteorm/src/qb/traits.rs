//! Trait definitions for query builders.

use crate::client::{GenericClient, Row};
use crate::error::OrmResult;
use crate::value::Value;

/// The result of building a query: statement text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// Base trait for all query builders.
pub trait SqlQb {
    /// Target table.
    fn table(&self) -> &str;

    /// Render the statement. Builders are not consumed, so this can be called repeatedly.
    fn build_query(&self) -> OrmResult<BuiltQuery>;

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> OrmResult<String> {
        self.build_query().map(|q| q.sql)
    }

    /// Execute the query and return all rows.
    fn query(&self, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
        let q = self.build_query()?;
        conn.query(&q.sql, &q.params)
    }
}

/// Trait for mutation builders (INSERT/UPDATE/DELETE).
pub trait MutationQb: SqlQb {
    /// Execute and return the affected row count.
    fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let q = self.build_query()?;
        conn.execute(&q.sql, &q.params)
    }
}
