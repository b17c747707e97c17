//! SELECT query builder.

use crate::condition::Filter;
use crate::error::OrmResult;
use crate::ident::validate_ident;
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, SqlQb};

/// SELECT query builder.
#[derive(Clone, Debug)]
pub struct SelectQb {
    table: String,
    /// Selected columns (empty = `*`)
    columns: Vec<String>,
    filter: Filter,
}

impl SelectQb {
    /// Create a new SELECT query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filter: Filter::new(),
        }
    }

    /// Restrict the selected columns. Without this call every column is selected.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add one selected column.
    pub fn column(mut self, col: &str) -> Self {
        self.columns.push(col.to_string());
        self
    }

    /// Selected columns (empty means `*`).
    pub fn selected_columns(&self) -> &[String] {
        &self.columns
    }

    impl_condition_methods!();

    /// Fail unless the table and every column are plain identifiers.
    pub fn validate(&self) -> OrmResult<()> {
        validate_ident(&self.table)?;
        self.columns.iter().try_for_each(|c| validate_ident(c))?;
        self.filter.validate()
    }

    /// Build the SELECT statement and its parameters.
    pub fn build(&self) -> OrmResult<BuiltQuery> {
        self.validate()?;

        let mut params = ParamList::new();

        let fields = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", fields, self.table);

        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.build(&mut params));
        }
        sql.push(';');

        Ok(BuiltQuery::new(sql, params.into_values()))
    }
}

impl SqlQb for SelectQb {
    fn table(&self) -> &str {
        &self.table
    }

    fn build_query(&self) -> OrmResult<BuiltQuery> {
        self.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_select_all() {
        let q = SelectQb::new("users").build().unwrap();
        assert_eq!(q.sql, "SELECT * FROM users;");
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_select_columns() {
        let q = SelectQb::new("users").columns(&["id", "name"]).build().unwrap();
        assert_eq!(q.sql, "SELECT id, name FROM users;");
    }

    #[test]
    fn test_select_where() {
        let q = SelectQb::new("users")
            .column("name")
            .gt("id", 1)
            .ne("name", "Kukku")
            .build()
            .unwrap();
        assert_eq!(q.sql, "SELECT name FROM users WHERE id > ?1 AND name != ?2;");
        assert_eq!(q.params, vec![Value::Integer(1), Value::from("Kukku")]);
    }

    #[test]
    fn test_select_rejects_expressions() {
        let err = SelectQb::new("users")
            .columns(&["sqlite_version() AS name"])
            .build()
            .unwrap_err();
        assert!(matches!(err, crate::OrmError::SchemaViolation(_)));

        assert!(SelectQb::new("users; DROP TABLE users").build().is_err());
        assert!(SelectQb::new("users").eq("id = 1 OR 1", 1).build().is_err());
    }
}
