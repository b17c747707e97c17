//! INSERT query builder.

use crate::error::OrmResult;
use crate::ident::validate_ident;
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::qb::update::Assignments;
use crate::value::Value;

/// INSERT query builder for a single row.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: String,
    values: Assignments,
}

impl InsertQb {
    /// Create a new INSERT query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: Assignments::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.values.insert(column, value);
        self
    }

    /// Fail unless the table and every column are plain identifiers.
    pub fn validate(&self) -> OrmResult<()> {
        validate_ident(&self.table)?;
        self.values.columns().try_for_each(validate_ident)
    }

    /// Build the INSERT statement. Without columns the row takes every default.
    pub fn build(&self) -> OrmResult<BuiltQuery> {
        self.validate()?;

        if self.values.is_empty() {
            return Ok(BuiltQuery::new(
                format!("INSERT INTO {} DEFAULT VALUES;", self.table),
                Vec::new(),
            ));
        }

        let mut params = ParamList::new();
        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        for (col, val) in self.values.iter() {
            columns.push(col);
            placeholders.push(format!("?{}", params.push(val.clone())));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok(BuiltQuery::new(sql, params.into_values()))
    }
}

impl SqlQb for InsertQb {
    fn table(&self) -> &str {
        &self.table
    }

    fn build_query(&self) -> OrmResult<BuiltQuery> {
        self.build()
    }
}

impl MutationQb for InsertQb {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_basic() {
        let q = InsertQb::new("users")
            .set("name", "alice")
            .set("email", "alice@example.com")
            .build()
            .unwrap();
        assert_eq!(q.sql, "INSERT INTO users (name, email) VALUES (?1, ?2);");
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn test_insert_default_values() {
        let q = InsertQb::new("users").build().unwrap();
        assert_eq!(q.sql, "INSERT INTO users DEFAULT VALUES;");
    }

    #[test]
    fn test_insert_rejects_bad_column() {
        assert!(InsertQb::new("users").set("name) VALUES (1); --", 1).build().is_err());
    }
}
