//! UPDATE query builder.

use crate::client::GenericClient;
use crate::condition::Filter;
use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::value::Value;
use indexmap::IndexMap;

/// Ordered column → value assignments.
///
/// Assigning a column twice keeps its first position and the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignments {
    values: IndexMap<String, Value>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a column (chaining form).
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// UPDATE query builder.
///
/// Conditions are optional: without any, the statement updates every row of the table.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    assignments: Assignments,
    filter: Filter,
}

impl UpdateQb {
    /// Create a new UPDATE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            assignments: Assignments::new(),
            filter: Filter::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.assignments.insert(column, value);
        self
    }

    /// Set several columns at once, in their iteration order.
    pub fn set_all(mut self, assignments: &Assignments) -> Self {
        for (column, value) in assignments.iter() {
            self.assignments.insert(column, value.clone());
        }
        self
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    impl_condition_methods!();

    /// Whether the statement would touch every row.
    pub fn is_unconditioned(&self) -> bool {
        self.filter.is_empty()
    }

    /// Fail unless the table and every column are plain identifiers.
    pub fn validate(&self) -> OrmResult<()> {
        validate_ident(&self.table)?;
        self.assignments.columns().try_for_each(validate_ident)?;
        self.filter.validate()
    }

    /// Build the UPDATE statement: assignment values first, then condition values.
    pub fn build(&self) -> OrmResult<BuiltQuery> {
        if self.assignments.is_empty() {
            return Err(OrmError::EmptyAssignmentSet {
                table: self.table.clone(),
            });
        }
        self.validate()?;

        let mut params = ParamList::new();
        let set_parts: Vec<String> = self
            .assignments
            .iter()
            .map(|(col, val)| format!("{} = ?{}", col, params.push(val.clone())))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));
        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.build(&mut params));
        }
        sql.push(';');

        Ok(BuiltQuery::new(sql, params.into_values()))
    }
}

impl SqlQb for UpdateQb {
    fn table(&self) -> &str {
        &self.table
    }

    fn build_query(&self) -> OrmResult<BuiltQuery> {
        self.build()
    }
}

impl MutationQb for UpdateQb {
    fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let q = self.build()?;
        if self.is_unconditioned() {
            tracing::warn!(
                target: "liteorm.sql",
                table = %self.table,
                "executing UPDATE without conditions; every row will be updated"
            );
        }
        conn.execute(&q.sql, &q.params)
    }
}
