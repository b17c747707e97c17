//! DELETE query builder.

use crate::condition::Filter;
use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};

/// DELETE query builder.
///
/// There is no way to delete every row: building without conditions fails with
/// [`OrmError::MissingCondition`].
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    filter: Filter,
}

impl DeleteQb {
    /// Create a new DELETE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: Filter::new(),
        }
    }

    impl_condition_methods!();

    /// Fail unless the table and every condition column are plain identifiers.
    pub fn validate(&self) -> OrmResult<()> {
        validate_ident(&self.table)?;
        self.filter.validate()
    }

    /// Build the DELETE statement and its parameters.
    pub fn build(&self) -> OrmResult<BuiltQuery> {
        // Count-based guard: a condition that is always false at runtime still passes.
        if self.filter.is_empty() {
            return Err(OrmError::MissingCondition {
                table: self.table.clone(),
            });
        }

        self.validate()?;

        let mut params = ParamList::new();
        let where_sql = self.filter.build(&mut params);
        let sql = format!("DELETE FROM {} WHERE {};", self.table, where_sql);

        Ok(BuiltQuery::new(sql, params.into_values()))
    }
}

impl SqlQb for DeleteQb {
    fn table(&self) -> &str {
        &self.table
    }

    fn build_query(&self) -> OrmResult<BuiltQuery> {
        self.build()
    }
}

impl MutationQb for DeleteQb {}
