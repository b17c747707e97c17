//! Statement builders.
//!
//! Every builder owns one target table and a [`Filter`](crate::Filter); conditions
//! are AND-joined in the order they are added, and that order is also the parameter
//! order. Placeholders are numbered at build time (`?1`, `?2`, ...).
//!
//! # Safe defaults
//!
//! - DELETE refuses to build without a condition ([`OrmError::MissingCondition`]).
//! - UPDATE refuses to build without an assignment ([`OrmError::EmptyAssignmentSet`]).
//! - Table and column names must be plain identifiers; anything else fails at build
//!   time with [`OrmError::SchemaViolation`].
//!   An UPDATE *without conditions* is legal and touches every row.
//!
//! # Usage
//!
//! ```
//! use liteorm::qb;
//!
//! let q = qb::select("users").eq("name", "Kukku").build()?;
//! assert_eq!(q.sql, "SELECT * FROM users WHERE name = ?1;");
//!
//! let q = qb::update("posts")
//!     .set("title", "Post Edited 1")
//!     .eq("title", "Post 1")
//!     .eq("id", 1)
//!     .build()?;
//! assert_eq!(q.sql, "UPDATE posts SET title = ?1 WHERE title = ?2 AND id = ?3;");
//!
//! assert!(qb::delete("posts").build().is_err());
//! # Ok::<(), liteorm::OrmError>(())
//! ```
//!
//! [`OrmError::MissingCondition`]: crate::OrmError::MissingCondition
//! [`OrmError::EmptyAssignmentSet`]: crate::OrmError::EmptyAssignmentSet
//! [`OrmError::SchemaViolation`]: crate::OrmError::SchemaViolation

/// Condition methods shared by every builder that carries a `filter: Filter` field.
macro_rules! impl_condition_methods {
    () => {
        /// Add a condition built from an operator.
        pub fn add_condition<T: Into<$crate::value::Value>>(
            mut self,
            column: &str,
            op: $crate::condition::Op<T>,
        ) -> Self {
            self.filter.push($crate::condition::Condition::new(column, op));
            self
        }

        /// Add a prepared condition.
        pub fn and(mut self, condition: $crate::condition::Condition) -> Self {
            self.filter.push(condition);
            self
        }

        /// Append every condition of `filter`, keeping its order.
        pub fn filter(mut self, filter: &$crate::condition::Filter) -> Self {
            for condition in filter.conditions() {
                self.filter.push(condition.clone());
            }
            self
        }

        /// Add WHERE: column = value
        pub fn eq(self, column: &str, value: impl Into<$crate::value::Value>) -> Self {
            self.and($crate::condition::Condition::eq(column, value))
        }

        /// Add WHERE: column != value
        pub fn ne(self, column: &str, value: impl Into<$crate::value::Value>) -> Self {
            self.and($crate::condition::Condition::ne(column, value))
        }

        /// Add WHERE: column > value
        pub fn gt(self, column: &str, value: impl Into<$crate::value::Value>) -> Self {
            self.and($crate::condition::Condition::gt(column, value))
        }

        /// Add WHERE: column < value
        pub fn lt(self, column: &str, value: impl Into<$crate::value::Value>) -> Self {
            self.and($crate::condition::Condition::lt(column, value))
        }

        /// Add WHERE: column IN (values...)
        pub fn in_list<T: Into<$crate::value::Value>>(self, column: &str, values: Vec<T>) -> Self {
            self.and($crate::condition::Condition::in_list(column, values))
        }

        /// Add WHERE: column NOT IN (values...)
        pub fn not_in<T: Into<$crate::value::Value>>(self, column: &str, values: Vec<T>) -> Self {
            self.and($crate::condition::Condition::not_in(column, values))
        }

        /// Conditions added so far.
        pub fn conditions(&self) -> &[$crate::condition::Condition] {
            self.filter.conditions()
        }
    };
}

mod delete;
mod insert;
pub(crate) mod param;
mod select;
mod traits;
mod update;

pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use param::ParamList;
pub use select::SelectQb;
pub use traits::{BuiltQuery, MutationQb, SqlQb};
pub use update::{Assignments, UpdateQb};

/// Create a SELECT query builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create an INSERT query builder for the given table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE query builder for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE query builder for the given table.
///
/// Building without at least one condition fails.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}
