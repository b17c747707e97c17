//! Error types for liteorm

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type alias for liteorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for schema, builder and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// UPDATE built without any SET assignment
    #[error("UPDATE {table}: assignment set is empty")]
    EmptyAssignmentSet { table: String },

    /// DELETE built without any condition
    #[error("DELETE FROM {table}: at least one condition is required")]
    MissingCondition { table: String },

    /// Invalid schema declaration, or an operation the schema cannot support
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Column or attribute outside the known field set
    #[error("Unknown field '{field}' on '{table}'")]
    UnknownField { table: String, field: String },

    /// Error reported by the storage engine, passed through unchanged
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Attribute decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),
}

impl OrmError {
    /// Create a schema violation error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaViolation(message.into())
    }

    /// Create an unknown field error
    pub fn unknown_field(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is the DELETE guard error
    pub fn is_missing_condition(&self) -> bool {
        matches!(self, Self::MissingCondition { .. })
    }

    /// Check if this is the empty UPDATE error
    pub fn is_empty_assignment_set(&self) -> bool {
        matches!(self, Self::EmptyAssignmentSet { .. })
    }

    /// Check if this is a unique (or primary key) constraint violation
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.extended_code(),
            Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        )
    }

    /// Check if this is a foreign key constraint violation
    pub fn is_foreign_key_violation(&self) -> bool {
        self.extended_code() == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }

    /// Check if this is a NOT NULL constraint violation
    pub fn is_not_null_violation(&self) -> bool {
        self.extended_code() == Some(rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL)
    }

    fn extended_code(&self) -> Option<i32> {
        match self {
            Self::Storage(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Some(err.extended_code)
            }
            _ => None,
        }
    }
}
