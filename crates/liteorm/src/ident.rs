//! SQL identifier validation.
//!
//! Table and column names are spliced into statement text, so every name that enters
//! a [`Schema`](crate::Schema) must be a plain unquoted identifier:
//! `[A-Za-z_][A-Za-z0-9_]*`.

use crate::error::{OrmError, OrmResult};

/// Check that `name` is a plain SQL identifier.
pub fn validate_ident(name: &str) -> OrmResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(OrmError::schema("identifier cannot be empty"));
    };

    if !(first == '_' || first.is_ascii_alphabetic()) {
        return Err(OrmError::schema(format!(
            "invalid identifier start character '{first}' in '{name}'"
        )));
    }
    if let Some(c) = chars.find(|c| !(*c == '_' || c.is_ascii_alphanumeric())) {
        return Err(OrmError::schema(format!(
            "invalid character '{c}' in identifier '{name}'"
        )));
    }
    Ok(())
}
