//! Schema → table definition.

use crate::schema::{FieldDescriptor, Schema};

/// Render the `CREATE TABLE IF NOT EXISTS` statement for a schema.
///
/// Columns follow declaration order as `name TYPE [PRIMARY KEY] [NOT NULL] [UNIQUE]
/// [DEFAULT literal]`; foreign-key constraints come after the columns. Relations are
/// not columns and render nothing.
pub fn create_table(schema: &Schema) -> String {
    let mut parts: Vec<String> = schema.fields().map(column_def).collect();

    parts.extend(schema.fields().filter_map(|field| {
        field.foreign_key().map(|fk| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                field.name(),
                fk.table,
                fk.column
            )
        })
    }));

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        schema.table(),
        parts.join(", ")
    )
}

fn column_def(field: &FieldDescriptor) -> String {
    let mut def = format!("{} {}", field.name(), field.storage_type().as_sql());
    if field.is_primary_key() {
        def.push_str(" PRIMARY KEY");
    }
    if !field.is_nullable() {
        def.push_str(" NOT NULL");
    }
    if field.is_unique() {
        def.push_str(" UNIQUE");
    }
    if let Some(default) = field.default() {
        def.push_str(" DEFAULT ");
        def.push_str(&default.to_sql_literal());
    }
    def
}
