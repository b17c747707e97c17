//! Schema registry: field and relation descriptors for one record type.
//!
//! A schema is declared with [`Schema::builder`] and validated once by
//! [`SchemaBuilder::register`]. The returned `Arc<Schema>` is read-only and is passed
//! by reference to everything that needs it; there is no global registry.
//!
//! ```
//! use liteorm::{FieldDescriptor, RelationDescriptor, Schema};
//!
//! let posts = Schema::builder("Post", "posts")
//!     .field(FieldDescriptor::integer("id").primary_key())
//!     .field(FieldDescriptor::text("title").unique())
//!     .field(FieldDescriptor::integer("user_id").references("users"))
//!     .register()?;
//!
//! let users = Schema::builder("User", "users")
//!     .field(FieldDescriptor::integer("id").primary_key())
//!     .field(FieldDescriptor::text("name").not_null())
//!     .relation(RelationDescriptor::has_many(&posts))
//!     .register()?;
//!
//! assert_eq!(users.column_names().collect::<Vec<_>>(), ["id", "name"]);
//! assert_eq!(users.relations().next().unwrap().foreign_key(), "user_id");
//! # Ok::<(), liteorm::OrmError>(())
//! ```

use crate::ddl;
use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use crate::record::Record;
use crate::value::Value;
use heck::ToSnakeCase;
use indexmap::IndexMap;
use std::sync::Arc;

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Integer,
    Real,
    Text,
    Blob,
    Boolean,
}

impl StorageType {
    pub fn as_sql(self) -> &'static str {
        match self {
            StorageType::Integer => "INTEGER",
            StorageType::Real => "REAL",
            StorageType::Text => "TEXT",
            StorageType::Blob => "BLOB",
            StorageType::Boolean => "BOOLEAN",
        }
    }
}

/// Target of a foreign-key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

/// Describes one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    storage_type: StorageType,
    nullable: bool,
    primary_key: bool,
    unique: bool,
    default: Option<Value>,
    foreign_key: Option<ForeignKey>,
}

impl FieldDescriptor {
    /// A nullable, non-key column.
    pub fn new(name: &str, storage_type: StorageType) -> Self {
        Self {
            name: name.to_string(),
            storage_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
            foreign_key: None,
        }
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, StorageType::Integer)
    }

    pub fn real(name: &str) -> Self {
        Self::new(name, StorageType::Real)
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, StorageType::Text)
    }

    pub fn blob(name: &str) -> Self {
        Self::new(name, StorageType::Blob)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, StorageType::Boolean)
    }

    /// Mark as the primary key. Its value is assigned by the engine on insert.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Column default, used both in the table definition and for fresh records.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Reference the `id` column of `table`.
    pub fn references(self, table: &str) -> Self {
        self.references_column(table, "id")
    }

    pub fn references_column(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.foreign_key.as_ref()
    }
}

/// A one-to-many attribute populated from another schema's table. Not a column.
#[derive(Debug, Clone)]
pub struct RelationDescriptor {
    name: String,
    target: Arc<Schema>,
    lazy: bool,
    foreign_key: Option<String>,
}

impl RelationDescriptor {
    /// A lazy relation named after the target's table.
    ///
    /// The foreign-key column defaults to `<owner name in snake_case>_id`.
    pub fn has_many(target: &Arc<Schema>) -> Self {
        Self {
            name: target.table().to_string(),
            target: Arc::clone(target),
            lazy: true,
            foreign_key: None,
        }
    }

    /// Override the attribute name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Load on every fetch instead of only on request.
    pub fn eager(mut self) -> Self {
        self.lazy = false;
        self
    }

    /// Override the foreign-key column on the target table.
    pub fn via(mut self, column: &str) -> Self {
        self.foreign_key = Some(column.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Arc<Schema> {
        &self.target
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Foreign-key column on the target table (resolved at registration).
    pub fn foreign_key(&self) -> &str {
        self.foreign_key.as_deref().unwrap_or_default()
    }
}

/// One named member of a schema.
#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDescriptor),
    Relation(RelationDescriptor),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field(f) => f.name(),
            Member::Relation(r) => r.name(),
        }
    }
}

/// The read-only description of a record type's table, columns and relations.
#[derive(Debug)]
pub struct Schema {
    name: String,
    table: String,
    members: IndexMap<String, Member>,
    primary_key: Option<String>,
}

impl Schema {
    /// Start declaring a schema. `name` is the singular record name (`User`),
    /// `table` the storage table (`users`).
    pub fn builder(name: &str, table: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            table: table.to_string(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Column descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.members.values().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            Member::Relation(_) => None,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        match self.members.get(name) {
            Some(Member::Field(f)) => Some(f),
            _ => None,
        }
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationDescriptor> {
        self.members.values().filter_map(|m| match m {
            Member::Relation(r) => Some(r),
            Member::Field(_) => None,
        })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields().map(FieldDescriptor::name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.primary_key.as_deref().and_then(|pk| self.field(pk))
    }

    /// Column name other tables use to point at this schema: `<name>_id`.
    pub fn foreign_key_name(&self) -> String {
        format!("{}_id", self.name.to_snake_case())
    }

    /// A fresh record shaped by this schema's columns, pre-filled with defaults.
    pub fn new_record(&self) -> Record {
        Record::with_shape(
            &self.table,
            self.fields()
                .map(|f| (f.name().to_string(), f.default().cloned().unwrap_or_default())),
        )
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this schema.
    pub fn create_table_sql(&self) -> String {
        ddl::create_table(self)
    }

    /// Fail with `UnknownField` unless `column` is a column of this schema.
    pub(crate) fn check_column(&self, column: &str) -> OrmResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(OrmError::unknown_field(&self.table, column))
        }
    }
}

/// Collects members until [`register`](SchemaBuilder::register) validates them.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    table: String,
    members: Vec<Member>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.members.push(Member::Field(field));
        self
    }

    pub fn relation(mut self, relation: RelationDescriptor) -> Self {
        self.members.push(Member::Relation(relation));
        self
    }

    /// Validate the declaration and freeze it.
    ///
    /// Fails with [`OrmError::SchemaViolation`] on invalid identifiers, duplicate
    /// member names, more than one primary key, a non-integer primary key, a
    /// non-finite real default, a schema without columns, or a relation whose
    /// foreign-key column is missing from the target schema or is not INTEGER.
    pub fn register(self) -> OrmResult<Arc<Schema>> {
        validate_ident(&self.table)?;
        let owner_fk = format!("{}_id", self.name.to_snake_case());
        validate_ident(&owner_fk)?;

        let mut members = IndexMap::with_capacity(self.members.len());
        let mut primary_key: Option<String> = None;

        for member in self.members {
            validate_ident(member.name())?;

            let member = match member {
                Member::Field(field) => {
                    if field.primary_key {
                        if let Some(existing) = &primary_key {
                            return Err(OrmError::schema(format!(
                                "{}: multiple primary keys ('{}' and '{}')",
                                self.table, existing, field.name
                            )));
                        }
                        if field.storage_type != StorageType::Integer {
                            return Err(OrmError::schema(format!(
                                "{}: primary key '{}' must be INTEGER",
                                self.table, field.name
                            )));
                        }
                        primary_key = Some(field.name.clone());
                    }
                    if let Some(fk) = &field.foreign_key {
                        validate_ident(&fk.table)?;
                        validate_ident(&fk.column)?;
                    }
                    if let Some(Value::Real(v)) = &field.default {
                        if !v.is_finite() {
                            return Err(OrmError::schema(format!(
                                "{}: default of '{}' must be a finite number",
                                self.table, field.name
                            )));
                        }
                    }
                    Member::Field(field)
                }
                Member::Relation(mut relation) => {
                    let fk = relation
                        .foreign_key
                        .get_or_insert_with(|| owner_fk.clone())
                        .clone();
                    match relation.target.field(&fk) {
                        Some(column) if column.storage_type == StorageType::Integer => {}
                        Some(_) => {
                            return Err(OrmError::schema(format!(
                                "{}: relation '{}' column '{}' on '{}' must be INTEGER",
                                self.table,
                                relation.name,
                                fk,
                                relation.target.table()
                            )));
                        }
                        None => {
                            return Err(OrmError::schema(format!(
                                "{}: relation '{}' needs column '{}' on '{}'",
                                self.table,
                                relation.name,
                                fk,
                                relation.target.table()
                            )));
                        }
                    }
                    Member::Relation(relation)
                }
            };

            let name = member.name().to_string();
            if members.contains_key(&name) {
                return Err(OrmError::schema(format!(
                    "{}: duplicate member '{}'",
                    self.table, name
                )));
            }
            members.insert(name, member);
        }

        if !members.values().any(|m| matches!(m, Member::Field(_))) {
            return Err(OrmError::schema(format!("{}: no columns declared", self.table)));
        }

        Ok(Arc::new(Schema {
            name: self.name,
            table: self.table,
            members,
            primary_key,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> Arc<Schema> {
        Schema::builder("Post", "posts")
            .field(FieldDescriptor::integer("id").primary_key())
            .field(FieldDescriptor::text("title"))
            .field(FieldDescriptor::integer("user_id").references("users"))
            .register()
            .unwrap()
    }

    fn violation(builder: SchemaBuilder) -> String {
        match builder.register() {
            Err(OrmError::SchemaViolation(msg)) => msg,
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let users = Schema::builder("User", "users")
            .field(FieldDescriptor::integer("id").primary_key())
            .relation(RelationDescriptor::has_many(&posts()))
            .field(FieldDescriptor::text("name").not_null())
            .register()
            .unwrap();

        let names: Vec<&str> = users.members().map(Member::name).collect();
        assert_eq!(names, ["id", "posts", "name"]);
        assert_eq!(users.column_names().collect::<Vec<_>>(), ["id", "name"]);
        assert_eq!(users.primary_key().map(FieldDescriptor::name), Some("id"));
        assert!(users.field("posts").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let msg = violation(
            Schema::builder("User", "users")
                .field(FieldDescriptor::text("name"))
                .field(FieldDescriptor::text("name")),
        );
        assert!(msg.contains("duplicate member 'name'"), "{msg}");
    }

    #[test]
    fn test_multiple_primary_keys_rejected() {
        let msg = violation(
            Schema::builder("User", "users")
                .field(FieldDescriptor::integer("id").primary_key())
                .field(FieldDescriptor::integer("other").primary_key()),
        );
        assert!(msg.contains("multiple primary keys"), "{msg}");
    }

    #[test]
    fn test_text_primary_key_rejected() {
        let msg = violation(
            Schema::builder("User", "users").field(FieldDescriptor::text("id").primary_key()),
        );
        assert!(msg.contains("must be INTEGER"), "{msg}");
    }

    #[test]
    fn test_zero_primary_keys_allowed() {
        let log = Schema::builder("Log", "logs")
            .field(FieldDescriptor::text("line"))
            .register()
            .unwrap();
        assert!(log.primary_key().is_none());
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        violation(Schema::builder("User", "users; --").field(FieldDescriptor::text("name")));
        violation(Schema::builder("User", "users").field(FieldDescriptor::text("na me")));
    }

    #[test]
    fn test_relation_foreign_key_convention() {
        let posts = posts();
        let users = Schema::builder("User", "users")
            .field(FieldDescriptor::integer("id").primary_key())
            .relation(RelationDescriptor::has_many(&posts).named("articles"))
            .register()
            .unwrap();

        let rel = users.relations().next().unwrap();
        assert_eq!(rel.name(), "articles");
        assert_eq!(rel.foreign_key(), "user_id");
        assert!(rel.is_lazy());
        assert_eq!(users.foreign_key_name(), "user_id");
    }

    #[test]
    fn test_relation_without_foreign_key_column_rejected() {
        let posts = posts();
        let msg = violation(
            Schema::builder("BlogAuthor", "authors")
                .field(FieldDescriptor::integer("id").primary_key())
                .relation(RelationDescriptor::has_many(&posts)),
        );
        assert!(msg.contains("blog_author_id"), "{msg}");

        Schema::builder("BlogAuthor", "authors")
            .field(FieldDescriptor::integer("id").primary_key())
            .relation(RelationDescriptor::has_many(&posts).via("user_id"))
            .register()
            .unwrap();
    }

    #[test]
    fn test_relation_foreign_key_must_be_integer() {
        let comments = Schema::builder("Comment", "comments")
            .field(FieldDescriptor::integer("id").primary_key())
            .field(FieldDescriptor::text("user_id"))
            .register()
            .unwrap();
        let msg = violation(
            Schema::builder("User", "users")
                .field(FieldDescriptor::integer("id").primary_key())
                .relation(RelationDescriptor::has_many(&comments)),
        );
        assert!(msg.contains("must be INTEGER"), "{msg}");
    }

    #[test]
    fn test_non_finite_default_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let msg = violation(
                Schema::builder("Reading", "readings")
                    .field(FieldDescriptor::real("value").default_value(bad)),
            );
            assert!(msg.contains("finite"), "{msg}");
        }

        Schema::builder("Reading", "readings")
            .field(FieldDescriptor::real("value").default_value(0.5))
            .register()
            .unwrap();
    }

    #[test]
    fn test_new_record_uses_defaults() {
        let users = Schema::builder("User", "users")
            .field(FieldDescriptor::integer("id").primary_key())
            .field(FieldDescriptor::text("name").default_value("Hai"))
            .register()
            .unwrap();

        let record = users.new_record();
        assert_eq!(record.get("id"), Some(&Value::Null));
        assert_eq!(record.get("name"), Some(&Value::from("Hai")));
    }
}
