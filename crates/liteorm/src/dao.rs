//! Persistence gateway.
//!
//! A [`Dao`] owns one connection and serializes every call through a mutex, so it can
//! be shared between threads. Each method takes the lock once; mutating statements
//! commit as soon as they run.
//!
//! ```
//! use liteorm::{Dao, FieldDescriptor, Filter, Schema};
//!
//! let users = Schema::builder("User", "users")
//!     .field(FieldDescriptor::integer("id").primary_key())
//!     .field(FieldDescriptor::text("name").not_null())
//!     .register()?;
//!
//! let dao = Dao::in_memory()?;
//! dao.create_table(&users)?;
//!
//! let mut user = users.new_record().with("name", "Kukku")?;
//! assert_eq!(dao.insert(&users, &mut user)?, 1);
//!
//! let found = dao.fetch_one(&users, &Filter::new().eq("name", "Kukku"), false)?;
//! assert_eq!(found, Some(user));
//! # Ok::<(), liteorm::OrmError>(())
//! ```

use crate::client::{GenericClient, SqliteClient};
use crate::condition::{Condition, Filter};
use crate::config::DaoConfig;
use crate::error::{OrmError, OrmResult};
use crate::qb::{self, Assignments, DeleteQb, MutationQb, SelectQb, SqlQb, UpdateQb};
use crate::record::Record;
use crate::relation;
use crate::schema::Schema;
use std::sync::{Mutex, MutexGuard};

/// Data access object over a single connection.
#[derive(Debug)]
pub struct Dao<C: GenericClient = SqliteClient> {
    conn: Mutex<C>,
}

impl Dao<SqliteClient> {
    /// Open the database described by `config`.
    pub fn open(config: &DaoConfig) -> OrmResult<Self> {
        Ok(Self::new(SqliteClient::open(config)?))
    }

    /// A fresh in-memory database.
    pub fn in_memory() -> OrmResult<Self> {
        Self::open(&DaoConfig::new())
    }
}

impl<C: GenericClient> Dao<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Give back the connection.
    pub fn into_inner(self) -> OrmResult<C> {
        self.conn.into_inner().map_err(|_| poisoned())
    }

    fn lock(&self) -> OrmResult<MutexGuard<'_, C>> {
        self.conn.lock().map_err(|_| poisoned())
    }

    /// Create the schema's table if it does not exist yet.
    pub fn create_table(&self, schema: &Schema) -> OrmResult<()> {
        let sql = schema.create_table_sql();
        self.lock()?.execute(&sql, &[])?;
        Ok(())
    }

    /// Insert `record` and write the assigned id back onto its primary key.
    ///
    /// Columns are written in schema order; the primary key is left to the engine
    /// and columns missing from the record's shape take their table default.
    pub fn insert(&self, schema: &Schema, record: &mut Record) -> OrmResult<i64> {
        let pk = schema.primary_key().map(|f| f.name());
        if let Some(pk) = pk {
            if !record.contains(pk) {
                return Err(OrmError::unknown_field(record.table(), pk));
            }
        }

        let mut insert = qb::insert(schema.table());
        for column in schema.column_names() {
            if Some(column) == pk {
                continue;
            }
            if let Some(value) = record.get(column) {
                insert = insert.set(column, value.clone());
            }
        }
        let q = insert.build()?;

        let id = self.lock()?.insert(&q.sql, &q.params)?;
        if let Some(pk) = pk {
            record.set(pk, id)?;
        }

        tracing::debug!(target: "liteorm.sql", table = schema.table(), id, "inserted record");
        Ok(id)
    }

    /// Every row of the schema's table.
    pub fn fetch_all(&self, schema: &Schema, load_relations: bool) -> OrmResult<Vec<Record>> {
        self.fetch(schema, &self.select(schema), load_relations)
    }

    /// The first row matching `filter`.
    pub fn fetch_one(
        &self,
        schema: &Schema,
        filter: &Filter,
        load_relations: bool,
    ) -> OrmResult<Option<Record>> {
        check_conditions(schema, filter.conditions())?;
        let q = self.select(schema).filter(filter).build()?;

        let conn = self.lock()?;
        let Some(row) = conn.query_opt(&q.sql, &q.params)? else {
            return Ok(None);
        };
        let mut record = Record::from_row(schema.table(), row);
        relation::load_relations(&*conn, schema, &mut record, load_relations)?;
        Ok(Some(record))
    }

    /// The row whose primary key is `id`.
    pub fn get_by_id(
        &self,
        schema: &Schema,
        id: i64,
        load_relations: bool,
    ) -> OrmResult<Option<Record>> {
        let pk = schema.primary_key().ok_or_else(|| {
            OrmError::schema(format!("{}: no primary key declared", schema.table()))
        })?;
        self.fetch_one(schema, &Filter::new().eq(pk.name(), id), load_relations)
    }

    /// Run a caller-built SELECT and hydrate the rows as records of `schema`.
    ///
    /// Selected and filtered columns must be columns of `schema`.
    pub fn fetch(
        &self,
        schema: &Schema,
        select: &SelectQb,
        load_relations: bool,
    ) -> OrmResult<Vec<Record>> {
        for column in select.selected_columns() {
            schema.check_column(column)?;
        }
        check_conditions(schema, select.conditions())?;

        let conn = self.lock()?;
        let mut records: Vec<Record> = select
            .query(&*conn)?
            .into_iter()
            .map(|row| Record::from_row(schema.table(), row))
            .collect();
        relation::load_relations_batch(&*conn, schema, &mut records, load_relations)?;
        Ok(records)
    }

    /// Apply `assignments` to the rows matching `filter`. Returns the affected count.
    ///
    /// An empty filter updates every row.
    pub fn update(
        &self,
        schema: &Schema,
        assignments: &Assignments,
        filter: &Filter,
    ) -> OrmResult<u64> {
        for column in assignments.columns() {
            schema.check_column(column)?;
        }
        check_conditions(schema, filter.conditions())?;

        let update = self.update_builder(schema).set_all(assignments).filter(filter);
        self.execute(&update)
    }

    /// Delete the rows matching `filter`. An empty filter is refused.
    pub fn delete(&self, schema: &Schema, filter: &Filter) -> OrmResult<u64> {
        check_conditions(schema, filter.conditions())?;
        let delete = self.delete_builder(schema).filter(filter);
        self.execute(&delete)
    }

    /// Execute a caller-built UPDATE or DELETE.
    pub fn execute(&self, mutation: &impl MutationQb) -> OrmResult<u64> {
        let conn = self.lock()?;
        let affected = mutation.execute(&*conn)?;
        tracing::debug!(target: "liteorm.sql", table = mutation.table(), affected, "mutation done");
        Ok(affected)
    }

    /// Expand every relation of an already fetched record.
    pub fn load_relations(&self, schema: &Schema, record: &mut Record) -> OrmResult<()> {
        let conn = self.lock()?;
        relation::load_relations(&*conn, schema, record, true)
    }

    pub fn select(&self, schema: &Schema) -> SelectQb {
        qb::select(schema.table())
    }

    pub fn update_builder(&self, schema: &Schema) -> UpdateQb {
        qb::update(schema.table())
    }

    pub fn delete_builder(&self, schema: &Schema) -> DeleteQb {
        qb::delete(schema.table())
    }
}

fn poisoned() -> OrmError {
    OrmError::Connection("connection lock poisoned".to_string())
}

fn check_conditions(schema: &Schema, conditions: &[Condition]) -> OrmResult<()> {
    conditions
        .iter()
        .try_for_each(|c| schema.check_column(c.column()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;
    use crate::value::Value;
    use std::sync::Arc;

    fn users() -> Arc<Schema> {
        Schema::builder("User", "users")
            .field(FieldDescriptor::integer("id").primary_key())
            .field(FieldDescriptor::text("name").not_null())
            .field(FieldDescriptor::text("email"))
            .register()
            .unwrap()
    }

    fn dao_with(users: &Schema) -> Dao {
        let dao = Dao::in_memory().unwrap();
        dao.create_table(users).unwrap();
        dao
    }

    #[test]
    fn insert_overwrites_caller_primary_key() {
        let users = users();
        let dao = dao_with(&users);

        let mut record = users
            .new_record()
            .with("id", 42)
            .unwrap()
            .with("name", "Ashwin")
            .unwrap();
        assert_eq!(dao.insert(&users, &mut record).unwrap(), 1);
        assert_eq!(record.get("id"), Some(&Value::Integer(1)));
    }

    #[test]
    fn filters_are_checked_against_the_schema() {
        let users = users();
        let dao = dao_with(&users);

        let err = dao
            .fetch_one(&users, &Filter::new().eq("nmae", "x"), false)
            .unwrap_err();
        assert!(matches!(err, OrmError::UnknownField { ref field, .. } if field == "nmae"));

        let err = dao
            .update(&users, &Assignments::new().set("age", 3), &Filter::new())
            .unwrap_err();
        assert!(matches!(err, OrmError::UnknownField { .. }));
    }

    #[test]
    fn fetch_checks_selected_columns() {
        let users = users();
        let dao = dao_with(&users);
        dao.insert(&users, &mut users.new_record().with("name", "Kukku").unwrap())
            .unwrap();

        let select = dao.select(&users).columns(&["sqlite_version() AS name"]);
        let err = dao.fetch(&users, &select, false).unwrap_err();
        assert!(matches!(err, OrmError::UnknownField { .. }));

        let select = dao.select(&users).columns(&["name"]);
        let rows = dao.fetch(&users, &select, false).unwrap();
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), ["name"]);
    }

    #[test]
    fn fetch_one_returns_first_match() {
        let users = users();
        let dao = dao_with(&users);
        for name in ["a", "b"] {
            dao.insert(&users, &mut users.new_record().with("name", name).unwrap())
                .unwrap();
        }

        let first = dao
            .fetch_one(&users, &Filter::new().gt("id", 0), false)
            .unwrap()
            .unwrap();
        assert_eq!(first.get_as::<String>("name").unwrap(), "a");
    }

    #[test]
    fn delete_without_filter_is_refused() {
        let users = users();
        let dao = dao_with(&users);
        assert!(dao.delete(&users, &Filter::new()).unwrap_err().is_missing_condition());
    }

    #[test]
    fn get_by_id_needs_primary_key() {
        let logs = Schema::builder("Log", "logs")
            .field(FieldDescriptor::text("line"))
            .register()
            .unwrap();
        let dao = dao_with(&logs);
        assert!(matches!(
            dao.get_by_id(&logs, 1, false),
            Err(OrmError::SchemaViolation(_))
        ));
    }

    #[test]
    fn dao_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dao>();
    }
}
