//! Relation loading (has-many attributes populated from the target table).
//!
//! A relation is loaded when the caller asks for relations, or when it is declared
//! eager. Loaded records are plain rows of the target table; their own relations are
//! never expanded.
//!
//! Loading a list of owners runs one `IN` query per relation and groups the rows by
//! foreign key, instead of one query per owner.

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::qb::{self, SqlQb};
use crate::record::Record;
use crate::schema::{RelationDescriptor, Schema};
use crate::value::Value;
use indexmap::IndexSet;
use std::collections::HashMap;

/// Related records keyed by the owner's primary key.
pub type HasManyMap = HashMap<i64, Vec<Record>>;

// SQLite builds before 3.32 cap bound parameters at 999.
const MAX_IDS_PER_QUERY: usize = 900;

fn selected(schema: &Schema, load: bool) -> impl Iterator<Item = &RelationDescriptor> {
    schema.relations().filter(move |r| load || !r.is_lazy())
}

fn owner_id(schema: &Schema, record: &Record) -> Option<i64> {
    let pk = schema.primary_key()?;
    record.get(pk.name()).and_then(Value::as_i64)
}

/// Populate the relations of one record.
///
/// An owner without a primary-key value gets an empty vector for every relation.
pub fn load_relations(
    conn: &impl GenericClient,
    schema: &Schema,
    record: &mut Record,
    load: bool,
) -> OrmResult<()> {
    let id = owner_id(schema, record);

    for relation in selected(schema, load) {
        let children = match id {
            Some(id) => {
                let target = relation.target().table();
                qb::select(target)
                    .eq(relation.foreign_key(), id)
                    .query(conn)?
                    .into_iter()
                    .map(|row| Record::from_row(target, row))
                    .collect()
            }
            None => Vec::new(),
        };
        record.set_relation(relation.name(), children);
    }
    Ok(())
}

/// Populate the relations of many records, one query per relation.
pub fn load_relations_batch(
    conn: &impl GenericClient,
    schema: &Schema,
    records: &mut [Record],
    load: bool,
) -> OrmResult<()> {
    if records.is_empty() {
        return Ok(());
    }

    let ids: Vec<Option<i64>> = records.iter().map(|r| owner_id(schema, r)).collect();
    let distinct: Vec<i64> = ids
        .iter()
        .flatten()
        .copied()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    for relation in selected(schema, load) {
        let map = load_has_many_map(conn, relation, &distinct)?;
        for (record, id) in records.iter_mut().zip(&ids) {
            let children = id
                .and_then(|id| map.get(&id).cloned())
                .unwrap_or_default();
            record.set_relation(relation.name(), children);
        }
    }
    Ok(())
}

/// Fetch the target rows of `relation` for every owner id and group them by owner.
///
/// Rows keep the order the engine returned them in. Owners without rows are absent
/// from the map.
pub fn load_has_many_map(
    conn: &impl GenericClient,
    relation: &RelationDescriptor,
    owner_ids: &[i64],
) -> OrmResult<HasManyMap> {
    let target = relation.target().table();
    let fk = relation.foreign_key();
    let mut out = HasManyMap::new();

    for chunk in owner_ids.chunks(MAX_IDS_PER_QUERY) {
        let rows = qb::select(target).in_list(fk, chunk.to_vec()).query(conn)?;
        for row in rows {
            let Some(owner) = row.get(fk).and_then(Value::as_i64) else {
                continue;
            };
            out.entry(owner)
                .or_default()
                .push(Record::from_row(target, row));
        }
    }

    tracing::trace!(
        target: "liteorm.sql",
        relation = relation.name(),
        owners = owner_ids.len(),
        matched = out.len(),
        "loaded has-many relation"
    );
    Ok(out)
}
