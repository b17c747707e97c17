//! Records: fixed-shape attribute maps hydrated from rows.

use crate::client::Row;
use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One row of a table as an ordered column → value map, plus loaded relations.
///
/// The set of attributes is fixed when the record is created, either from a schema
/// ([`Schema::new_record`](crate::Schema::new_record)) or from the columns of a fetched
/// row. Writing any other attribute is an [`OrmError::UnknownField`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    table: String,
    values: IndexMap<String, Value>,
    relations: IndexMap<String, Vec<Record>>,
}

impl Record {
    pub(crate) fn with_shape(table: &str, values: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            table: table.to_string(),
            values: values.into_iter().collect(),
            relations: IndexMap::new(),
        }
    }

    /// Copy every returned column into an attribute of the same name.
    pub fn from_row(table: &str, row: Row) -> Self {
        Self::with_shape(table, row.into_pairs())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Typed read of an attribute.
    pub fn get_as<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .values
            .get(column)
            .ok_or_else(|| OrmError::unknown_field(&self.table, column))?;
        T::from_value(column, value)
    }

    /// Overwrite an existing attribute.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> OrmResult<()> {
        match self.values.get_mut(column) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(OrmError::unknown_field(&self.table, column)),
        }
    }

    /// Chaining form of [`set`](Record::set).
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.set(column, value)?;
        Ok(self)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Loaded related records, if the relation has been loaded.
    pub fn relation(&self, name: &str) -> Option<&[Record]> {
        self.relations.get(name).map(Vec::as_slice)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.relations.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub(crate) fn set_relation(&mut self, name: &str, records: Vec<Record>) {
        self.relations.insert(name.to_string(), records);
    }

    /// Attributes and loaded relations as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + self.relations.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        for (k, v) in &self.relations {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn user() -> Record {
        let columns: Arc<[String]> = ["id", "name"].iter().map(|s| s.to_string()).collect();
        Record::from_row(
            "users",
            Row::new(columns, vec![Value::Integer(1), Value::from("Ashwin")]),
        )
    }

    #[test]
    fn hydrates_columns_in_order() {
        let record = user();
        assert_eq!(record.columns().collect::<Vec<_>>(), ["id", "name"]);
        assert_eq!(record.get_as::<i64>("id").unwrap(), 1);
        assert_eq!(record.get_as::<String>("name").unwrap(), "Ashwin");
    }

    #[test]
    fn unknown_attribute_is_an_error() {
        let mut record = user();
        let err = record.set("nmae", "typo").unwrap_err();
        assert!(matches!(err, OrmError::UnknownField { ref field, .. } if field == "nmae"));
        assert!(record.get_as::<i64>("missing").is_err());
        assert!(record.relation("posts").is_none());
    }

    #[test]
    fn serializes_relations_after_columns() {
        let mut record = user();
        record.set_relation("posts", vec![]);
        assert_eq!(
            record.to_json().unwrap(),
            serde_json::json!({"id": 1, "name": "Ashwin", "posts": []})
        );
    }

    #[test]
    fn non_finite_reals_serialize_as_null() {
        let columns: Arc<[String]> = ["reading"].iter().map(|s| s.to_string()).collect();
        let record = Record::from_row("readings", Row::new(columns, vec![Value::Real(f64::NAN)]));
        assert_eq!(
            record.to_json().unwrap(),
            serde_json::json!({"reading": null})
        );
    }
}
