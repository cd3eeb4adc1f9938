//! Record - dynamically shaped entity row
//!
//! A record keeps its columns in select order and carries two extension
//! slots filled by relationship resolution: named relation buckets and the
//! pivot sub-record of the join row it came from.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::backends::{DatabaseRow, DatabaseValue};
use crate::collection::Collection;
use crate::error::{ModelError, ModelResult};
use crate::pivot::Pivot;

/// An entity row returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    table: String,
    attributes: Vec<(String, DatabaseValue)>,
    relations: HashMap<String, Collection>,
    pivot: Option<Pivot>,
}

impl Record {
    /// Create an empty record for `table`
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    /// Hydrate a record from a driver row
    pub fn from_row(table: &str, row: &dyn DatabaseRow) -> ModelResult<Self> {
        let mut record = Self::new(table);
        for (index, column) in row.column_names().into_iter().enumerate() {
            let value = row.get_by_index(index)?;
            record.set(&column, value);
        }
        Ok(record)
    }

    /// Builder-style attribute setter
    pub fn with_attribute<V: Into<DatabaseValue>>(mut self, column: &str, value: V) -> Self {
        self.set(column, value);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Get an attribute by column name
    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.attributes
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Get an attribute, failing when the column is absent
    pub fn require(&self, column: &str) -> ModelResult<&DatabaseValue> {
        self.get(column).ok_or_else(|| {
            ModelError::ColumnNotFound(format!("'{}' on a '{}' record", column, self.table))
        })
    }

    /// Set an attribute, replacing any previous value for the column
    pub fn set<V: Into<DatabaseValue>>(&mut self, column: &str, value: V) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((column.to_string(), value)),
        }
    }

    /// Deserialize a single attribute; `NULL` and missing columns give `None`
    pub fn get_as<T: DeserializeOwned>(&self, column: &str) -> ModelResult<Option<T>> {
        match self.get(column) {
            None | Some(DatabaseValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.to_json())
                .map(Some)
                .map_err(|e| {
                    ModelError::Serialization(format!(
                        "Failed to deserialize column '{}': {}",
                        column, e
                    ))
                }),
        }
    }

    /// Attributes in select order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Attach a relation bucket, replacing an existing one with the same name
    pub fn add_relation(&mut self, name: &str, related: Collection) {
        self.relations.insert(name.to_string(), related);
    }

    pub fn relation(&self, name: &str) -> Option<&Collection> {
        self.relations.get(name)
    }

    pub fn relations(&self) -> &HashMap<String, Collection> {
        &self.relations
    }

    pub fn pivot(&self) -> Option<&Pivot> {
        self.pivot.as_ref()
    }

    pub fn set_pivot(&mut self, pivot: Pivot) {
        self.pivot = Some(pivot);
    }

    /// JSON view: attributes, then `pivot` and relation buckets when present
    pub fn to_json(&self) -> JsonValue {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.attributes {
            map.insert(name.clone(), value.to_json());
        }
        if let Some(pivot) = &self.pivot {
            map.insert("pivot".to_string(), pivot.to_json());
        }
        for (name, related) in &self.relations {
            map.insert(name.clone(), related.to_json());
        }
        JsonValue::Object(map)
    }

    /// Deserialize the record into a typed model
    pub fn to_model<M: DeserializeOwned>(&self) -> ModelResult<M> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}
