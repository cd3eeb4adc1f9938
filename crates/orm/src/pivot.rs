//! Pivot - the association row a related record was joined through

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::backends::DatabaseValue;

/// Hydrated pivot-table row attached to each related record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    attributes: Vec<(String, DatabaseValue)>,
}

impl Pivot {
    /// Build a pivot record from column/value pairs, keeping their order
    pub fn hydrate<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        Self {
            attributes: data
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.attributes
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// `created_at` when the pivot carries timestamps
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get("created_at").and_then(timestamp)
    }

    /// `updated_at` when the pivot carries timestamps
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.get("updated_at").and_then(timestamp)
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

fn timestamp(value: &DatabaseValue) -> Option<DateTime<Utc>> {
    match value {
        DatabaseValue::DateTime(dt) => Some(*dt),
        DatabaseValue::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}
