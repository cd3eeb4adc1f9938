//! Collection - ordered sequence of records

use serde_json::Value as JsonValue;

use crate::backends::DatabaseValue;
use crate::model::Record;

/// Ordered set of records returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Record>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.items.push(record);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.items.iter_mut()
    }

    /// Project one column; records lacking it yield `Null`
    pub fn pluck(&self, column: &str) -> Vec<DatabaseValue> {
        self.items
            .iter()
            .map(|record| record.get(column).cloned().unwrap_or(DatabaseValue::Null))
            .collect()
    }

    /// Records whose `column` matches `value`, in their original order
    pub fn where_eq(&self, column: &str, value: &DatabaseValue) -> Collection {
        self.items
            .iter()
            .filter(|record| record.get(column).is_some_and(|v| v.key_eq(value)))
            .cloned()
            .collect()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.items.iter().map(Record::to_json).collect())
    }
}

impl From<Vec<Record>> for Collection {
    fn from(items: Vec<Record>) -> Self {
        Self { items }
    }
}

impl FromIterator<Record> for Collection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Collection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
