//! Core Model Trait - Base definition for database entities
//!
//! Defines the table metadata a typed entity exposes and the conversion from a
//! hydrated `Record`.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::model::record::Record;
use crate::query::QueryBuilder;

/// Core trait for database models
pub trait Model: Send + Sync + Debug + Serialize + for<'de> Deserialize<'de> {
    /// Table name for this model
    fn table_name() -> &'static str;

    /// Fresh query scoped to this model's table
    fn query() -> QueryBuilder<Self>
    where
        Self: Sized,
    {
        QueryBuilder::for_table(Self::table_name())
    }

    /// Build a typed model from a hydrated record
    fn from_record(record: &Record) -> ModelResult<Self>
    where
        Self: Sized,
    {
        record.to_model()
    }
}
