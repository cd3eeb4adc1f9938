//! # pivot-orm: Many-to-many relationships over PostgreSQL
//!
//! Resolves BelongsToMany relationships through a pivot table: infers pivot
//! table and foreign key names from table conventions, builds the joined
//! query, hydrates pivot records onto related rows and distributes eagerly
//! loaded rows back to their owners.
//!
//! Query execution goes through the `QueryExecutor` trait, with a sqlx-backed
//! PostgreSQL implementation in `backends::postgres`.

pub mod backends;
pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod pivot;
pub mod query;
pub mod relationships;

#[cfg(test)]
mod test_support;

// Re-export core traits and types
pub use backends::{DatabaseRow, DatabaseValue, PostgresExecutor, QueryExecutor};
pub use collection::Collection;
pub use config::ExecutorConfig;
pub use error::*;
pub use model::*;
pub use pivot::Pivot;
pub use query::*;
pub use relationships::*;
