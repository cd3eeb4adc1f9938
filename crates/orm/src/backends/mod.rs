//! Database Backend Abstractions
//!
//! Query execution seam plus the PostgreSQL implementation built on sqlx.

pub mod core;
pub mod postgres;

pub use core::*;
pub use postgres::{PostgresExecutor, PostgresRow};
