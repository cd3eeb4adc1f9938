//! Query Builder Module - fluent builder for the join and sub-query shapes the
//! relationship resolver needs

pub mod builder;
pub mod execution;
pub mod joins;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;
pub mod with;

pub use builder::QueryBuilder;
pub use types::{JoinClause, JoinCondition, JoinType, QueryOperator, WhereCondition};
