//! Query Builder JOIN operations

use super::builder::QueryBuilder;
use super::types::*;

impl<M> QueryBuilder<M> {
    /// Add INNER JOIN to the query.
    ///
    /// Unrecognised operators fall back to `=`.
    pub fn join(mut self, table: &str, left_col: &str, operator: &str, right_col: &str) -> Self {
        self.joins.push(inner_join(table, left_col, operator, right_col));
        self
    }
}

fn inner_join(table: &str, left_col: &str, operator: &str, right_col: &str) -> JoinClause {
    JoinClause {
        join_type: JoinType::Inner,
        table: table.to_string(),
        on_conditions: vec![JoinCondition {
            left: left_col.to_string(),
            operator: QueryOperator::parse(operator).unwrap_or(QueryOperator::Equal),
            right: right_col.to_string(),
        }],
    }
}
