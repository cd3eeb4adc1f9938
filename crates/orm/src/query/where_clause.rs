//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

impl<M> QueryBuilder<M> {
    /// Add WHERE condition with equality
    pub fn where_eq<T>(mut self, column: &str, value: T) -> Self
    where
        T: Into<DatabaseValue>,
    {
        let mut condition = WhereCondition::new(column, QueryOperator::Equal);
        condition.value = Some(value.into());
        self.where_conditions.push(condition);
        self
    }

    /// Add WHERE condition with IN
    pub fn where_in<T: Into<DatabaseValue>>(mut self, column: &str, values: Vec<T>) -> Self {
        let mut condition = WhereCondition::new(column, QueryOperator::In);
        condition.values = values.into_iter().map(Into::into).collect();
        self.where_conditions.push(condition);
        self
    }

    /// Add `column IN (<subquery>)`.
    ///
    /// The sub-query is rendered inline and shares the outer parameter list.
    pub fn where_in_subquery(mut self, column: &str, subquery: QueryBuilder) -> Self {
        let mut condition = WhereCondition::new(column, QueryOperator::In);
        condition.subquery = Some(Box::new(subquery));
        self.where_conditions.push(condition);
        self
    }

    /// Add WHERE condition with IS NULL
    pub fn where_null(mut self, column: &str) -> Self {
        self.where_conditions
            .push(WhereCondition::new(column, QueryOperator::IsNull));
        self
    }
}
