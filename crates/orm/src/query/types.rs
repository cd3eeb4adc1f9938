//! Query Builder Types - Core types and enums for query building

use std::fmt;

use super::builder::QueryBuilder;
use crate::backends::DatabaseValue;

/// Query operator types
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    IsNull,
}

impl QueryOperator {
    /// Parse a comparison operator as written in a join or where clause
    pub fn parse(operator: &str) -> Option<Self> {
        match operator.trim() {
            "=" => Some(QueryOperator::Equal),
            "!=" | "<>" => Some(QueryOperator::NotEqual),
            ">" => Some(QueryOperator::GreaterThan),
            ">=" => Some(QueryOperator::GreaterThanOrEqual),
            "<" => Some(QueryOperator::LessThan),
            "<=" => Some(QueryOperator::LessThanOrEqual),
            _ => None,
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
        }
    }
}

/// Where clause condition
#[derive(Debug, Clone)]
pub struct WhereCondition {
    pub column: String,
    pub operator: QueryOperator,
    pub value: Option<DatabaseValue>,
    pub values: Vec<DatabaseValue>, // For IN
    pub subquery: Option<Box<QueryBuilder>>,
}

impl WhereCondition {
    pub(crate) fn new(column: &str, operator: QueryOperator) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: None,
            values: Vec::new(),
            subquery: None,
        }
    }
}

/// Join types
#[derive(Debug, Clone, PartialEq)]
pub enum JoinType {
    Inner,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
        }
    }
}

/// Single `left <op> right` column comparison inside a join
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub left: String,
    pub operator: QueryOperator,
    pub right: String,
}

/// Join clause
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub on_conditions: Vec<JoinCondition>,
}
