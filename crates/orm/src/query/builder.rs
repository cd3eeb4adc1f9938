//! Query Builder - Core builder implementation

use std::marker::PhantomData;

use super::types::*;

/// Query builder for constructing database queries
///
/// `M` tags the entity type the rows hydrate into; it carries no data.
#[derive(Debug)]
pub struct QueryBuilder<M = ()> {
    /// Table of the entity this scope hydrates, independent of the active FROM
    pub(crate) model_table: Option<String>,
    pub(crate) select_fields: Vec<String>,
    pub(crate) from_table: Option<String>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) eager_loads: Vec<String>,
    _phantom: PhantomData<M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            model_table: self.model_table.clone(),
            select_fields: self.select_fields.clone(),
            from_table: self.from_table.clone(),
            where_conditions: self.where_conditions.clone(),
            joins: self.joins.clone(),
            eager_loads: self.eager_loads.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder<M> {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            model_table: None,
            select_fields: Vec::new(),
            from_table: None,
            where_conditions: Vec::new(),
            joins: Vec::new(),
            eager_loads: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Create a query scoped to an entity table
    pub fn for_table(table: &str) -> Self {
        let mut query = Self::new();
        query.model_table = Some(table.to_string());
        query.from_table = Some(table.to_string());
        query
    }

    /// Table of the entity this query hydrates.
    ///
    /// Falls back to the active FROM table for unscoped builders.
    pub fn table_name(&self) -> Option<&str> {
        self.model_table
            .as_deref()
            .or(self.from_table.as_deref())
            .filter(|table| !table.is_empty())
    }

    /// The active FROM table
    pub fn from_table(&self) -> Option<&str> {
        self.from_table.as_deref()
    }

    /// Selected columns, in order
    pub fn select_fields(&self) -> &[String] {
        &self.select_fields
    }

    /// Join clauses, in order
    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    /// Where conditions, in order
    pub fn where_conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }
}
