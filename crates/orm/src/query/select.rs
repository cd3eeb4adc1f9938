//! Query Builder SELECT operations

use super::builder::QueryBuilder;

impl<M> QueryBuilder<M> {
    /// Add SELECT fields to the query
    pub fn select(mut self, fields: &str) -> Self {
        if fields == "*" {
            self.select_fields.push("*".to_string());
        } else {
            self.select_fields.extend(
                fields
                    .split(',')
                    .map(|f| f.trim())
                    .filter(|f| !f.is_empty())
                    .map(|f| f.to_string()),
            );
        }
        self
    }

    /// Set the FROM table
    pub fn from(mut self, table: &str) -> Self {
        self.from_table = Some(table.to_string());
        self
    }
}
