//! Query Builder WITH Methods - nested relation names to eager-load

use super::builder::QueryBuilder;

impl<M> QueryBuilder<M> {
    /// Add a relationship to eagerly load
    pub fn with(mut self, relation: &str) -> Self {
        if !self.eager_loads.iter().any(|existing| existing == relation) {
            self.eager_loads.push(relation.to_string());
        }
        self
    }

    /// Add several relationships to eagerly load
    pub fn with_all<I, S>(self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        relations
            .into_iter()
            .fold(self, |query, relation| query.with(relation.as_ref()))
    }

    /// Relationship names requested for eager loading
    pub fn eager_loads(&self) -> &[String] {
        &self.eager_loads
    }
}
