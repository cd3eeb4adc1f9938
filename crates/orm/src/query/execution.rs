//! Query Builder execution

use super::builder::QueryBuilder;
use crate::backends::QueryExecutor;
use crate::collection::Collection;
use crate::error::{ModelResult, QueryError};
use crate::model::Record;

impl<M> QueryBuilder<M> {
    /// Execute the query and hydrate every row into a `Record`.
    ///
    /// Rows are tagged with the scope's entity table, not the active FROM
    /// table, so a join issued from another table still yields entities of
    /// the queried type.
    pub async fn get(self, executor: &dyn QueryExecutor) -> ModelResult<Collection> {
        if self.from_table.is_none() {
            return Err(QueryError::MissingFields("FROM table".to_string()).into());
        }

        let (sql, params) = self.to_sql_with_params();
        tracing::debug!("Executing query: {} ({} params)", sql, params.len());

        let rows = executor.fetch_all(&sql, &params).await?;
        let table = self.table_name().unwrap_or_default().to_string();

        let records = rows
            .iter()
            .map(|row| Record::from_row(&table, row.as_ref()))
            .collect::<ModelResult<Vec<_>>>()?;

        tracing::debug!("Query on {} returned {} rows", table, records.len());
        Ok(Collection::from(records))
    }
}
