//! In-memory executor for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backends::{DatabaseRow, DatabaseValue, QueryExecutor};
use crate::error::{ModelError, OrmResult};

/// Row made of ordered column/value pairs
#[derive(Debug, Clone)]
pub(crate) struct MockRow {
    columns: Vec<(String, DatabaseValue)>,
}

impl MockRow {
    pub(crate) fn new<I, K, V>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl DatabaseRow for MockRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        self.columns
            .get(index)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ModelError::ColumnNotFound(format!("index {}", index)))
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Executor that records every statement and replays queued results
#[derive(Default)]
pub(crate) struct MockExecutor {
    responses: Mutex<VecDeque<OrmResult<Vec<MockRow>>>>,
    statements: Mutex<Vec<(String, Vec<DatabaseValue>)>>,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next `fetch_all`
    pub(crate) fn respond(self, rows: Vec<MockRow>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    /// Queue a failure for the next `fetch_all`
    pub(crate) fn fail(self, error: ModelError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn statements(&self) -> Vec<(String, Vec<DatabaseValue>)> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn fetch_all(
        &self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))?;

        Ok(response
            .into_iter()
            .map(|row| Box::new(row) as Box<dyn DatabaseRow>)
            .collect())
    }
}
