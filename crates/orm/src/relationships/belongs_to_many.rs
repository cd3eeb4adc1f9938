//! BelongsToMany Relationship - many-to-many resolution through a pivot table
//!
//! The resolver is configured once per relationship declaration and then
//! invoked with different owners. Pivot naming is recomputed on every call, so
//! a single instance can be shared between tasks and reused across owner
//! tables.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::naming::{
    resolve_pivot_naming, PivotNaming, PIVOT_CREATED_AT_ALIAS, PIVOT_UPDATED_AT_ALIAS,
};
use crate::backends::{DatabaseValue, QueryExecutor};
use crate::collection::Collection;
use crate::error::{ModelResult, RelationshipError};
use crate::model::{Model, Record};
use crate::pivot::Pivot;
use crate::query::QueryBuilder;

/// Extra scoping applied to the related query before it executes
pub type QueryConstraint<Related> =
    Arc<dyn Fn(QueryBuilder<Related>) -> QueryBuilder<Related> + Send + Sync>;

/// Named configuration for a BelongsToMany relationship
pub struct BelongsToManyConfig<Related> {
    pub constraint: Option<QueryConstraint<Related>>,
    pub local_foreign_key: Option<String>,
    pub other_foreign_key: Option<String>,
    /// Defaults to `id`
    pub local_owner_key: Option<String>,
    /// Defaults to `id`
    pub other_owner_key: Option<String>,
    /// Explicit pivot table, bypassing name inference
    pub table: Option<String>,
    /// Whether pivot rows carry `created_at` / `updated_at`
    pub with_timestamps: bool,
}

impl<Related> Default for BelongsToManyConfig<Related> {
    fn default() -> Self {
        Self {
            constraint: None,
            local_foreign_key: None,
            other_foreign_key: None,
            local_owner_key: None,
            other_owner_key: None,
            table: None,
            with_timestamps: false,
        }
    }
}

/// Owner side handed to `get_related`
#[derive(Debug, Clone, Copy)]
pub enum RelatedOwners<'a> {
    Single(&'a Record),
    Many(&'a Collection),
}

impl<'a> From<&'a Record> for RelatedOwners<'a> {
    fn from(record: &'a Record) -> Self {
        RelatedOwners::Single(record)
    }
}

impl<'a> From<&'a Collection> for RelatedOwners<'a> {
    fn from(collection: &'a Collection) -> Self {
        RelatedOwners::Many(collection)
    }
}

/// BelongsToMany relationship - owners and `Related` linked through a pivot table
pub struct BelongsToMany<Related> {
    constraint: Option<QueryConstraint<Related>>,
    local_foreign_key: Option<String>,
    other_foreign_key: Option<String>,
    local_owner_key: String,
    other_owner_key: String,
    table: Option<String>,
    with_timestamps: bool,
    _related: PhantomData<fn() -> Related>,
}

impl<Related> Clone for BelongsToMany<Related> {
    fn clone(&self) -> Self {
        Self {
            constraint: self.constraint.clone(),
            local_foreign_key: self.local_foreign_key.clone(),
            other_foreign_key: self.other_foreign_key.clone(),
            local_owner_key: self.local_owner_key.clone(),
            other_owner_key: self.other_owner_key.clone(),
            table: self.table.clone(),
            with_timestamps: self.with_timestamps,
            _related: PhantomData,
        }
    }
}

impl<Related> fmt::Debug for BelongsToMany<Related> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BelongsToMany")
            .field("related", &std::any::type_name::<Related>())
            .field("local_foreign_key", &self.local_foreign_key)
            .field("other_foreign_key", &self.other_foreign_key)
            .field("local_owner_key", &self.local_owner_key)
            .field("other_owner_key", &self.other_owner_key)
            .field("table", &self.table)
            .field("with_timestamps", &self.with_timestamps)
            .field("constrained", &self.constraint.is_some())
            .finish()
    }
}

impl<Related: Model> Default for BelongsToMany<Related> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Related: Model> BelongsToMany<Related> {
    /// Relationship relying entirely on naming conventions
    pub fn new() -> Self {
        Self::with_config(BelongsToManyConfig::default())
    }

    /// Terse positional form.
    ///
    /// The first key is the pivot column referencing the owner; the rest
    /// follow as other foreign key, local owner key, other owner key.
    pub fn from_keys(
        local_foreign_key: &str,
        other_foreign_key: Option<&str>,
        local_owner_key: Option<&str>,
        other_owner_key: Option<&str>,
    ) -> Self {
        Self::with_config(BelongsToManyConfig {
            local_foreign_key: Some(local_foreign_key.to_string()),
            other_foreign_key: other_foreign_key.map(str::to_string),
            local_owner_key: local_owner_key.map(str::to_string),
            other_owner_key: other_owner_key.map(str::to_string),
            ..BelongsToManyConfig::default()
        })
    }

    /// Explicit configuration form
    pub fn with_config(config: BelongsToManyConfig<Related>) -> Self {
        Self {
            constraint: config.constraint,
            local_foreign_key: config.local_foreign_key,
            other_foreign_key: config.other_foreign_key,
            local_owner_key: config.local_owner_key.unwrap_or_else(|| "id".to_string()),
            other_owner_key: config.other_owner_key.unwrap_or_else(|| "id".to_string()),
            table: config.table,
            with_timestamps: config.with_timestamps,
            _related: PhantomData,
        }
    }

    pub fn local_foreign_key(mut self, column: &str) -> Self {
        self.local_foreign_key = Some(column.to_string());
        self
    }

    pub fn other_foreign_key(mut self, column: &str) -> Self {
        self.other_foreign_key = Some(column.to_string());
        self
    }

    pub fn local_owner_key(mut self, column: &str) -> Self {
        self.local_owner_key = column.to_string();
        self
    }

    pub fn other_owner_key(mut self, column: &str) -> Self {
        self.other_owner_key = column.to_string();
        self
    }

    /// Use an explicit pivot table instead of the inferred one
    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Select the pivot's `created_at` / `updated_at` into each pivot record
    pub fn with_timestamps(mut self) -> Self {
        self.with_timestamps = true;
        self
    }

    /// Scope the related query, e.g. to filter or order related rows
    pub fn constrain<F>(mut self, constraint: F) -> Self
    where
        F: Fn(QueryBuilder<Related>) -> QueryBuilder<Related> + Send + Sync + 'static,
    {
        self.constraint = Some(Arc::new(constraint));
        self
    }

    pub fn pivot_table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn local_owner_key_name(&self) -> &str {
        &self.local_owner_key
    }

    pub fn other_owner_key_name(&self) -> &str {
        &self.other_owner_key
    }

    pub fn uses_timestamps(&self) -> bool {
        self.with_timestamps
    }

    /// Pivot table and foreign keys for an owner/related table pair
    pub fn pivot_naming(&self, owner_table: &str, related_table: &str) -> ModelResult<PivotNaming> {
        resolve_pivot_naming(
            owner_table,
            related_table,
            self.table.as_deref(),
            self.local_foreign_key.as_deref(),
            self.other_foreign_key.as_deref(),
        )
    }

    /// Build the pivot join for `apply_query` without executing it
    pub fn build_query(
        &self,
        query: QueryBuilder<Related>,
        owner: &Record,
    ) -> ModelResult<(QueryBuilder<Related>, PivotNaming)> {
        let owner_table = owner_table(owner)?;
        let related_table = related_table(&query)?;
        let naming = self.pivot_naming(&owner_table, &related_table)?;
        let pivot = &naming.table;

        let mut query = query
            .select(&format!(
                "{}.*, {}.{}, {}.{}",
                related_table,
                pivot,
                naming.local_foreign_key,
                pivot,
                naming.other_foreign_key
            ))
            .from(&owner_table);

        if self.with_timestamps {
            query = query
                .select(&format!("{}.updated_at as {}", pivot, PIVOT_UPDATED_AT_ALIAS))
                .select(&format!("{}.created_at as {}", pivot, PIVOT_CREATED_AT_ALIAS));
        }

        let query = query
            .join(
                pivot,
                &format!("{}.{}", pivot, naming.local_foreign_key),
                "=",
                &format!("{}.{}", owner_table, self.local_owner_key),
            )
            .join(
                &related_table,
                &format!("{}.{}", pivot, naming.other_foreign_key),
                "=",
                &format!("{}.{}", related_table, self.other_owner_key),
            );

        Ok((self.constrained(query), naming))
    }

    /// Fetch related rows joined through the pivot table.
    ///
    /// `query` must be scoped to the related table; `owner` contributes only
    /// its table name, so callers narrow to specific owners by adding
    /// conditions to `query`. Every returned row carries a `Pivot` holding the
    /// two foreign keys (and timestamps when enabled). Pivots are built for
    /// all rows before any is attached.
    pub async fn apply_query(
        &self,
        executor: &dyn QueryExecutor,
        query: QueryBuilder<Related>,
        owner: &Record,
    ) -> ModelResult<Collection> {
        let (query, naming) = self.build_query(query, owner)?;
        let mut rows = query.get(executor).await?;

        let pivots = rows
            .iter()
            .map(|row| self.pivot_for(row, &naming))
            .collect::<ModelResult<Vec<_>>>()?;

        for (row, pivot) in rows.iter_mut().zip(pivots) {
            row.set_pivot(pivot);
        }

        tracing::debug!(
            "Hydrated {} {} rows through pivot {}",
            rows.len(),
            Related::table_name(),
            naming.table
        );
        Ok(rows)
    }

    /// Build the `get_related` query without executing it.
    ///
    /// Every owner must carry the local owner key column. NULL keys match
    /// nothing; when no key remains the result is `None` and no query needs
    /// to run.
    pub fn build_related_query<O>(
        &self,
        query: &QueryBuilder<O>,
        relation: RelatedOwners<'_>,
        eagers: &[&str],
    ) -> ModelResult<Option<QueryBuilder<Related>>> {
        let builder = Related::query().with_all(eagers);
        let related_table = related_table(&builder)?;
        let owner_table = query
            .table_name()
            .map(str::to_string)
            .ok_or_else(|| {
                RelationshipError::UnresolvableTable("owner query has no table".to_string())
            })?;
        // Sub-query path always infers the pivot table; configured keys still apply
        let naming = resolve_pivot_naming(
            &owner_table,
            &related_table,
            None,
            self.local_foreign_key.as_deref(),
            self.other_foreign_key.as_deref(),
        )?;

        let pivot_keys = QueryBuilder::new()
            .select(&naming.other_foreign_key)
            .from(&naming.table);

        let pivot_keys = match relation {
            RelatedOwners::Many(owners) => {
                let mut keys: Vec<DatabaseValue> = Vec::with_capacity(owners.len());
                for owner in owners {
                    let key = self.owner_key(owner)?;
                    if !key.is_null() {
                        keys.push(key.clone());
                    }
                }
                if keys.is_empty() {
                    return Ok(None);
                }
                pivot_keys.where_in(&naming.local_foreign_key, keys)
            }
            RelatedOwners::Single(owner) => {
                let key = self.owner_key(owner)?;
                if key.is_null() {
                    return Ok(None);
                }
                pivot_keys.where_eq(&naming.local_foreign_key, key.clone())
            }
        };

        let builder = builder.where_in_subquery(
            &format!("{}.{}", related_table, self.other_owner_key),
            pivot_keys,
        );
        Ok(Some(self.constrained(builder)))
    }

    /// Fetch the related rows for one owner or for a whole collection of
    /// owners in a single statement. Rows are not de-duplicated and carry no
    /// pivot.
    ///
    /// An owner without the local owner key column fails with
    /// `ModelError::ColumnNotFound` in both modes.
    pub async fn get_related<'a, O>(
        &self,
        executor: &dyn QueryExecutor,
        query: &QueryBuilder<O>,
        relation: impl Into<RelatedOwners<'a>>,
        eagers: &[&str],
    ) -> ModelResult<Collection> {
        match self.build_related_query(query, relation.into(), eagers)? {
            Some(builder) => builder.get(executor).await,
            None => {
                tracing::debug!("No owner keys for {}, skipping query", Related::table_name());
                Ok(Collection::new())
            }
        }
    }

    /// Attach to `model` the rows of `collection` whose local owner key
    /// equals the model's, preserving their order. An owner without the key
    /// receives an empty bucket.
    pub fn register_related(&self, key: &str, model: &mut Record, collection: &Collection) {
        let bucket = match model.get(&self.local_owner_key) {
            Some(owner_key) => collection.where_eq(&self.local_owner_key, owner_key),
            None => Collection::new(),
        };

        model.add_relation(key, bucket);
    }

    fn owner_key<'r>(&self, owner: &'r Record) -> ModelResult<&'r DatabaseValue> {
        owner.get(&self.local_owner_key).ok_or_else(|| {
            RelationshipError::MissingOwnerKey(format!(
                "'{}' on a '{}' record",
                self.local_owner_key,
                owner.table_name()
            ))
            .into()
        })
    }

    fn constrained(&self, query: QueryBuilder<Related>) -> QueryBuilder<Related> {
        match &self.constraint {
            Some(constraint) => constraint(query),
            None => query,
        }
    }

    fn pivot_for(&self, row: &Record, naming: &PivotNaming) -> ModelResult<Pivot> {
        let mut data = vec![
            (
                naming.local_foreign_key.clone(),
                row.require(&naming.local_foreign_key)?.clone(),
            ),
            (
                naming.other_foreign_key.clone(),
                row.require(&naming.other_foreign_key)?.clone(),
            ),
        ];

        if self.with_timestamps {
            data.push((
                "updated_at".to_string(),
                row.require(PIVOT_UPDATED_AT_ALIAS)?.clone(),
            ));
            data.push((
                "created_at".to_string(),
                row.require(PIVOT_CREATED_AT_ALIAS)?.clone(),
            ));
        }

        Ok(Pivot::hydrate(data))
    }
}

fn owner_table(owner: &Record) -> ModelResult<String> {
    let table = owner.table_name();
    if table.trim().is_empty() {
        return Err(
            RelationshipError::UnresolvableTable("owner record has no table".to_string()).into(),
        );
    }
    Ok(table.to_string())
}

fn related_table<M>(query: &QueryBuilder<M>) -> ModelResult<String> {
    query
        .table_name()
        .map(str::to_string)
        .ok_or_else(|| {
            RelationshipError::UnresolvableTable("related query has no table".to_string()).into()
        })
}
