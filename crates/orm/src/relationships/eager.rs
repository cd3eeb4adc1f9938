//! Eager loading for BelongsToMany relations
//!
//! Loads a relation for a whole collection of owners with a single pivot join,
//! then hands each owner the rows whose pivot points back at it.

use super::belongs_to_many::BelongsToMany;
use crate::backends::{DatabaseValue, QueryExecutor};
use crate::collection::Collection;
use crate::error::ModelResult;
use crate::model::{Model, Record};

/// Load `relation` for every owner in `owners` and store it under `key`.
///
/// Rows are distributed by the local foreign key of their pivot. Owners
/// without a local owner key receive an empty relation. When no owner has a
/// key, no query is issued.
pub async fn load_belongs_to_many<Related: Model>(
    executor: &dyn QueryExecutor,
    relation: &BelongsToMany<Related>,
    owners: &mut Collection,
    key: &str,
    eagers: &[&str],
) -> ModelResult<()> {
    let owner_table = match owners.first() {
        Some(owner) => owner.table_name().to_string(),
        None => return Ok(()),
    };
    let owner_key = relation.local_owner_key_name();

    let keys: Vec<DatabaseValue> = owners
        .pluck(owner_key)
        .into_iter()
        .filter(|value| !value.is_null())
        .collect();

    if keys.is_empty() {
        for owner in owners.iter_mut() {
            owner.add_relation(key, Collection::new());
        }
        return Ok(());
    }

    let naming = relation.pivot_naming(&owner_table, Related::table_name())?;
    tracing::debug!(
        "Eager loading {} for {} {} owners",
        key,
        keys.len(),
        owner_table
    );

    let query = Related::query()
        .with_all(eagers)
        .where_in(&format!("{}.{}", owner_table, owner_key), keys);
    let related = relation
        .apply_query(executor, query, &Record::new(&owner_table))
        .await?;

    for owner in owners.iter_mut() {
        attach_through_pivot(key, owner, owner_key, &naming.local_foreign_key, &related);
    }

    Ok(())
}

/// Attach the rows whose pivot `pivot_column` equals the owner's key
fn attach_through_pivot(
    key: &str,
    owner: &mut Record,
    owner_key: &str,
    pivot_column: &str,
    related: &Collection,
) {
    let bucket = match owner.get(owner_key) {
        Some(value) => related
            .iter()
            .filter(|row| {
                row.pivot()
                    .and_then(|pivot| pivot.get(pivot_column))
                    .is_some_and(|linked| linked.key_eq(value))
            })
            .cloned()
            .collect(),
        None => Collection::new(),
    };

    owner.add_relation(key, bucket);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ModelError;
    use crate::test_support::{MockExecutor, MockRow};

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Group {
        id: i32,
        label: String,
    }

    impl Model for Group {
        fn table_name() -> &'static str {
            "groups"
        }
    }

    fn user(id: i32) -> Record {
        Record::new("users").with_attribute("id", id)
    }

    fn group_row(id: i32, user_id: i32) -> MockRow {
        MockRow::new([
            ("id", DatabaseValue::from(id)),
            ("label", DatabaseValue::from(format!("group-{}", id))),
            ("user_id", DatabaseValue::from(user_id)),
            ("group_id", DatabaseValue::from(id)),
        ])
    }

    #[tokio::test]
    async fn test_loads_relation_for_every_owner() {
        let executor = MockExecutor::new().respond(vec![
            group_row(1, 10),
            group_row(2, 10),
            group_row(1, 20),
        ]);
        let relation = BelongsToMany::<Group>::new();
        let mut users: Collection = vec![user(10), user(20), user(30)].into();

        load_belongs_to_many(&executor, &relation, &mut users, "groups", &[])
            .await
            .unwrap();

        let buckets: Vec<Vec<DatabaseValue>> = users
            .iter()
            .map(|user| user.relation("groups").unwrap().pluck("id"))
            .collect();
        assert_eq!(
            buckets,
            vec![
                vec![DatabaseValue::Int32(1), DatabaseValue::Int32(2)],
                vec![DatabaseValue::Int32(1)],
                vec![],
            ]
        );

        let statements = executor.statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].0,
            "SELECT groups.*, group_user.user_id, group_user.group_id FROM users \
             INNER JOIN group_user ON group_user.user_id = users.id \
             INNER JOIN groups ON group_user.group_id = groups.id \
             WHERE users.id IN ($1, $2, $3)"
        );

        let first = users.first().unwrap().relation("groups").unwrap();
        assert!(first.iter().all(|group| group.pivot().is_some()));
    }

    #[tokio::test]
    async fn test_distributes_by_pivot_not_related_key() {
        // group 10 belongs to user 20 only; user 10 must not receive it
        let executor = MockExecutor::new().respond(vec![group_row(10, 20)]);
        let relation = BelongsToMany::<Group>::new();
        let mut users: Collection = vec![user(10), user(20)].into();

        load_belongs_to_many(&executor, &relation, &mut users, "groups", &[])
            .await
            .unwrap();

        let sizes: Vec<usize> = users
            .iter()
            .map(|user| user.relation("groups").unwrap().len())
            .collect();
        assert_eq!(sizes, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_owners_without_keys_skip_query() {
        let executor = MockExecutor::new();
        let relation = BelongsToMany::<Group>::new();
        let mut users: Collection = vec![Record::new("users")].into();

        load_belongs_to_many(&executor, &relation, &mut users, "groups", &[])
            .await
            .unwrap();

        assert!(users.first().unwrap().relation("groups").unwrap().is_empty());
        assert!(executor.statements().is_empty());

        let mut none = Collection::new();
        load_belongs_to_many(&executor, &relation, &mut none, "groups", &[])
            .await
            .unwrap();
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_failure_leaves_owners_untouched() {
        let executor = MockExecutor::new().fail(ModelError::Database("timeout".to_string()));
        let relation = BelongsToMany::<Group>::new();
        let mut users: Collection = vec![user(1)].into();

        let err = load_belongs_to_many(&executor, &relation, &mut users, "groups", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Database(_)));
        assert!(users.first().unwrap().relation("groups").is_none());
    }
}
