use std::sync::Mutex;

use async_trait::async_trait;
use pivot_orm::{
    load_belongs_to_many, BelongsToMany, BelongsToManyConfig, Collection, DatabaseRow,
    DatabaseValue, Model, ModelError, OrmResult, QueryBuilder, QueryExecutor, Record,
};

/// Rows for a users/roles schema, answered from memory
struct RoleUserFixture {
    // (user_id, role_id)
    links: Vec<(i32, i32)>,
    roles: Vec<(i32, &'static str)>,
    executed: Mutex<Vec<String>>,
}

struct FixtureRow(Vec<(String, DatabaseValue)>);

impl DatabaseRow for FixtureRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        self.0
            .get(index)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ModelError::ColumnNotFound(index.to_string()))
    }

    fn column_names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }
}

impl RoleUserFixture {
    fn new() -> Self {
        Self {
            links: vec![(1, 10), (1, 20), (2, 20), (3, 30)],
            roles: vec![(10, "admin"), (20, "editor"), (30, "viewer")],
            executed: Mutex::new(Vec::new()),
        }
    }

    fn role_name(&self, role_id: i32) -> &'static str {
        self.roles
            .iter()
            .find(|(id, _)| *id == role_id)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    fn user_ids(params: &[DatabaseValue]) -> Vec<i64> {
        params.iter().filter_map(DatabaseValue::as_i64).collect()
    }
}

#[async_trait]
impl QueryExecutor for RoleUserFixture {
    async fn fetch_all(
        &self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        self.executed.lock().unwrap().push(sql.to_string());
        let users = Self::user_ids(params);
        let mut rows: Vec<Box<dyn DatabaseRow>> = Vec::new();

        if sql.contains("INNER JOIN role_user") {
            for (user_id, role_id) in &self.links {
                if users.contains(&i64::from(*user_id)) {
                    rows.push(Box::new(FixtureRow(vec![
                        ("id".to_string(), DatabaseValue::Int32(*role_id)),
                        ("name".to_string(), self.role_name(*role_id).into()),
                        ("user_id".to_string(), DatabaseValue::Int32(*user_id)),
                        ("role_id".to_string(), DatabaseValue::Int32(*role_id)),
                    ])));
                }
            }
        } else if sql.contains("FROM role_user") {
            for (user_id, role_id) in &self.links {
                if users.contains(&i64::from(*user_id)) {
                    rows.push(Box::new(FixtureRow(vec![
                        ("id".to_string(), DatabaseValue::Int32(*role_id)),
                        ("name".to_string(), self.role_name(*role_id).into()),
                    ])));
                }
            }
        }

        Ok(rows)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Role {
    id: i32,
    name: String,
}

impl Model for Role {
    fn table_name() -> &'static str {
        "roles"
    }
}

fn user(id: i32) -> Record {
    Record::new("users")
        .with_attribute("id", id)
        .with_attribute("email", format!("user{}@example.com", id))
}

#[tokio::test]
async fn test_eager_load_roles_for_users() {
    let db = RoleUserFixture::new();
    let relation = BelongsToMany::<Role>::new();
    let mut users: Collection = vec![user(1), user(2), user(3), user(4)].into();

    load_belongs_to_many(&db, &relation, &mut users, "roles", &[])
        .await
        .unwrap();

    let names: Vec<Vec<DatabaseValue>> = users
        .iter()
        .map(|user| user.relation("roles").unwrap().pluck("name"))
        .collect();
    assert_eq!(
        names,
        vec![
            vec![DatabaseValue::from("admin"), DatabaseValue::from("editor")],
            vec![DatabaseValue::from("editor")],
            vec![DatabaseValue::from("viewer")],
            vec![],
        ]
    );
    assert_eq!(db.executed.lock().unwrap().len(), 1);

    let json = users.first().unwrap().to_json();
    assert_eq!(json["roles"][0]["pivot"]["user_id"], 1);
    assert_eq!(json["roles"][0]["pivot"]["role_id"], 10);
}

#[tokio::test]
async fn test_pivot_rows_deserialize_into_models() {
    let db = RoleUserFixture::new();
    let relation = BelongsToMany::<Role>::with_config(BelongsToManyConfig {
        table: Some("role_user".to_string()),
        ..Default::default()
    });

    let roles = relation
        .apply_query(&db, Role::query().where_eq("users.id", 1), &user(1))
        .await
        .unwrap();

    let models = roles
        .iter()
        .map(Role::from_record)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        models,
        vec![
            Role { id: 10, name: "admin".to_string() },
            Role { id: 20, name: "editor".to_string() },
        ]
    );
}

#[tokio::test]
async fn test_get_related_matches_eager_result() {
    let db = RoleUserFixture::new();
    let relation = BelongsToMany::<Role>::new();
    let owner_query: QueryBuilder<()> = QueryBuilder::for_table("users");

    let single = relation
        .get_related(&db, &owner_query, &user(1), &[])
        .await
        .unwrap();
    assert_eq!(single.pluck("id"), vec![DatabaseValue::Int32(10), DatabaseValue::Int32(20)]);

    let owners: Collection = vec![user(1), user(2)].into();
    let many = relation
        .get_related(&db, &owner_query, &owners, &[])
        .await
        .unwrap();
    assert_eq!(many.len(), 3);
    assert!(many.iter().all(|role| role.pivot().is_none()));

    let executed = db.executed.lock().unwrap();
    assert!(executed.iter().all(|sql| sql.starts_with("SELECT * FROM roles WHERE roles.id IN")));
}
