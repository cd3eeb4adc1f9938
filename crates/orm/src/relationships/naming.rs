//! Pivot Naming - convention-based pivot table and foreign key inference
//!
//! Pure functions, independent of query execution. For tables `users` and
//! `roles` the conventions give:
//!
//! - pivot table `role_user` (singular stems, sorted, joined by `_`)
//! - other foreign key `role_id` (first stem)
//! - local foreign key `user_id` (second stem)

use crate::error::{ModelResult, RelationshipError};

/// Alias under which the pivot's `updated_at` is selected
pub const PIVOT_UPDATED_AT_ALIAS: &str = "m_reserved_1";

/// Alias under which the pivot's `created_at` is selected
pub const PIVOT_CREATED_AT_ALIAS: &str = "m_reserved_2";

/// Resolved pivot table and foreign-key column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotNaming {
    /// The pivot table name
    pub table: String,
    /// Pivot column referencing the owner table
    pub local_foreign_key: String,
    /// Pivot column referencing the related table
    pub other_foreign_key: String,
}

/// Singular, lowercase stem of a table name (English rules)
pub fn singularize(name: &str) -> String {
    let name = name.trim().to_lowercase();

    // Only the last word of a multi-word table changes number
    let (prefix, word) = match name.rfind('_') {
        Some(index) => name.split_at(index + 1),
        None => ("", name.as_str()),
    };

    let singular = match word {
        "people" => "person".to_string(),
        "children" => "child".to_string(),
        "men" => "man".to_string(),
        "women" => "woman".to_string(),
        w if w.ends_with("ies") && w.len() > 3 => format!("{}y", &w[..w.len() - 3]),
        w if w.ends_with("sses") || (w.ends_with("uses") && !w.ends_with("ouses")) => {
            w[..w.len() - 2].to_string()
        }
        w if ["ches", "shes", "xes", "zes"]
            .iter()
            .any(|suffix| w.ends_with(suffix)) =>
        {
            w[..w.len() - 2].to_string()
        }
        w if w.ends_with("ss") || w.ends_with("us") => w.to_string(),
        w if w.ends_with('s') && w.len() > 1 => w[..w.len() - 1].to_string(),
        w => w.to_string(),
    };

    format!("{}{}", prefix, singular)
}

/// Singular stems of two tables in lexicographic order
pub fn pivot_stems(owner_table: &str, related_table: &str) -> (String, String) {
    let owner = singularize(owner_table);
    let related = singularize(related_table);
    if owner <= related {
        (owner, related)
    } else {
        (related, owner)
    }
}

/// Conventional pivot table name: sorted singular stems joined by `_`
pub fn pivot_table_name(owner_table: &str, related_table: &str) -> String {
    let (first, second) = pivot_stems(owner_table, related_table);
    format!("{}_{}", first, second)
}

/// Split an explicit pivot table name on its first underscore.
///
/// The stems keep their written order.
pub fn split_pivot_table(table: &str) -> ModelResult<(String, String)> {
    match table.split_once('_') {
        Some((first, second)) if !first.is_empty() && !second.is_empty() => {
            Ok((first.to_string(), second.to_string()))
        }
        _ => Err(RelationshipError::InvalidConfiguration(format!(
            "pivot table '{}' must name two tables separated by an underscore",
            table
        ))
        .into()),
    }
}

/// Resolve pivot naming for an owner/related table pair.
///
/// Configured foreign keys always win. Otherwise, with stems `(first,
/// second)`, the other foreign key is `<first>_id` and the local foreign key
/// is `<second>_id`. Without an explicit table the stems are the sorted
/// singular table names and the pivot is their `_` join; an explicit table is
/// split on its first underscore and its stems keep their written order.
pub fn resolve_pivot_naming(
    owner_table: &str,
    related_table: &str,
    explicit_table: Option<&str>,
    local_foreign_key: Option<&str>,
    other_foreign_key: Option<&str>,
) -> ModelResult<PivotNaming> {
    let (table, (first, second)) = match explicit_table {
        None => {
            ensure_table(owner_table, "owner")?;
            ensure_table(related_table, "related")?;
            (
                pivot_table_name(owner_table, related_table),
                pivot_stems(owner_table, related_table),
            )
        }
        Some(table) => (table.to_string(), split_pivot_table(table)?),
    };

    let naming = PivotNaming {
        table,
        local_foreign_key: local_foreign_key
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_id", second)),
        other_foreign_key: other_foreign_key
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_id", first)),
    };

    tracing::debug!(
        "Resolved pivot {} for {} -> {} (local {}, other {})",
        naming.table,
        owner_table,
        related_table,
        naming.local_foreign_key,
        naming.other_foreign_key
    );
    Ok(naming)
}

fn ensure_table(table: &str, side: &str) -> ModelResult<()> {
    if table.trim().is_empty() {
        return Err(RelationshipError::UnresolvableTable(format!(
            "{} table name is empty",
            side
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ModelError;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("roles"), "role");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("courses"), "course");
        assert_eq!(singularize("warehouses"), "warehouse");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("blog_posts"), "blog_post");
        assert_eq!(singularize("Users"), "user");
        assert_eq!(singularize("user"), "user");
    }

    #[test]
    fn test_users_roles_convention() {
        let naming = resolve_pivot_naming("users", "roles", None, None, None).unwrap();
        assert_eq!(naming.table, "role_user");
        assert_eq!(naming.other_foreign_key, "role_id");
        assert_eq!(naming.local_foreign_key, "user_id");
    }

    #[test]
    fn test_pivot_name_is_symmetric() {
        let pairs = [
            ("users", "roles"),
            ("posts", "tags"),
            ("categories", "products"),
            ("a", "b"),
            ("zebras", "apples"),
        ];
        for (left, right) in pairs {
            let forward = pivot_table_name(left, right);
            let backward = pivot_table_name(right, left);
            assert_eq!(forward, backward);

            let (first, second) = pivot_stems(left, right);
            assert!(first <= second);
            assert_eq!(forward, format!("{}_{}", first, second));
        }
    }

    #[test]
    fn test_foreign_keys_follow_sort_order() {
        let from_users = resolve_pivot_naming("users", "roles", None, None, None).unwrap();
        let from_roles = resolve_pivot_naming("roles", "users", None, None, None).unwrap();

        assert_eq!(from_users, from_roles);
        assert_eq!(from_roles.other_foreign_key, "role_id");
        assert_eq!(from_roles.local_foreign_key, "user_id");
    }

    #[test]
    fn test_explicit_table_split_keeps_order() {
        assert_eq!(
            split_pivot_table("b_a").unwrap(),
            ("b".to_string(), "a".to_string())
        );
        assert_eq!(
            split_pivot_table("a_b").unwrap(),
            ("a".to_string(), "b".to_string())
        );
        assert_eq!(
            split_pivot_table("user_role_grants").unwrap(),
            ("user".to_string(), "role_grants".to_string())
        );
    }

    #[test]
    fn test_explicit_table_positional_fallback() {
        let naming =
            resolve_pivot_naming("members", "groups", Some("b_a"), None, None).unwrap();
        assert_eq!(naming.table, "b_a");
        assert_eq!(naming.other_foreign_key, "b_id");
        assert_eq!(naming.local_foreign_key, "a_id");
    }

    #[test]
    fn test_explicit_table_keys_use_written_order() {
        let naming =
            resolve_pivot_naming("users", "roles", Some("user_role"), None, None).unwrap();
        assert_eq!(naming.table, "user_role");
        assert_eq!(naming.other_foreign_key, "user_id");
        assert_eq!(naming.local_foreign_key, "role_id");

        let naming = resolve_pivot_naming("users", "roles", Some("a_b"), None, None).unwrap();
        assert_eq!(naming.other_foreign_key, "a_id");
        assert_eq!(naming.local_foreign_key, "b_id");
    }

    #[test]
    fn test_configured_keys_win() {
        let naming = resolve_pivot_naming(
            "users",
            "roles",
            Some("memberships_x"),
            Some("member_id"),
            Some("group_id"),
        )
        .unwrap();
        assert_eq!(naming.table, "memberships_x");
        assert_eq!(naming.local_foreign_key, "member_id");
        assert_eq!(naming.other_foreign_key, "group_id");
    }

    #[test]
    fn test_explicit_table_without_underscore_is_rejected() {
        for table in ["memberships", "_users", "users_"] {
            let err =
                resolve_pivot_naming("users", "roles", Some(table), None, None).unwrap_err();
            assert!(matches!(err, ModelError::Configuration(_)), "{}", table);
        }
    }

    #[test]
    fn test_missing_table_is_resolution_error() {
        let err = resolve_pivot_naming("", "roles", None, None, None).unwrap_err();
        assert!(matches!(err, ModelError::Resolution(_)));
    }
}
