//! Query Builder SQL generation

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

impl<M> QueryBuilder<M> {
    /// Generate SQL with `$n` placeholders and return the bound parameters
    pub fn to_sql_with_params(&self) -> (String, Vec<DatabaseValue>) {
        let mut params = Vec::new();
        let sql = self.build_select_sql(&mut params);
        (sql, params)
    }

    /// Generate SQL, discarding the parameter list
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }

    /// Build SELECT SQL, appending parameters to `params`
    fn build_select_sql(&self, params: &mut Vec<DatabaseValue>) -> String {
        let mut sql = String::from("SELECT ");

        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_fields.join(", "));
        }

        if let Some(table) = &self.from_table {
            sql.push_str(" FROM ");
            sql.push_str(table);
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.join_type.to_string());
            sql.push(' ');
            sql.push_str(&join.table);
            sql.push_str(" ON ");
            for (i, condition) in join.on_conditions.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                sql.push_str(&format!(
                    "{} {} {}",
                    condition.left, condition.operator, condition.right
                ));
            }
        }

        self.build_where_clause(&mut sql, params);
        sql
    }

    /// Helper method to build WHERE clauses
    fn build_where_clause(&self, sql: &mut String, params: &mut Vec<DatabaseValue>) {
        if self.where_conditions.is_empty() {
            return;
        }

        sql.push_str(" WHERE ");
        for (i, condition) in self.where_conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }

            sql.push_str(&condition.column);
            sql.push(' ');
            sql.push_str(&condition.operator.to_string());

            match condition.operator {
                QueryOperator::In => {
                    sql.push_str(" (");
                    if let Some(subquery) = &condition.subquery {
                        let nested = subquery.build_select_sql(params);
                        sql.push_str(&nested);
                    } else if condition.values.is_empty() {
                        // Empty list: IN (NULL) matches nothing
                        sql.push_str("NULL");
                    } else {
                        for (j, value) in condition.values.iter().enumerate() {
                            if j > 0 {
                                sql.push_str(", ");
                            }
                            params.push(value.clone());
                            sql.push_str(&format!("${}", params.len()));
                        }
                    }
                    sql.push(')');
                }
                QueryOperator::IsNull => {}
                _ => {
                    if let Some(value) = &condition.value {
                        params.push(value.clone());
                        sql.push_str(&format!(" ${}", params.len()));
                    }
                }
            }
        }
    }
}
