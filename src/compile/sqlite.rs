//! SQLite dialect.

use super::{json_object_args, SqlDialect};
use crate::ir::column::Column;

/// SQLite: double-quoted identifiers, `?` placeholders, `RETURNING` support.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{name}\"")
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn render_bool(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn ilike(&self, lhs_sql: &str, rhs_sql: &str) -> String {
        format!("LOWER({lhs_sql}) LIKE LOWER({rhs_sql})")
    }

    fn json_agg(&self, columns: &[Column]) -> String {
        let args = json_object_args(self, columns);
        format!("COALESCE(JSON_GROUP_ARRAY(JSON_OBJECT({args})), JSON_ARRAY())")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers_with_double_quotes() {
        assert_eq!(SqliteDialect.quote_identifier("authors"), "\"authors\"");
    }

    #[test]
    fn placeholder_is_always_a_bare_question_mark() {
        assert_eq!(SqliteDialect.placeholder(3), "?");
    }

    #[test]
    fn supports_returning() {
        assert!(SqliteDialect.supports_returning());
    }

    #[test]
    fn renders_bool_as_one_zero() {
        let d = SqliteDialect;
        assert_eq!(d.render_bool(true), "1");
        assert_eq!(d.render_bool(false), "0");
    }

    #[test]
    fn json_agg_uses_json_group_array() {
        let cols = vec![Column::new("books", "id")];
        let sql = SqliteDialect.json_agg(&cols);
        assert!(sql.starts_with("COALESCE(JSON_GROUP_ARRAY(JSON_OBJECT("));
        assert!(sql.ends_with("JSON_ARRAY())"));
    }
}
