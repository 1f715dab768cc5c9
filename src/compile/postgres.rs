//! PostgreSQL dialect.

use super::{json_object_args, SqlDialect};
use crate::ir::column::Column;

/// PostgreSQL: double-quoted identifiers, `$N` placeholders, `RETURNING`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{name}\"")
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn render_bool(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn ilike(&self, lhs_sql: &str, rhs_sql: &str) -> String {
        format!("{lhs_sql} ILIKE {rhs_sql}")
    }

    fn json_agg(&self, columns: &[Column]) -> String {
        let args = json_object_args(self, columns);
        let first = &columns[0];
        format!(
            "COALESCE(JSON_AGG(JSON_BUILD_OBJECT({args})) FILTER (WHERE {}.{} IS NOT NULL), '[]'::json)",
            self.quote_identifier(&first.table),
            self.quote_identifier(&first.name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers_with_double_quotes() {
        let d = PostgresDialect;
        assert_eq!(d.quote_identifier("authors"), "\"authors\"");
    }

    #[test]
    fn placeholders_are_one_indexed_dollar_numbers() {
        let d = PostgresDialect;
        assert_eq!(d.placeholder(1), "$1");
        assert_eq!(d.placeholder(2), "$2");
    }

    #[test]
    fn supports_returning() {
        assert!(PostgresDialect.supports_returning());
    }

    #[test]
    fn renders_bool_as_true_false() {
        let d = PostgresDialect;
        assert_eq!(d.render_bool(true), "TRUE");
        assert_eq!(d.render_bool(false), "FALSE");
    }

    #[test]
    fn json_agg_uses_filter_and_empty_array_fallback() {
        let cols = vec![Column::new("books", "id"), Column::new("books", "title")];
        let sql = PostgresDialect.json_agg(&cols);
        assert!(sql.contains("JSON_BUILD_OBJECT('id', \"books\".\"id\", 'title', \"books\".\"title\")"));
        assert!(sql.contains("FILTER (WHERE \"books\".\"id\" IS NOT NULL)"));
        assert!(sql.ends_with("'[]'::json)"));
    }
}
