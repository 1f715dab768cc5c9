//! MySQL dialect.

use super::{json_object_args, SqlDialect};
use crate::ir::column::{Column, TypeTag};

/// MySQL: backtick identifiers, `?` placeholders, no `RETURNING`, and a
/// `COLLATE utf8mb4_bin` suffix on string columns in `ORDER BY`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{name}`")
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
        false
    }

    fn order_by_suffix(&self, column: Option<&Column>) -> Option<&'static str> {
        column
            .filter(|c| c.host_type == TypeTag::String)
            .map(|_| " COLLATE utf8mb4_bin")
    }

    fn ilike(&self, lhs_sql: &str, rhs_sql: &str) -> String {
        format!("LOWER({lhs_sql}) LIKE LOWER({rhs_sql})")
    }

    fn json_agg(&self, columns: &[Column]) -> String {
        let args = json_object_args(self, columns);
        format!("COALESCE(JSON_ARRAYAGG(JSON_OBJECT({args})), JSON_ARRAY())")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers_with_backticks() {
        assert_eq!(MySqlDialect.quote_identifier("authors"), "`authors`");
    }

    #[test]
    fn placeholder_is_always_a_bare_question_mark() {
        let d = MySqlDialect;
        assert_eq!(d.placeholder(1), "?");
        assert_eq!(d.placeholder(7), "?");
    }

    #[test]
    fn does_not_support_returning() {
        assert!(!MySqlDialect.supports_returning());
    }

    #[test]
    fn renders_bool_as_one_zero() {
        let d = MySqlDialect;
        assert_eq!(d.render_bool(true), "1");
        assert_eq!(d.render_bool(false), "0");
    }

    #[test]
    fn string_columns_get_collation_suffix_in_order_by() {
        let string_col = Column::new("authors", "name").of_type(TypeTag::String);
        let int_col = Column::new("authors", "id").of_type(TypeTag::Int64);
        assert_eq!(
            MySqlDialect.order_by_suffix(Some(&string_col)),
            Some(" COLLATE utf8mb4_bin")
        );
        assert_eq!(MySqlDialect.order_by_suffix(Some(&int_col)), None);
    }

    #[test]
    fn json_agg_uses_json_arrayagg() {
        let cols = vec![Column::new("books", "id")];
        let sql = MySqlDialect.json_agg(&cols);
        assert!(sql.starts_with("COALESCE(JSON_ARRAYAGG(JSON_OBJECT("));
        assert!(sql.ends_with("JSON_ARRAY())"));
    }
}
