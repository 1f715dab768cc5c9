//! Structural validator (C4).
//!
//! `Validate(ast)` returns the first failure it finds, or success. It is a
//! pure function of its input — it never mutates the `Ast` it inspects.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CoreError, Result};
use crate::ir::ast::{Ast, AstKind};
use crate::ir::expr::Expr;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern is valid"))
}

fn check_identifier(name: &str, what: &str) -> Result<()> {
    if identifier_re().is_match(name) {
        Ok(())
    } else {
        Err(CoreError::Identifier(format!("{what} {name:?} is not a valid identifier")))
    }
}

/// Validates a full query tree against its structural invariants.
pub fn validate(ast: &Ast) -> Result<()> {
    validate_with_path(ast, "query").inspect_err(|e| {
        tracing::warn!(error = %e, "validate: rejected ast");
    })
}

fn validate_with_path(ast: &Ast, path: &str) -> Result<()> {
    if ast.set_op.is_none() && ast.from_table.name.is_empty() && ast.ctes.is_empty() {
        return Err(CoreError::Validation(format!(
            "{path}: FROM table name must be non-empty unless this is a compound query or has CTEs"
        )));
    }

    if !ast.from_table.name.is_empty() {
        check_identifier(&ast.from_table.name, &format!("{path}: FROM table"))?;
    }
    if let Some(alias) = &ast.from_table.alias {
        check_identifier(alias, &format!("{path}: FROM alias"))?;
    }

    match ast.kind {
        AstKind::Select => {}
        AstKind::Insert => {
            if ast.insert_vals.is_empty() {
                return Err(CoreError::Validation(format!(
                    "{path}: INSERT requires at least one value"
                )));
            }
            if !ast.insert_cols.is_empty() && ast.insert_cols.len() != ast.insert_vals.len() {
                return Err(CoreError::Validation(format!(
                    "{path}: INSERT column count ({}) must match value count ({})",
                    ast.insert_cols.len(),
                    ast.insert_vals.len()
                )));
            }
        }
        AstKind::Update => {
            if ast.set_clauses.is_empty() {
                return Err(CoreError::Validation(format!(
                    "{path}: UPDATE requires at least one SET clause"
                )));
            }
        }
        AstKind::Delete => {}
    }

    for (i, join) in ast.joins.iter().enumerate() {
        let jpath = format!("{path}: JOIN {}", i + 1);
        if join.table.name.is_empty() {
            return Err(CoreError::Validation(format!("{jpath}: table name must be non-empty")));
        }
        check_identifier(&join.table.name, &format!("{jpath} table"))?;
        if let Some(alias) = &join.table.alias {
            check_identifier(alias, &format!("{jpath} alias"))?;
        }
        validate_expr(&join.condition, &format!("{jpath} condition"))?;
    }

    for (i, sc) in ast.select_cols.iter().enumerate() {
        validate_expr(&sc.expr, &format!("{path}: SELECT column {}", i + 1))?;
        if let Some(alias) = &sc.alias {
            check_identifier(alias, &format!("{path}: SELECT column {} alias", i + 1))?;
        }
    }

    if let Some(w) = &ast.where_clause {
        validate_expr(w, &format!("{path}: WHERE"))?;
    }

    for c in &ast.group_by {
        check_identifier(&c.name, &format!("{path}: GROUP BY column"))?;
    }

    if let Some(h) = &ast.having {
        validate_expr(h, &format!("{path}: HAVING"))?;
    }

    for (i, item) in ast.order_by.iter().enumerate() {
        validate_expr(&item.expr, &format!("{path}: ORDER BY {}", i + 1))?;
    }

    if let Some(l) = &ast.limit {
        validate_expr(l, &format!("{path}: LIMIT"))?;
    }
    if let Some(o) = &ast.offset {
        validate_expr(o, &format!("{path}: OFFSET"))?;
    }

    for c in &ast.insert_cols {
        check_identifier(&c.name, &format!("{path}: INSERT column"))?;
    }
    for (i, v) in ast.insert_vals.iter().enumerate() {
        validate_expr(v, &format!("{path}: INSERT value {}", i + 1))?;
    }
    for c in &ast.returning {
        check_identifier(&c.name, &format!("{path}: RETURNING column"))?;
    }

    for (i, sc) in ast.set_clauses.iter().enumerate() {
        check_identifier(&sc.column.name, &format!("{path}: SET clause {} column", i + 1))?;
        validate_expr(&sc.value, &format!("{path}: SET clause {} value", i + 1))?;
    }

    for (i, cte) in ast.ctes.iter().enumerate() {
        let cpath = format!("{path}: CTE \"{}\"", cte.name);
        check_identifier(&cte.name, &format!("{path}: CTE {}", i + 1))?;
        for (j, colname) in cte.columns.iter().enumerate() {
            check_identifier(colname, &format!("{cpath} column {}", j + 1))?;
        }
        validate_with_path(&cte.query, &format!("{cpath} body"))?;
    }

    if let Some(set_op) = &ast.set_op {
        validate_with_path(&set_op.left, &format!("{path}: set-op left"))?;
        validate_with_path(&set_op.right, &format!("{path}: set-op right"))?;
    }

    Ok(())
}

fn validate_expr(expr: &Expr, path: &str) -> Result<()> {
    match expr {
        Expr::Column(col) => {
            check_identifier(&col.name, &format!("{path}: column"))?;
            if !col.table.is_empty() {
                check_identifier(&col.table, &format!("{path}: column table"))?;
            }
            Ok(())
        }
        Expr::Param { name, .. } => {
            if name.is_empty() {
                Err(CoreError::Validation(format!("{path}: parameter name cannot be empty")))
            } else {
                Ok(())
            }
        }
        Expr::Literal(_) => Ok(()),
        Expr::Binary { left, right, .. } => {
            validate_expr(left, &format!("{path} left"))?;
            validate_expr(right, &format!("{path} right"))
        }
        Expr::Unary { expr, .. } => validate_expr(expr, &format!("{path} operand")),
        Expr::Func { args, .. } => {
            for (i, a) in args.iter().enumerate() {
                validate_expr(a, &format!("{path} arg {}", i + 1))?;
            }
            Ok(())
        }
        Expr::List(items) => {
            for (i, item) in items.iter().enumerate() {
                validate_expr(item, &format!("{path} item {}", i + 1))?;
            }
            Ok(())
        }
        Expr::Aggregate { arg, .. } => {
            if let Some(a) = arg {
                validate_expr(a, &format!("{path} arg"))
            } else {
                Ok(())
            }
        }
        Expr::JsonAgg { columns, .. } => {
            if columns.is_empty() {
                Err(CoreError::Validation(format!(
                    "{path}: JSON aggregate requires at least one column"
                )))
            } else {
                for c in columns {
                    check_identifier(&c.name, &format!("{path}: JSON aggregate column"))?;
                }
                Ok(())
            }
        }
        Expr::Subquery(query) => validate_with_path(query, &format!("{path}: subquery")),
        Expr::Exists { query, .. } => validate_with_path(query, &format!("{path}: EXISTS subquery")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{col, delete_from, from, insert_into, update};
    use crate::ir::{literal, param, TypeTag};

    #[test]
    fn accepts_a_well_formed_select() {
        let ast = from("authors")
            .select([col("authors", "id").column()])
            .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
            .build();
        assert!(validate(&ast).is_ok());
    }

    #[test]
    fn rejects_empty_from_without_ctes_or_set_op() {
        let ast = from("").select([col("x", "y").column()]).build();
        assert!(matches!(validate(&ast), Err(CoreError::Validation(_))));
    }

    #[test]
    fn rejects_bad_identifier_with_injection_attempt() {
        let ast = from("users; DROP TABLE --")
            .select([col("users", "id").column()])
            .build();
        assert!(matches!(validate(&ast), Err(CoreError::Identifier(_))));
    }

    #[test]
    fn insert_requires_matching_arity() {
        let ast = insert_into("authors")
            .columns([col("authors", "name").column()])
            .values([literal("a"), literal("b")])
            .build();
        assert!(matches!(validate(&ast), Err(CoreError::Validation(_))));
    }

    #[test]
    fn insert_requires_at_least_one_value() {
        let ast = insert_into("authors").build();
        assert!(matches!(validate(&ast), Err(CoreError::Validation(_))));
    }

    #[test]
    fn update_requires_at_least_one_set_clause() {
        let ast = update("authors")
            .where_clause(col("authors", "id").eq(literal(1_i64)))
            .build();
        assert!(matches!(validate(&ast), Err(CoreError::Validation(_))));
    }

    #[test]
    fn delete_has_no_extra_requirements() {
        let ast = delete_from("authors").build();
        assert!(validate(&ast).is_ok());
    }

    #[test]
    fn empty_param_name_is_rejected() {
        let ast = from("users")
            .select([col("users", "id").column()])
            .where_clause(Expr::Param {
                name: String::new(),
                host_type: TypeTag::Int64,
            })
            .build();
        assert!(matches!(validate(&ast), Err(CoreError::Validation(_))));
    }

    #[test]
    fn empty_json_agg_columns_is_rejected() {
        let ast = from("authors")
            .select_expr(Expr::JsonAgg {
                field_name: "books".into(),
                columns: vec![],
            })
            .build();
        assert!(matches!(validate(&ast), Err(CoreError::Validation(_))));
    }

    #[test]
    fn chained_union_validates_both_branches() {
        let q1 = from("a").select([col("a", "id").column()]);
        let q2 = from("").select([col("b", "id").column()]);
        let ast = q1.union(q2).build();
        assert!(validate(&ast).is_err());
    }
}
