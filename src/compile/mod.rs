//! Compiler (C6): walks a validated [`Ast`] and emits dialect-specific SQL.
//!
//! One [`SqlDialect`] implementation exists per target (`postgres`, `mysql`,
//! `sqlite`); [`compile`] is the single entry point shared by all three. The
//! emitter threads one buffer and one growing parameter-name list through the
//! whole recursive walk, so `paramOrder` always matches the left-to-right
//! pre-order traversal of `Expr::Param` occurrences regardless of how deeply
//! nested a subquery or CTE is.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::{CoreError, Result};
use crate::ir::ast::{Ast, AstKind, Cte, OrderByItem, SetOp};
use crate::ir::column::{Column, TableRef};
use crate::ir::expr::{Expr, LiteralValue, UnaryOp};
use crate::validate;

/// Dialect-specific rendering rules consumed by the emitter.
///
/// Every method has a sensible ANSI-leaning default; a dialect overrides only
/// the points where it actually diverges.
pub trait SqlDialect {
    /// The dialect's name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Quotes an identifier, e.g. `"name"` or `` `name` ``.
    fn quote_identifier(&self, name: &str) -> String;

    /// Renders the placeholder for the parameter at 1-based position `index`
    /// within the query's overall parameter order.
    fn placeholder(&self, index: usize) -> String;

    /// Renders a boolean literal.
    fn render_bool(&self, value: bool) -> &'static str;

    /// Whether `RETURNING` is emitted for `INSERT`.
    fn supports_returning(&self) -> bool;

    /// `Some(column)` if `expr` is a plain column reference, for
    /// `ORDER BY`-collation purposes; dialects that never add a collation
    /// suffix can ignore the argument.
    fn order_by_suffix(&self, column: Option<&Column>) -> Option<&'static str> {
        let _ = column;
        None
    }

    /// Renders the `ILIKE` pseudo-operator.
    fn ilike(&self, lhs_sql: &str, rhs_sql: &str) -> String;

    /// Renders a `JSONAggExpr` over `columns`.
    fn json_agg(&self, columns: &[Column]) -> String;
}

/// Builds the `'col1', t.c1, 'col2', t.c2` argument list shared by every
/// dialect's JSON object constructor.
fn json_object_args(dialect: &dyn SqlDialect, columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| {
            format!(
                "'{}', {}.{}",
                c.name,
                dialect.quote_identifier(&c.table),
                dialect.quote_identifier(&c.name)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validates `ast`, then compiles it for `dialect`, returning `(sql,
/// paramOrder)`.
pub fn compile(ast: &Ast, dialect: &dyn SqlDialect) -> Result<(String, Vec<String>)> {
    validate::validate(ast)?;
    let mut emitter = Emitter::new(dialect);
    emitter.emit_ast(ast)?;
    let sql = emitter.buf.trim().to_string();
    tracing::debug!(
        dialect = dialect.name(),
        param_count = emitter.param_order.len(),
        "compile: emitted sql"
    );
    Ok((sql, emitter.param_order))
}

struct Emitter<'d> {
    dialect: &'d dyn SqlDialect,
    buf: String,
    param_order: Vec<String>,
}

impl<'d> Emitter<'d> {
    fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self {
            dialect,
            buf: String::new(),
            param_order: Vec::new(),
        }
    }

    fn quote(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    /// Runs `f` against a fresh buffer (sharing `self`'s dialect and
    /// `param_order`) and returns what it wrote, restoring the outer buffer.
    fn capture(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<String> {
        let outer = std::mem::take(&mut self.buf);
        f(self)?;
        Ok(std::mem::replace(&mut self.buf, outer))
    }

    fn emit_table_ref(&mut self, table: &TableRef) {
        self.buf.push_str(&self.quote(&table.name));
        if let Some(alias) = &table.alias {
            self.buf.push_str(" AS ");
            self.buf.push_str(&self.quote(alias));
        }
    }

    fn emit_ast(&mut self, ast: &Ast) -> Result<()> {
        if !ast.ctes.is_empty() {
            self.emit_with_clause(&ast.ctes)?;
        }
        if let Some(set_op) = &ast.set_op {
            self.emit_set_op(set_op)?;
            self.emit_trailing_clauses(ast)?;
            return Ok(());
        }
        match ast.kind {
            AstKind::Select => {
                self.emit_select_body(ast)?;
                self.emit_trailing_clauses(ast)?;
            }
            AstKind::Insert => self.emit_insert(ast)?,
            AstKind::Update => self.emit_update(ast)?,
            AstKind::Delete => self.emit_delete(ast)?,
        }
        Ok(())
    }

    fn emit_with_clause(&mut self, ctes: &[Cte]) -> Result<()> {
        self.buf.push_str("WITH ");
        for (i, cte) in ctes.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            self.buf.push_str(&self.quote(&cte.name));
            if !cte.columns.is_empty() {
                self.buf.push_str(" (");
                for (j, c) in cte.columns.iter().enumerate() {
                    if j > 0 {
                        self.buf.push_str(", ");
                    }
                    self.buf.push_str(&self.quote(c));
                }
                self.buf.push(')');
            }
            self.buf.push_str(" AS (");
            self.emit_ast(&cte.query)?;
            self.buf.push(')');
        }
        self.buf.push(' ');
        Ok(())
    }

    fn emit_set_op(&mut self, set_op: &SetOp) -> Result<()> {
        self.buf.push('(');
        self.emit_ast(&set_op.left)?;
        self.buf.push(')');
        self.buf.push(' ');
        self.buf.push_str(set_op.op.as_sql());
        self.buf.push(' ');
        self.buf.push('(');
        self.emit_ast(&set_op.right)?;
        self.buf.push(')');
        Ok(())
    }

    fn emit_select_body(&mut self, ast: &Ast) -> Result<()> {
        self.buf.push_str("SELECT ");
        if ast.distinct {
            self.buf.push_str("DISTINCT ");
        }
        if ast.select_cols.is_empty() {
            self.buf.push('*');
        } else {
            for (i, sc) in ast.select_cols.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                self.emit_expr(&sc.expr)?;
                let implicit_alias = match &sc.expr {
                    Expr::JsonAgg { field_name, .. } => Some(field_name.clone()),
                    _ => None,
                };
                if let Some(alias) = sc.alias.clone().or(implicit_alias) {
                    self.buf.push_str(" AS ");
                    self.buf.push_str(&self.quote(&alias));
                }
            }
        }
        self.buf.push_str(" FROM ");
        self.emit_table_ref(&ast.from_table);

        for join in &ast.joins {
            self.buf.push(' ');
            self.buf.push_str(join.join_type.as_sql());
            self.buf.push(' ');
            self.emit_table_ref(&join.table);
            self.buf.push_str(" ON ");
            self.emit_expr(&join.condition)?;
        }

        if let Some(w) = &ast.where_clause {
            self.buf.push_str(" WHERE ");
            self.emit_expr(w)?;
        }

        if !ast.group_by.is_empty() {
            self.buf.push_str(" GROUP BY ");
            for (i, c) in ast.group_by.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                self.emit_column(c);
            }
        }

        if let Some(h) = &ast.having {
            self.buf.push_str(" HAVING ");
            self.emit_expr(h)?;
        }

        Ok(())
    }

    fn emit_trailing_clauses(&mut self, ast: &Ast) -> Result<()> {
        if !ast.order_by.is_empty() {
            self.buf.push_str(" ORDER BY ");
            for (i, item) in ast.order_by.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                self.emit_order_by_item(item)?;
            }
        }
        if let Some(l) = &ast.limit {
            self.buf.push_str(" LIMIT ");
            self.emit_expr(l)?;
        }
        if let Some(o) = &ast.offset {
            self.buf.push_str(" OFFSET ");
            self.emit_expr(o)?;
        }
        Ok(())
    }

    fn emit_order_by_item(&mut self, item: &OrderByItem) -> Result<()> {
        self.emit_expr(&item.expr)?;
        let as_column = match &item.expr {
            Expr::Column(c) => Some(c),
            _ => None,
        };
        if let Some(suffix) = self.dialect.order_by_suffix(as_column) {
            self.buf.push_str(suffix);
        }
        if item.desc {
            self.buf.push_str(" DESC");
        }
        Ok(())
    }

    fn emit_insert(&mut self, ast: &Ast) -> Result<()> {
        self.buf.push_str("INSERT INTO ");
        self.buf.push_str(&self.quote(&ast.from_table.name));
        if !ast.insert_cols.is_empty() {
            self.buf.push_str(" (");
            for (i, c) in ast.insert_cols.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                self.buf.push_str(&self.quote(&c.name));
            }
            self.buf.push(')');
        }
        self.buf.push_str(" VALUES (");
        for (i, v) in ast.insert_vals.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            self.emit_expr(v)?;
        }
        self.buf.push(')');

        if self.dialect.supports_returning() && !ast.returning.is_empty() {
            self.buf.push_str(" RETURNING ");
            for (i, c) in ast.returning.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                self.buf.push_str(&self.quote(&c.name));
            }
        }
        Ok(())
    }

    fn emit_update(&mut self, ast: &Ast) -> Result<()> {
        self.buf.push_str("UPDATE ");
        self.buf.push_str(&self.quote(&ast.from_table.name));
        self.buf.push_str(" SET ");
        for (i, sc) in ast.set_clauses.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            self.buf.push_str(&self.quote(&sc.column.name));
            self.buf.push_str(" = ");
            self.emit_expr(&sc.value)?;
        }
        if let Some(w) = &ast.where_clause {
            self.buf.push_str(" WHERE ");
            self.emit_expr(w)?;
        }
        Ok(())
    }

    fn emit_delete(&mut self, ast: &Ast) -> Result<()> {
        self.buf.push_str("DELETE FROM ");
        self.buf.push_str(&self.quote(&ast.from_table.name));
        if let Some(w) = &ast.where_clause {
            self.buf.push_str(" WHERE ");
            self.emit_expr(w)?;
        }
        Ok(())
    }

    fn emit_column(&mut self, col: &Column) {
        self.buf.push_str(&self.quote(&col.table));
        self.buf.push('.');
        self.buf.push_str(&self.quote(&col.name));
    }

    fn emit_literal(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::Int(i) => self.buf.push_str(&i.to_string()),
            LiteralValue::Float(f) => self.buf.push_str(&f.to_string()),
            LiteralValue::Bool(b) => self.buf.push_str(self.dialect.render_bool(*b)),
            LiteralValue::Str(s) => {
                self.buf.push('\'');
                self.buf.push_str(&s.replace('\'', "''"));
                self.buf.push('\'');
            }
            LiteralValue::Null => self.buf.push_str("NULL"),
        }
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Column(c) => self.emit_column(c),
            Expr::Param { name, .. } => {
                self.param_order.push(name.clone());
                let idx = self.param_order.len();
                let placeholder = self.dialect.placeholder(idx);
                self.buf.push_str(&placeholder);
            }
            Expr::Literal(v) => self.emit_literal(v),
            Expr::Binary { left, op, right } => {
                self.buf.push('(');
                self.emit_expr(left)?;
                self.buf.push(' ');
                self.buf.push_str(op.as_sql());
                self.buf.push(' ');
                self.emit_expr(right)?;
                self.buf.push(')');
            }
            Expr::Unary { op, expr } => {
                match op {
                    UnaryOp::Not => {
                        self.buf.push_str("(NOT ");
                        self.emit_expr(expr)?;
                        self.buf.push(')');
                    }
                    UnaryOp::IsNull => {
                        self.buf.push('(');
                        self.emit_expr(expr)?;
                        self.buf.push_str(" IS NULL)");
                    }
                    UnaryOp::IsNotNull => {
                        self.buf.push('(');
                        self.emit_expr(expr)?;
                        self.buf.push_str(" IS NOT NULL)");
                    }
                }
            }
            Expr::Func { name, args } => {
                if name == "ILIKE" {
                    if args.len() != 2 {
                        return Err(CoreError::Internal(
                            "ILIKE requires exactly two arguments".to_string(),
                        ));
                    }
                    let lhs = self.capture(|e| e.emit_expr(&args[0]))?;
                    let rhs = self.capture(|e| e.emit_expr(&args[1]))?;
                    self.buf.push('(');
                    self.buf.push_str(&self.dialect.ilike(&lhs, &rhs));
                    self.buf.push(')');
                } else {
                    self.buf.push_str(name);
                    self.buf.push('(');
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            self.buf.push_str(", ");
                        }
                        self.emit_expr(a)?;
                    }
                    self.buf.push(')');
                }
            }
            Expr::List(values) => {
                self.buf.push('(');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        self.buf.push_str(", ");
                    }
                    self.emit_expr(v)?;
                }
                self.buf.push(')');
            }
            Expr::Aggregate { func, arg, distinct } => {
                self.buf.push_str(func.as_sql());
                self.buf.push('(');
                if *distinct {
                    self.buf.push_str("DISTINCT ");
                }
                match arg {
                    Some(a) => self.emit_expr(a)?,
                    None => self.buf.push('*'),
                }
                self.buf.push(')');
            }
            Expr::JsonAgg { columns, .. } => {
                self.buf.push_str(&self.dialect.json_agg(columns));
            }
            Expr::Subquery(ast) => {
                self.buf.push('(');
                self.emit_ast(ast)?;
                self.buf.push(')');
            }
            Expr::Exists { query, negated } => {
                if *negated {
                    self.buf.push_str("NOT ");
                }
                self.buf.push_str("EXISTS (");
                self.emit_ast(query)?;
                self.buf.push(')');
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{col, from, insert_into};
    use crate::ir::{literal, param, TypeTag};

    #[test]
    fn placeholder_count_matches_param_order_len() {
        let ast = from("authors")
            .select([col("authors", "id").column()])
            .where_clause(
                col("authors", "id")
                    .eq(param("a", TypeTag::Int64))
                    .and(col("authors", "name").eq(param("b", TypeTag::String))),
            )
            .build();
        let (sql, params) = compile(&ast, &PostgresDialect).unwrap();
        assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(sql.matches('$').count(), 2);
    }

    #[test]
    fn param_order_is_identical_across_dialects() {
        let ast = insert_into("authors")
            .columns([col("authors", "name").column()])
            .values([param("name", TypeTag::String)])
            .build();
        let (_, pg) = compile(&ast, &PostgresDialect).unwrap();
        let (_, my) = compile(&ast, &MySqlDialect).unwrap();
        let (_, lite) = compile(&ast, &SqliteDialect).unwrap();
        assert_eq!(pg, my);
        assert_eq!(my, lite);
    }

    #[test]
    fn compile_rejects_an_invalid_ast() {
        let ast = from("users; DROP TABLE --")
            .select([col("users", "id").column()])
            .build();
        assert!(compile(&ast, &PostgresDialect).is_err());
    }

    #[test]
    fn compile_is_deterministic() {
        let ast = from("authors").select([col("authors", "id").column()]).build();
        let a = compile(&ast, &PostgresDialect).unwrap();
        let b = compile(&ast, &PostgresDialect).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sql_has_no_leading_or_trailing_whitespace() {
        let ast = from("authors").select([col("authors", "id").column()]).build();
        let (sql, _) = compile(&ast, &PostgresDialect).unwrap();
        assert_eq!(sql, sql.trim());
    }

    #[test]
    fn string_literal_escapes_embedded_quotes() {
        let ast = from("authors")
            .select([col("authors", "id").column()])
            .where_clause(col("authors", "name").eq(literal("O'Brien")))
            .build();
        let (sql, _) = compile(&ast, &PostgresDialect).unwrap();
        assert!(sql.contains("'O''Brien'"));
    }
}
