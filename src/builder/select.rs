//! Fluent SELECT builder (C3).

use crate::ir::ast::{
    Ast, AstKind, Cte, JoinClause, JoinType, OrderByItem, SelectColumn, SetOp, SetOpKind,
};
use crate::ir::column::{Column, TableRef};
use crate::ir::expr::{AggFunc, Expr};

/// Starts a SELECT query against `table`.
#[must_use]
pub fn from(table: &str) -> SelectBuilder {
    SelectBuilder::new(table)
}

/// Starts a CTE chain: `with("recent", query).and("other", query2)`.
#[must_use]
pub fn with(name: &str, query: SelectBuilder) -> CteBuilder {
    CteBuilder {
        ctes: vec![Cte {
            name: name.to_string(),
            columns: Vec::new(),
            query: query.build(),
        }],
    }
}

/// A `TableRef` pointing at a CTE name, for use as a FROM/JOIN target.
#[must_use]
pub fn cte_ref(name: &str) -> TableRef {
    TableRef::new(name)
}

/// Accumulates CTE definitions before they're attached to a SELECT.
pub struct CteBuilder {
    ctes: Vec<Cte>,
}

impl CteBuilder {
    /// Adds another CTE to the chain.
    #[must_use]
    pub fn and(mut self, name: &str, query: SelectBuilder) -> Self {
        self.ctes.push(Cte {
            name: name.to_string(),
            columns: Vec::new(),
            query: query.build(),
        });
        self
    }

    /// Declares explicit column names for the most recently added CTE.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        if let Some(last) = self.ctes.last_mut() {
            last.columns = cols.iter().map(|s| (*s).to_string()).collect();
        }
        self
    }

    /// Attaches the accumulated CTEs to a new SELECT against `table`.
    #[must_use]
    pub fn select_from(self, table: &str) -> SelectBuilder {
        let mut builder = SelectBuilder::new(table);
        builder.ast.ctes = self.ctes;
        builder
    }
}

/// A fluent builder for a `Select` [`Ast`].
pub struct SelectBuilder {
    ast: Ast,
}

impl SelectBuilder {
    /// Creates a builder with `FROM table`.
    #[must_use]
    pub fn new(table: &str) -> Self {
        let mut ast = Ast::empty(AstKind::Select);
        ast.from_table = TableRef::new(table);
        Self { ast }
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.ast.distinct = true;
        self
    }

    #[must_use]
    pub fn select(mut self, cols: impl IntoIterator<Item = Column>) -> Self {
        for c in cols {
            self.ast.select_cols.push(SelectColumn {
                expr: Expr::Column(c),
                alias: None,
            });
        }
        self
    }

    #[must_use]
    pub fn select_as(mut self, col: Column, alias: &str) -> Self {
        self.ast.select_cols.push(SelectColumn {
            expr: Expr::Column(col),
            alias: Some(alias.to_string()),
        });
        self
    }

    #[must_use]
    pub fn select_expr(mut self, expr: Expr) -> Self {
        self.ast.select_cols.push(SelectColumn { expr, alias: None });
        self
    }

    #[must_use]
    pub fn select_expr_as(mut self, expr: Expr, alias: &str) -> Self {
        self.ast.select_cols.push(SelectColumn {
            expr,
            alias: Some(alias.to_string()),
        });
        self
    }

    #[must_use]
    pub fn select_count(self) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Count, None, false);
        self.push_agg(expr, None)
    }

    #[must_use]
    pub fn select_count_as(self, alias: &str) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Count, None, false);
        self.push_agg(expr, Some(alias))
    }

    #[must_use]
    pub fn select_count_distinct(self, col: Column, alias: &str) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Count, Some(Expr::Column(col)), true);
        self.push_agg(expr, Some(alias))
    }

    #[must_use]
    pub fn select_sum(self, col: Column) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Sum, Some(Expr::Column(col)), false);
        self.push_agg(expr, None)
    }

    #[must_use]
    pub fn select_sum_as(self, col: Column, alias: &str) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Sum, Some(Expr::Column(col)), false);
        self.push_agg(expr, Some(alias))
    }

    #[must_use]
    pub fn select_avg_as(self, col: Column, alias: &str) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Avg, Some(Expr::Column(col)), false);
        self.push_agg(expr, Some(alias))
    }

    #[must_use]
    pub fn select_min_as(self, col: Column, alias: &str) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Min, Some(Expr::Column(col)), false);
        self.push_agg(expr, Some(alias))
    }

    #[must_use]
    pub fn select_max_as(self, col: Column, alias: &str) -> Self {
        let expr = self.clone_ast_aggregate(AggFunc::Max, Some(Expr::Column(col)), false);
        self.push_agg(expr, Some(alias))
    }

    fn clone_ast_aggregate(&self, func: AggFunc, arg: Option<Expr>, distinct: bool) -> Expr {
        Expr::Aggregate {
            func,
            arg: arg.map(Box::new),
            distinct,
        }
    }

    fn push_agg(mut self, expr: Expr, alias: Option<&str>) -> Self {
        self.ast.select_cols.push(SelectColumn {
            expr,
            alias: alias.map(str::to_string),
        });
        self
    }

    /// `JSON_AGG`-style projection producing a JSON array of objects keyed by
    /// each column's name (precondition: `cols` non-empty; violating this is
    /// a construction-time programmer error surfaced later by `Validate`).
    #[must_use]
    pub fn select_json_agg(mut self, field_name: &str, cols: impl IntoIterator<Item = Column>) -> Self {
        self.ast.select_cols.push(SelectColumn {
            expr: Expr::JsonAgg {
                field_name: field_name.to_string(),
                columns: cols.into_iter().collect(),
            },
            alias: None,
        });
        self
    }

    fn join_builder(self, join_type: JoinType, table: &str) -> JoinBuilder {
        JoinBuilder {
            parent: self,
            join_type,
            table: TableRef::new(table),
        }
    }

    #[must_use]
    pub fn join(self, table: &str) -> JoinBuilder {
        self.join_builder(JoinType::Inner, table)
    }

    #[must_use]
    pub fn left_join(self, table: &str) -> JoinBuilder {
        self.join_builder(JoinType::Left, table)
    }

    #[must_use]
    pub fn right_join(self, table: &str) -> JoinBuilder {
        self.join_builder(JoinType::Right, table)
    }

    #[must_use]
    pub fn full_join(self, table: &str) -> JoinBuilder {
        self.join_builder(JoinType::Full, table)
    }

    #[must_use]
    pub fn where_clause(mut self, expr: Expr) -> Self {
        self.ast.where_clause = Some(expr);
        self
    }

    #[must_use]
    pub fn group_by(mut self, cols: impl IntoIterator<Item = Column>) -> Self {
        self.ast.group_by.extend(cols);
        self
    }

    #[must_use]
    pub fn having(mut self, expr: Expr) -> Self {
        self.ast.having = Some(expr);
        self
    }

    #[must_use]
    pub fn order_by(mut self, item: OrderByItem) -> Self {
        self.ast.order_by.push(item);
        self
    }

    #[must_use]
    pub fn limit(mut self, expr: Expr) -> Self {
        self.ast.limit = Some(expr);
        self
    }

    #[must_use]
    pub fn offset(mut self, expr: Expr) -> Self {
        self.ast.offset = Some(expr);
        self
    }

    fn set_op(self, op: SetOpKind, other: SelectBuilder) -> SelectBuilder {
        let mut outer = Ast::empty(AstKind::Select);
        outer.set_op = Some(Box::new(SetOp {
            left: self.ast,
            op,
            right: other.ast,
        }));
        SelectBuilder { ast: outer }
    }

    #[must_use]
    pub fn union(self, other: SelectBuilder) -> Self {
        self.set_op(SetOpKind::Union, other)
    }

    #[must_use]
    pub fn union_all(self, other: SelectBuilder) -> Self {
        self.set_op(SetOpKind::UnionAll, other)
    }

    #[must_use]
    pub fn intersect(self, other: SelectBuilder) -> Self {
        self.set_op(SetOpKind::Intersect, other)
    }

    #[must_use]
    pub fn except(self, other: SelectBuilder) -> Self {
        self.set_op(SetOpKind::Except, other)
    }

    /// Consumes the builder, producing the `Ast`.
    #[must_use]
    pub fn build(self) -> Ast {
        self.ast
    }
}

/// Returned by `SelectBuilder::join`/`left_join`/... — requires `.on(...)`
/// before the join can be attached back to the parent select.
pub struct JoinBuilder {
    parent: SelectBuilder,
    join_type: JoinType,
    table: TableRef,
}

impl JoinBuilder {
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.table = self.table.aliased(alias);
        self
    }

    #[must_use]
    pub fn on(mut self, condition: Expr) -> SelectBuilder {
        self.parent.ast.joins.push(JoinClause {
            join_type: self.join_type,
            table: self.table,
            condition,
        });
        self.parent
    }
}

// `Ast` derives `Clone`, so cloning a builder mid-chain (needed for the
// aggregate helpers above, which build an `Expr` from `&self` before
// consuming `self`) is cheap to support without unsafe aliasing.
impl Clone for SelectBuilder {
    fn clone(&self) -> Self {
        Self {
            ast: self.ast.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::column::col;
    use crate::ir::expr::{literal, param};
    use crate::ir::TypeTag;

    #[test]
    fn simple_select_with_where() {
        let ast = from("authors")
            .select([col("authors", "id").column(), col("authors", "name").column()])
            .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
            .build();

        assert_eq!(ast.select_cols.len(), 2);
        assert!(ast.where_clause.is_some());
    }

    #[test]
    fn join_builder_requires_on_to_return_to_select() {
        let ast = from("authors")
            .select([col("authors", "name").column()])
            .select_json_agg("books", [col("books", "id").column(), col("books", "title").column()])
            .left_join("books")
            .on(col("authors", "id").eq(Expr::Column(col("books", "author_id").column())))
            .group_by([col("authors", "name").column()])
            .build();

        assert_eq!(ast.joins.len(), 1);
        assert_eq!(ast.joins[0].join_type, JoinType::Left);
    }

    #[test]
    fn chained_union_nests_left_associatively() {
        let q1 = from("a").select([col("a", "id").column()]);
        let q2 = from("b").select([col("b", "id").column()]);
        let q3 = from("c").select([col("c", "id").column()]);

        let ast = q1.union(q2).union(q3).build();
        let outer = ast.set_op.expect("outer set op");
        assert_eq!(outer.op, SetOpKind::Union);
        assert!(outer.left.set_op.is_some());
    }

    #[test]
    fn cte_builder_attaches_ctes_to_select() {
        let recent = from("orders").select([col("orders", "id").column()]);
        let ast = with("recent", recent)
            .columns(&["id"])
            .select_from("recent")
            .select([col("recent", "id").column()])
            .build();

        assert_eq!(ast.ctes.len(), 1);
        assert_eq!(ast.ctes[0].name, "recent");
        assert_eq!(ast.ctes[0].columns, vec!["id".to_string()]);
    }

    #[test]
    fn select_count_distinct_builds_aggregate() {
        let ast = from("orders")
            .select_count_distinct(col("orders", "user_id").column(), "unique_users")
            .build();

        match &ast.select_cols[0].expr {
            Expr::Aggregate { func, distinct, .. } => {
                assert_eq!(*func, AggFunc::Count);
                assert!(*distinct);
            }
            _ => panic!("expected aggregate"),
        }
    }

    #[test]
    fn literal_helper_is_usable_in_where() {
        let ast = from("users")
            .select([col("users", "id").column()])
            .where_clause(col("users", "active").eq(literal(true)))
            .build();
        assert!(ast.where_clause.is_some());
    }
}
