//! Column-level comparison/ordering helpers (C3).

use crate::ir::ast::{Ast, OrderByItem};
use crate::ir::column::Column;
use crate::ir::expr::Expr;

/// A handle on a [`Column`] that produces [`Expr`] nodes through comparison
/// and ordering helpers.
///
/// `col("authors", "id")` returns one of these; the methods on it mirror the
/// operators the IR's `BinaryOp`/`UnaryOp` enums support.
#[derive(Debug, Clone)]
pub struct ColumnHandle(pub Column);

/// Creates a column handle for `table.name` with host type `Any` and
/// `nullable = false`. Chain [`ColumnHandle::of_type`] /
/// [`ColumnHandle::nullable`] to refine it before use.
#[must_use]
pub fn col(table: &str, name: &str) -> ColumnHandle {
    ColumnHandle(Column::new(table, name))
}

impl ColumnHandle {
    #[must_use]
    pub fn of_type(mut self, host_type: crate::ir::column::TypeTag) -> Self {
        self.0.host_type = host_type;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.0.nullable = true;
        self
    }

    #[must_use]
    pub fn column(&self) -> Column {
        self.0.clone()
    }

    fn expr(&self) -> Expr {
        Expr::Column(self.0.clone())
    }

    #[must_use]
    pub fn eq(self, rhs: Expr) -> Expr {
        self.expr().eq(rhs)
    }

    #[must_use]
    pub fn ne(self, rhs: Expr) -> Expr {
        self.expr().ne(rhs)
    }

    #[must_use]
    pub fn lt(self, rhs: Expr) -> Expr {
        self.expr().lt(rhs)
    }

    #[must_use]
    pub fn le(self, rhs: Expr) -> Expr {
        self.expr().le(rhs)
    }

    #[must_use]
    pub fn gt(self, rhs: Expr) -> Expr {
        self.expr().gt(rhs)
    }

    #[must_use]
    pub fn ge(self, rhs: Expr) -> Expr {
        self.expr().ge(rhs)
    }

    #[must_use]
    pub fn like(self, pattern: Expr) -> Expr {
        self.expr().like(pattern)
    }

    #[must_use]
    pub fn ilike(self, pattern: Expr) -> Expr {
        self.expr().ilike(pattern)
    }

    #[must_use]
    pub fn in_values(self, values: Vec<Expr>) -> Expr {
        self.expr().in_list(values)
    }

    #[must_use]
    pub fn in_subquery(self, subquery: Ast) -> Expr {
        self.expr().in_subquery(subquery)
    }

    #[must_use]
    pub fn gt_subquery(self, subquery: Ast) -> Expr {
        self.expr().gt(Expr::Subquery(Box::new(subquery)))
    }

    #[must_use]
    pub fn is_null(self) -> Expr {
        self.expr().is_null()
    }

    #[must_use]
    pub fn is_not_null(self) -> Expr {
        self.expr().is_not_null()
    }

    #[must_use]
    pub fn asc(self) -> OrderByItem {
        OrderByItem {
            expr: self.expr(),
            desc: false,
        }
    }

    #[must_use]
    pub fn desc(self) -> OrderByItem {
        OrderByItem {
            expr: self.expr(),
            desc: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::literal;

    #[test]
    fn column_helpers_build_comparison_exprs() {
        let expr = col("authors", "id").eq(literal(1_i64));
        assert!(matches!(expr, Expr::Binary { .. }));
    }

    #[test]
    fn ordering_helpers_set_desc_flag() {
        let item = col("authors", "name").desc();
        assert!(item.desc);
        let item = col("authors", "name").asc();
        assert!(!item.desc);
    }
}
