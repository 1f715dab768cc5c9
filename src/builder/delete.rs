//! Fluent DELETE builder (C3).

use crate::ir::ast::{Ast, AstKind};
use crate::ir::column::TableRef;
use crate::ir::expr::Expr;

/// Starts a DELETE against `table`.
#[must_use]
pub fn delete_from(table: &str) -> DeleteBuilder {
    DeleteBuilder {
        ast: {
            let mut ast = Ast::empty(AstKind::Delete);
            ast.from_table = TableRef::new(table);
            ast
        },
    }
}

/// A fluent builder for a `Delete` [`Ast`].
pub struct DeleteBuilder {
    ast: Ast,
}

impl DeleteBuilder {
    #[must_use]
    pub fn where_clause(mut self, expr: Expr) -> Self {
        self.ast.where_clause = Some(expr);
        self
    }

    #[must_use]
    pub fn build(self) -> Ast {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::column::col;
    use crate::ir::expr::param;
    use crate::ir::TypeTag;

    #[test]
    fn delete_builder_sets_where_clause() {
        let ast = delete_from("authors")
            .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
            .build();
        assert!(ast.where_clause.is_some());
    }

    #[test]
    fn delete_without_where_is_allowed_by_the_builder() {
        let ast = delete_from("authors").build();
        assert!(ast.where_clause.is_none());
    }
}
