//! Fluent UPDATE builder (C3).

use crate::ir::ast::{Ast, AstKind, SetClause};
use crate::ir::column::{Column, TableRef};
use crate::ir::expr::Expr;

/// Starts an UPDATE against `table`.
#[must_use]
pub fn update(table: &str) -> UpdateBuilder {
    UpdateBuilder {
        ast: {
            let mut ast = Ast::empty(AstKind::Update);
            ast.from_table = TableRef::new(table);
            ast
        },
    }
}

/// A fluent builder for an `Update` [`Ast`].
pub struct UpdateBuilder {
    ast: Ast,
}

impl UpdateBuilder {
    #[must_use]
    pub fn set(mut self, column: Column, value: Expr) -> Self {
        self.ast.set_clauses.push(SetClause { column, value });
        self
    }

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
    use crate::ir::expr::{literal, param};
    use crate::ir::TypeTag;

    #[test]
    fn update_builder_collects_set_clauses() {
        let ast = update("authors")
            .set(col("authors", "name").column(), literal("New Name"))
            .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
            .build();

        assert_eq!(ast.set_clauses.len(), 1);
        assert!(ast.where_clause.is_some());
    }
}
