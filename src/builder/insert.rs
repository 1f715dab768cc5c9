//! Fluent INSERT builder (C3).

use crate::ir::ast::{Ast, AstKind};
use crate::ir::column::{Column, TableRef};
use crate::ir::expr::Expr;

/// Starts an INSERT against `table`.
#[must_use]
pub fn insert_into(table: &str) -> InsertBuilder {
    InsertBuilder {
        ast: {
            let mut ast = Ast::empty(AstKind::Insert);
            ast.from_table = TableRef::new(table);
            ast
        },
    }
}

/// A fluent builder for an `Insert` [`Ast`].
pub struct InsertBuilder {
    ast: Ast,
}

impl InsertBuilder {
    #[must_use]
    pub fn columns(mut self, cols: impl IntoIterator<Item = Column>) -> Self {
        self.ast.insert_cols = cols.into_iter().collect();
        self
    }

    #[must_use]
    pub fn values(mut self, vals: impl IntoIterator<Item = Expr>) -> Self {
        self.ast.insert_vals = vals.into_iter().collect();
        self
    }

    /// Requests `RETURNING` columns. Ignored by the MySQL backend (§4.6.3).
    #[must_use]
    pub fn returning(mut self, cols: impl IntoIterator<Item = Column>) -> Self {
        self.ast.returning = cols.into_iter().collect();
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
    fn insert_builder_collects_columns_values_returning() {
        let ast = insert_into("authors")
            .columns([
                col("authors", "public_id").column(),
                col("authors", "name").column(),
            ])
            .values([
                param("public_id", TypeTag::String),
                param("name", TypeTag::String),
            ])
            .returning([col("authors", "public_id").column()])
            .build();

        assert_eq!(ast.insert_cols.len(), 2);
        assert_eq!(ast.insert_vals.len(), 2);
        assert_eq!(ast.returning.len(), 1);
    }
}
