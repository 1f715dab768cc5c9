//! The query AST: the tree a single registered query compiles from (C2).

use super::column::{Column, ParamInfo, TableRef};
use super::expr::Expr;

/// The kind of statement an [`Ast`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Join types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableRef,
    pub condition: Expr,
}

/// A projected column in a SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub desc: bool,
}

/// An assignment in an UPDATE's SET clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub column: Column,
    pub value: Expr,
}

/// Set-operation kind (compound query).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOpKind {
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// A compound query: `left <op> right`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOp {
    pub left: Ast,
    pub op: SetOpKind,
    pub right: Ast,
}

/// A Common Table Expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub query: Ast,
}

/// A full query tree: the unit the validator, serializer, and compiler all
/// operate on.
///
/// `Validate` enforces the full invariant list this type is expected to
/// satisfy before it reaches the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub kind: AstKind,
    pub distinct: bool,
    pub from_table: TableRef,
    pub joins: Vec<JoinClause>,
    pub select_cols: Vec<SelectColumn>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Column>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub insert_cols: Vec<Column>,
    pub insert_vals: Vec<Expr>,
    pub returning: Vec<Column>,
    pub set_clauses: Vec<SetClause>,
    pub set_op: Option<Box<SetOp>>,
    pub ctes: Vec<Cte>,
    pub params: Vec<ParamInfo>,
}

impl Ast {
    /// An empty `Ast` of the given kind, ready for a builder to fill in.
    pub(crate) fn empty(kind: AstKind) -> Self {
        Self {
            kind,
            distinct: false,
            from_table: TableRef::default(),
            joins: Vec::new(),
            select_cols: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            insert_cols: Vec::new(),
            insert_vals: Vec::new(),
            returning: Vec::new(),
            set_clauses: Vec::new(),
            set_op: None,
            ctes: Vec::new(),
            params: Vec::new(),
        }
    }
}
