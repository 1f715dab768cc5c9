//! The Query IR: column/type primitives (C1) and expression/AST nodes (C2).

pub mod ast;
pub mod column;
pub mod expr;

pub use ast::{
    Ast, AstKind, Cte, JoinClause, JoinType, OrderByItem, SelectColumn, SetClause, SetOp,
    SetOpKind,
};
pub use column::{Column, ParamInfo, TableRef, TypeTag};
pub use expr::{literal, param, AggFunc, BinaryOp, Expr, LiteralValue, UnaryOp};
