//! Expression tree nodes (C2).

use super::ast::Ast;
use super::column::{Column, TypeTag};

/// A compile-time-constant value inlined into generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Like,
    In,
}

impl BinaryOp {
    /// The ANSI SQL spelling of the operator (dialects do not diverge here).
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::In => "IN",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggFunc {
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// An SQL expression, the closed sum type at the heart of the IR.
///
/// Every consumer (validator, serializer, compiler, tree walker) must
/// exhaustively dispatch on this enum. Adding a variant without updating all
/// four is a soundness bug.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A reference to a column descriptor.
    Column(Column),
    /// A named placeholder; callers reference the same name multiple times to
    /// reuse a binding.
    Param { name: String, host_type: TypeTag },
    /// A compile-time constant.
    Literal(LiteralValue),
    /// `left <op> right`.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `<op> expr` (`NOT`, `IS NULL`, `IS NOT NULL`).
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// A generic function call. The name `"ILIKE"` is a recognized
    /// pseudo-function requiring dialect translation (§4.6.5).
    Func { name: String, args: Vec<Expr> },
    /// A list of values; only valid as the right operand of `IN`.
    List(Vec<Expr>),
    /// `func(DISTINCT? arg)`; `arg` nil means `COUNT(*)`.
    Aggregate {
        func: AggFunc,
        arg: Option<Box<Expr>>,
        distinct: bool,
    },
    /// Produces a JSON array of objects keyed by each column's name.
    JsonAgg { field_name: String, columns: Vec<Column> },
    /// A full query used as a scalar / IN operand.
    Subquery(Box<Ast>),
    /// `[NOT] EXISTS (...)`.
    Exists { query: Box<Ast>, negated: bool },
}

impl Expr {
    /// Wraps `self` in a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn eq(self, right: Expr) -> Expr {
        self.binary(BinaryOp::Eq, right)
    }

    #[must_use]
    pub fn ne(self, right: Expr) -> Expr {
        self.binary(BinaryOp::NotEq, right)
    }

    #[must_use]
    pub fn lt(self, right: Expr) -> Expr {
        self.binary(BinaryOp::Lt, right)
    }

    #[must_use]
    pub fn le(self, right: Expr) -> Expr {
        self.binary(BinaryOp::LtEq, right)
    }

    #[must_use]
    pub fn gt(self, right: Expr) -> Expr {
        self.binary(BinaryOp::Gt, right)
    }

    #[must_use]
    pub fn ge(self, right: Expr) -> Expr {
        self.binary(BinaryOp::GtEq, right)
    }

    #[must_use]
    pub fn and(self, right: Expr) -> Expr {
        self.binary(BinaryOp::And, right)
    }

    #[must_use]
    pub fn or(self, right: Expr) -> Expr {
        self.binary(BinaryOp::Or, right)
    }

    #[must_use]
    pub fn like(self, pattern: Expr) -> Expr {
        self.binary(BinaryOp::Like, pattern)
    }

    /// `ILIKE`, a portable pseudo-operator translated per-dialect (§4.6.5).
    #[must_use]
    pub fn ilike(self, pattern: Expr) -> Expr {
        Expr::Func {
            name: "ILIKE".to_string(),
            args: vec![self, pattern],
        }
    }

    #[must_use]
    pub fn in_list(self, values: Vec<Expr>) -> Expr {
        self.binary(BinaryOp::In, Expr::List(values))
    }

    #[must_use]
    pub fn in_subquery(self, subquery: Ast) -> Expr {
        self.binary(BinaryOp::In, Expr::Subquery(Box::new(subquery)))
    }

    #[must_use]
    pub fn is_null(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::IsNull,
            expr: Box::new(self),
        }
    }

    #[must_use]
    pub fn is_not_null(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::IsNotNull,
            expr: Box::new(self),
        }
    }

    #[must_use]
    pub fn not(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }
}

/// Creates a named parameter placeholder.
#[must_use]
pub fn param(name: impl Into<String>, host_type: TypeTag) -> Expr {
    Expr::Param {
        name: name.into(),
        host_type,
    }
}

/// Wraps a runtime value as a literal expression.
#[must_use]
pub fn literal(value: impl Into<LiteralValue>) -> Expr {
    Expr::Literal(value.into())
}

impl From<i64> for LiteralValue {
    fn from(v: i64) -> Self {
        LiteralValue::Int(v)
    }
}
impl From<f64> for LiteralValue {
    fn from(v: f64) -> Self {
        LiteralValue::Float(v)
    }
}
impl From<bool> for LiteralValue {
    fn from(v: bool) -> Self {
        LiteralValue::Bool(v)
    }
}
impl From<&str> for LiteralValue {
    fn from(v: &str) -> Self {
        LiteralValue::Str(v.to_string())
    }
}
impl From<String> for LiteralValue {
    fn from(v: String) -> Self {
        LiteralValue::Str(v)
    }
}
