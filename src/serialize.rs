//! Canonical JSON serialization of the IR (C5).
//!
//! The wire form is a tagged union keyed on a
//! string `"type"` field, `omitempty` semantics via `skip_serializing_if`,
//! and array (never map) containers so output is diff-stable. Because typed
//! column classes don't survive JSON, deserialization reconstructs a generic
//! [`Column`] for every column reference — there is no per-table wire type.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ir::ast::{
    Ast, AstKind, Cte, JoinClause, JoinType, OrderByItem, SelectColumn, SetClause, SetOp,
    SetOpKind,
};
use crate::ir::column::{Column, ParamInfo, TableRef, TypeTag};
use crate::ir::expr::{AggFunc, BinaryOp, Expr, LiteralValue, UnaryOp};

// ---------------------------------------------------------------------
// Column wire form
// ---------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct ColumnWire {
    table: String,
    name: String,
    go_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    nullable: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl From<&Column> for ColumnWire {
    fn from(c: &Column) -> Self {
        Self {
            table: c.table.clone(),
            name: c.name.clone(),
            go_type: c.host_type.as_str().to_string(),
            nullable: c.nullable,
        }
    }
}

impl From<ColumnWire> for Column {
    fn from(w: ColumnWire) -> Self {
        Column {
            table: w.table,
            name: w.name,
            host_type: TypeTag::from_wire(&w.go_type),
            nullable: w.nullable,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableRefWire {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

impl From<&TableRef> for TableRefWire {
    fn from(t: &TableRef) -> Self {
        Self {
            name: t.name.clone(),
            alias: t.alias.clone(),
        }
    }
}

impl From<TableRefWire> for TableRef {
    fn from(w: TableRefWire) -> Self {
        TableRef {
            name: w.name,
            alias: w.alias,
        }
    }
}

// ---------------------------------------------------------------------
// Expr wire form
// ---------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ExprWire {
    Column(ColumnWire),
    Param {
        name: String,
        go_type: String,
    },
    Literal {
        value: serde_json::Value,
    },
    Binary {
        left: Box<ExprWire>,
        op: String,
        right: Box<ExprWire>,
    },
    Unary {
        op: String,
        expr: Box<ExprWire>,
    },
    Func {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<ExprWire>,
    },
    List {
        values: Vec<ExprWire>,
    },
    Aggregate {
        func: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg: Option<Box<ExprWire>>,
        #[serde(default, skip_serializing_if = "is_false")]
        distinct: bool,
    },
    JsonAgg {
        field_name: String,
        columns: Vec<ColumnWire>,
    },
    Subquery {
        query: Box<AstWire>,
    },
    Exists {
        query: Box<AstWire>,
        #[serde(default, skip_serializing_if = "is_false")]
        negated: bool,
    },
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "=",
        BinaryOp::NotEq => "<>",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::And => "AND",
        BinaryOp::Or => "OR",
        BinaryOp::Like => "LIKE",
        BinaryOp::In => "IN",
    }
}

fn binary_op_from_str(s: &str) -> Result<BinaryOp> {
    Ok(match s {
        "=" => BinaryOp::Eq,
        "<>" => BinaryOp::NotEq,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::LtEq,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::GtEq,
        "AND" => BinaryOp::And,
        "OR" => BinaryOp::Or,
        "LIKE" => BinaryOp::Like,
        "IN" => BinaryOp::In,
        other => return Err(CoreError::Serialization(format!("unknown binary op {other:?}"))),
    })
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "NOT",
        UnaryOp::IsNull => "IS NULL",
        UnaryOp::IsNotNull => "IS NOT NULL",
    }
}

fn unary_op_from_str(s: &str) -> Result<UnaryOp> {
    Ok(match s {
        "NOT" => UnaryOp::Not,
        "IS NULL" => UnaryOp::IsNull,
        "IS NOT NULL" => UnaryOp::IsNotNull,
        other => return Err(CoreError::Serialization(format!("unknown unary op {other:?}"))),
    })
}

fn agg_func_str(f: AggFunc) -> &'static str {
    f.as_sql()
}

fn agg_func_from_str(s: &str) -> Result<AggFunc> {
    Ok(match s {
        "COUNT" => AggFunc::Count,
        "SUM" => AggFunc::Sum,
        "AVG" => AggFunc::Avg,
        "MIN" => AggFunc::Min,
        "MAX" => AggFunc::Max,
        other => return Err(CoreError::Serialization(format!("unknown aggregate function {other:?}"))),
    })
}

fn literal_to_json(v: &LiteralValue) -> serde_json::Value {
    match v {
        LiteralValue::Int(i) => serde_json::Value::from(*i),
        LiteralValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        LiteralValue::Bool(b) => serde_json::Value::from(*b),
        LiteralValue::Str(s) => serde_json::Value::from(s.clone()),
        LiteralValue::Null => serde_json::Value::Null,
    }
}

fn literal_from_json(v: serde_json::Value) -> LiteralValue {
    match v {
        serde_json::Value::Null => LiteralValue::Null,
        serde_json::Value::Bool(b) => LiteralValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                LiteralValue::Int(i)
            } else {
                LiteralValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => LiteralValue::Str(s),
        other => LiteralValue::Str(other.to_string()),
    }
}

impl From<&Expr> for ExprWire {
    fn from(expr: &Expr) -> Self {
        match expr {
            Expr::Column(c) => ExprWire::Column(c.into()),
            Expr::Param { name, host_type } => ExprWire::Param {
                name: name.clone(),
                go_type: host_type.as_str().to_string(),
            },
            Expr::Literal(v) => ExprWire::Literal {
                value: literal_to_json(v),
            },
            Expr::Binary { left, op, right } => ExprWire::Binary {
                left: Box::new((&**left).into()),
                op: binary_op_str(*op).to_string(),
                right: Box::new((&**right).into()),
            },
            Expr::Unary { op, expr } => ExprWire::Unary {
                op: unary_op_str(*op).to_string(),
                expr: Box::new((&**expr).into()),
            },
            Expr::Func { name, args } => ExprWire::Func {
                name: name.clone(),
                args: args.iter().map(Into::into).collect(),
            },
            Expr::List(values) => ExprWire::List {
                values: values.iter().map(Into::into).collect(),
            },
            Expr::Aggregate { func, arg, distinct } => ExprWire::Aggregate {
                func: agg_func_str(*func).to_string(),
                arg: arg.as_ref().map(|a| Box::new((&**a).into())),
                distinct: *distinct,
            },
            Expr::JsonAgg { field_name, columns } => ExprWire::JsonAgg {
                field_name: field_name.clone(),
                columns: columns.iter().map(Into::into).collect(),
            },
            Expr::Subquery(ast) => ExprWire::Subquery {
                query: Box::new((&**ast).into()),
            },
            Expr::Exists { query, negated } => ExprWire::Exists {
                query: Box::new((&**query).into()),
                negated: *negated,
            },
        }
    }
}

impl TryFrom<ExprWire> for Expr {
    type Error = CoreError;

    fn try_from(wire: ExprWire) -> Result<Self> {
        Ok(match wire {
            ExprWire::Column(c) => Expr::Column(c.into()),
            ExprWire::Param { name, go_type } => Expr::Param {
                name,
                host_type: TypeTag::from_wire(&go_type),
            },
            ExprWire::Literal { value } => Expr::Literal(literal_from_json(value)),
            ExprWire::Binary { left, op, right } => Expr::Binary {
                left: Box::new((*left).try_into()?),
                op: binary_op_from_str(&op)?,
                right: Box::new((*right).try_into()?),
            },
            ExprWire::Unary { op, expr } => Expr::Unary {
                op: unary_op_from_str(&op)?,
                expr: Box::new((*expr).try_into()?),
            },
            ExprWire::Func { name, args } => Expr::Func {
                name,
                args: args.into_iter().map(TryInto::try_into).collect::<Result<_>>()?,
            },
            ExprWire::List { values } => {
                Expr::List(values.into_iter().map(TryInto::try_into).collect::<Result<_>>()?)
            }
            ExprWire::Aggregate { func, arg, distinct } => Expr::Aggregate {
                func: agg_func_from_str(&func)?,
                arg: arg.map(|a| (*a).try_into()).transpose()?.map(Box::new),
                distinct,
            },
            ExprWire::JsonAgg { field_name, columns } => Expr::JsonAgg {
                field_name,
                columns: columns.into_iter().map(Into::into).collect(),
            },
            ExprWire::Subquery { query } => Expr::Subquery(Box::new((*query).try_into()?)),
            ExprWire::Exists { query, negated } => Expr::Exists {
                query: Box::new((*query).try_into()?),
                negated,
            },
        })
    }
}

// ---------------------------------------------------------------------
// Ast wire form
// ---------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct JoinClauseWire {
    #[serde(rename = "type")]
    join_type: String,
    table: TableRefWire,
    condition: ExprWire,
}

#[derive(Debug, Serialize, Deserialize)]
struct SelectColumnWire {
    expr: ExprWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderByWire {
    expr: ExprWire,
    #[serde(default, skip_serializing_if = "is_false")]
    desc: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SetClauseWire {
    column: ColumnWire,
    value: ExprWire,
}

#[derive(Debug, Serialize, Deserialize)]
struct SetOpWire {
    left: Box<AstWire>,
    op: String,
    right: Box<AstWire>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CteWire {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    columns: Vec<String>,
    query: Box<AstWire>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParamInfoWire {
    name: String,
    go_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AstWire {
    kind: String,
    #[serde(default, skip_serializing_if = "is_false")]
    distinct: bool,
    #[serde(default, skip_serializing_if = "TableRefWire::is_empty")]
    from_table: TableRefWire,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    joins: Vec<JoinClauseWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    select_cols: Vec<SelectColumnWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    where_clause: Option<ExprWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    group_by: Vec<ColumnWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    having: Option<ExprWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    order_by: Vec<OrderByWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<ExprWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset: Option<ExprWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    insert_cols: Vec<ColumnWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    insert_vals: Vec<ExprWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    returning: Vec<ColumnWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    set_clauses: Vec<SetClauseWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    set_op: Option<Box<SetOpWire>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ctes: Vec<CteWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<ParamInfoWire>,
}

impl TableRefWire {
    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.alias.is_none()
    }
}

fn ast_kind_str(kind: AstKind) -> &'static str {
    match kind {
        AstKind::Select => "select",
        AstKind::Insert => "insert",
        AstKind::Update => "update",
        AstKind::Delete => "delete",
    }
}

fn ast_kind_from_str(s: &str) -> Result<AstKind> {
    Ok(match s {
        "select" => AstKind::Select,
        "insert" => AstKind::Insert,
        "update" => AstKind::Update,
        "delete" => AstKind::Delete,
        other => return Err(CoreError::Serialization(format!("unknown statement kind {other:?}"))),
    })
}

fn join_type_str(t: JoinType) -> &'static str {
    match t {
        JoinType::Inner => "INNER",
        JoinType::Left => "LEFT",
        JoinType::Right => "RIGHT",
        JoinType::Full => "FULL",
    }
}

fn join_type_from_str(s: &str) -> Result<JoinType> {
    Ok(match s {
        "INNER" => JoinType::Inner,
        "LEFT" => JoinType::Left,
        "RIGHT" => JoinType::Right,
        "FULL" => JoinType::Full,
        other => return Err(CoreError::Serialization(format!("unknown join type {other:?}"))),
    })
}

fn set_op_kind_str(op: SetOpKind) -> &'static str {
    op.as_sql()
}

fn set_op_kind_from_str(s: &str) -> Result<SetOpKind> {
    Ok(match s {
        "UNION" => SetOpKind::Union,
        "UNION ALL" => SetOpKind::UnionAll,
        "INTERSECT" => SetOpKind::Intersect,
        "EXCEPT" => SetOpKind::Except,
        other => return Err(CoreError::Serialization(format!("unknown set operator {other:?}"))),
    })
}

impl From<&Ast> for AstWire {
    fn from(ast: &Ast) -> Self {
        Self {
            kind: ast_kind_str(ast.kind).to_string(),
            distinct: ast.distinct,
            from_table: (&ast.from_table).into(),
            joins: ast
                .joins
                .iter()
                .map(|j| JoinClauseWire {
                    join_type: join_type_str(j.join_type).to_string(),
                    table: (&j.table).into(),
                    condition: (&j.condition).into(),
                })
                .collect(),
            select_cols: ast
                .select_cols
                .iter()
                .map(|sc| SelectColumnWire {
                    expr: (&sc.expr).into(),
                    alias: sc.alias.clone(),
                })
                .collect(),
            where_clause: ast.where_clause.as_ref().map(Into::into),
            group_by: ast.group_by.iter().map(Into::into).collect(),
            having: ast.having.as_ref().map(Into::into),
            order_by: ast
                .order_by
                .iter()
                .map(|o| OrderByWire {
                    expr: (&o.expr).into(),
                    desc: o.desc,
                })
                .collect(),
            limit: ast.limit.as_ref().map(Into::into),
            offset: ast.offset.as_ref().map(Into::into),
            insert_cols: ast.insert_cols.iter().map(Into::into).collect(),
            insert_vals: ast.insert_vals.iter().map(Into::into).collect(),
            returning: ast.returning.iter().map(Into::into).collect(),
            set_clauses: ast
                .set_clauses
                .iter()
                .map(|sc| SetClauseWire {
                    column: (&sc.column).into(),
                    value: (&sc.value).into(),
                })
                .collect(),
            set_op: ast.set_op.as_ref().map(|so| {
                Box::new(SetOpWire {
                    left: Box::new((&so.left).into()),
                    op: set_op_kind_str(so.op).to_string(),
                    right: Box::new((&so.right).into()),
                })
            }),
            ctes: ast
                .ctes
                .iter()
                .map(|c| CteWire {
                    name: c.name.clone(),
                    columns: c.columns.clone(),
                    query: Box::new((&c.query).into()),
                })
                .collect(),
            params: ast
                .params
                .iter()
                .map(|p| ParamInfoWire {
                    name: p.name.clone(),
                    go_type: p.host_type.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<AstWire> for Ast {
    type Error = CoreError;

    fn try_from(w: AstWire) -> Result<Self> {
        Ok(Ast {
            kind: ast_kind_from_str(&w.kind)?,
            distinct: w.distinct,
            from_table: w.from_table.into(),
            joins: w
                .joins
                .into_iter()
                .map(|j| -> Result<JoinClause> {
                    Ok(JoinClause {
                        join_type: join_type_from_str(&j.join_type)?,
                        table: j.table.into(),
                        condition: j.condition.try_into()?,
                    })
                })
                .collect::<Result<_>>()?,
            select_cols: w
                .select_cols
                .into_iter()
                .map(|sc| -> Result<SelectColumn> {
                    Ok(SelectColumn {
                        expr: sc.expr.try_into()?,
                        alias: sc.alias,
                    })
                })
                .collect::<Result<_>>()?,
            where_clause: w.where_clause.map(TryInto::try_into).transpose()?,
            group_by: w.group_by.into_iter().map(Into::into).collect(),
            having: w.having.map(TryInto::try_into).transpose()?,
            order_by: w
                .order_by
                .into_iter()
                .map(|o| -> Result<OrderByItem> {
                    Ok(OrderByItem {
                        expr: o.expr.try_into()?,
                        desc: o.desc,
                    })
                })
                .collect::<Result<_>>()?,
            limit: w.limit.map(TryInto::try_into).transpose()?,
            offset: w.offset.map(TryInto::try_into).transpose()?,
            insert_cols: w.insert_cols.into_iter().map(Into::into).collect(),
            insert_vals: w.insert_vals.into_iter().map(TryInto::try_into).collect::<Result<_>>()?,
            returning: w.returning.into_iter().map(Into::into).collect(),
            set_clauses: w
                .set_clauses
                .into_iter()
                .map(|sc| -> Result<SetClause> {
                    Ok(SetClause {
                        column: sc.column.into(),
                        value: sc.value.try_into()?,
                    })
                })
                .collect::<Result<_>>()?,
            set_op: w
                .set_op
                .map(|so| -> Result<Box<SetOp>> {
                    Ok(Box::new(SetOp {
                        left: (*so.left).try_into()?,
                        op: set_op_kind_from_str(&so.op)?,
                        right: (*so.right).try_into()?,
                    }))
                })
                .transpose()?,
            ctes: w
                .ctes
                .into_iter()
                .map(|c| -> Result<Cte> {
                    Ok(Cte {
                        name: c.name,
                        columns: c.columns,
                        query: (*c.query).try_into()?,
                    })
                })
                .collect::<Result<_>>()?,
            params: w
                .params
                .into_iter()
                .map(|p| ParamInfo {
                    name: p.name,
                    host_type: p.go_type,
                })
                .collect(),
        })
    }
}

/// Serializes an `Ast` to its canonical two-space-indented JSON form, with a
/// trailing newline.
pub fn serialize_ast(ast: &Ast) -> Result<String> {
    let wire: AstWire = ast.into();
    let mut s = serde_json::to_string_pretty(&wire)
        .map_err(|e| CoreError::Serialization(e.to_string()))?;
    s.push('\n');
    Ok(s)
}

/// Deserializes an `Ast` from its canonical JSON form.
pub fn deserialize_ast(json: &str) -> Result<Ast> {
    let wire: AstWire =
        serde_json::from_str(json).map_err(|e| CoreError::Serialization(e.to_string()))?;
    wire.try_into()
}

/// Serializes a single `Expr` to JSON (used for structural round-trip
/// testing and by the registry's bulk dump).
pub fn serialize_expr(expr: &Expr) -> Result<String> {
    let wire: ExprWire = expr.into();
    serde_json::to_string(&wire).map_err(|e| CoreError::Serialization(e.to_string()))
}

/// Deserializes a single `Expr` from JSON.
pub fn deserialize_expr(json: &str) -> Result<Expr> {
    let wire: ExprWire =
        serde_json::from_str(json).map_err(|e| CoreError::Serialization(e.to_string()))?;
    wire.try_into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{col, from, insert_into};
    use crate::ir::{literal, param, TypeTag};

    #[test]
    fn round_trips_a_simple_select() {
        let ast = from("authors")
            .select([col("authors", "id").column(), col("authors", "name").column()])
            .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
            .build();

        let json = serialize_ast(&ast).unwrap();
        let back = deserialize_ast(&json).unwrap();

        assert_eq!(ast.kind, back.kind);
        assert_eq!(ast.distinct, back.distinct);
        assert_eq!(ast.from_table, back.from_table);
        assert_eq!(ast.select_cols.len(), back.select_cols.len());
        assert_eq!(ast.where_clause.is_some(), back.where_clause.is_some());
    }

    #[test]
    fn expression_round_trip_is_byte_identical() {
        let expr = col("authors", "id").eq(param("id", TypeTag::Int64));
        let json1 = serialize_expr(&expr).unwrap();
        let back = deserialize_expr(&json1).unwrap();
        let json2 = serialize_expr(&back).unwrap();
        assert_eq!(json1, json2);
    }

    #[test]
    fn omits_default_valued_fields() {
        let ast = from("authors").select([col("authors", "id").column()]).build();
        let json = serialize_ast(&ast).unwrap();
        assert!(!json.contains("\"distinct\""));
        assert!(!json.contains("\"joins\""));
        assert!(!json.contains("\"where_clause\""));
    }

    #[test]
    fn pretty_output_has_two_space_indent_and_trailing_newline() {
        let ast = insert_into("authors")
            .columns([col("authors", "name").column()])
            .values([literal("x")])
            .build();
        let json = serialize_ast(&ast).unwrap();
        assert!(json.ends_with('\n'));
        assert!(json.contains("\n  \""));
    }

    #[test]
    fn unknown_expr_tag_is_a_serialization_error() {
        let bad = r#"{"type":"not_a_real_variant"}"#;
        assert!(matches!(deserialize_expr(bad), Err(CoreError::Serialization(_))));
    }
}
