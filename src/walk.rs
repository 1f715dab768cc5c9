//! Tree walker and analyzer (C8).
//!
//! `walk` is the public single-expression visitor described in
//! the visitor hook. `collect_params`, `collect_param_order`, and
//! `has_subqueries` are whole-AST analyses built on top of an internal
//! helper, [`walk_ast`], that additionally knows how to reach every
//! expression-bearing field of an [`Ast`] (including nested CTE bodies,
//! subqueries, and set-operation branches) in the same order the compiler
//! emits them in, branching on statement kind the same way the compiler
//! does, so `collect_param_order` agrees with `compile`'s own `paramOrder`
//! for every statement shape, not just `SELECT`.

use std::collections::HashSet;

use crate::ir::ast::{Ast, AstKind};
use crate::ir::column::ParamInfo;
use crate::ir::expr::Expr;

/// Visits `expr`, then (if `visit` returns `true`) its children in canonical
/// left-to-right order. Returning `false` stops the walk at that node
/// without descending into its children.
pub fn walk(expr: &Expr, visit: &mut dyn FnMut(&Expr) -> bool) {
    if !visit(expr) {
        return;
    }
    match expr {
        Expr::Column(_) | Expr::Param { .. } | Expr::Literal(_) | Expr::JsonAgg { .. } => {}
        Expr::Binary { left, right, .. } => {
            walk(left, visit);
            walk(right, visit);
        }
        Expr::Unary { expr, .. } => walk(expr, visit),
        Expr::Func { args, .. } => {
            for a in args {
                walk(a, visit);
            }
        }
        Expr::List(items) => {
            for item in items {
                walk(item, visit);
            }
        }
        Expr::Aggregate { arg, .. } => {
            if let Some(a) = arg {
                walk(a, visit);
            }
        }
        Expr::Subquery(ast) => walk_ast(ast, visit),
        Expr::Exists { query, .. } => walk_ast(query, visit),
    }
}

/// Visits every expression reachable from `ast`, in the order the compiler
/// emits them. CTE bodies come first regardless of statement kind; a
/// set-operation AST then walks its branches followed by its trailing
/// clauses (ORDER BY, LIMIT, OFFSET), skipping the per-kind body entirely,
/// exactly as the compiler's own `emit_ast` dispatch does. Otherwise the
/// walk is kind-specific, since each statement kind emits a different subset
/// of `Ast`'s fields in a different order:
/// - `Select`: select list, joins, WHERE, HAVING, then the trailing clauses.
/// - `Insert`: VALUES only (no WHERE or trailing clauses are ever emitted).
/// - `Update`: SET clause values, then WHERE.
/// - `Delete`: WHERE only.
fn walk_ast(ast: &Ast, visit: &mut dyn FnMut(&Expr) -> bool) {
    for cte in &ast.ctes {
        walk_ast(&cte.query, visit);
    }
    if let Some(so) = &ast.set_op {
        walk_ast(&so.left, visit);
        walk_ast(&so.right, visit);
        walk_trailing_clauses(ast, visit);
        return;
    }
    match ast.kind {
        AstKind::Select => {
            for sc in &ast.select_cols {
                walk(&sc.expr, visit);
            }
            for join in &ast.joins {
                walk(&join.condition, visit);
            }
            if let Some(w) = &ast.where_clause {
                walk(w, visit);
            }
            if let Some(h) = &ast.having {
                walk(h, visit);
            }
            walk_trailing_clauses(ast, visit);
        }
        AstKind::Insert => {
            for v in &ast.insert_vals {
                walk(v, visit);
            }
        }
        AstKind::Update => {
            for sc in &ast.set_clauses {
                walk(&sc.value, visit);
            }
            if let Some(w) = &ast.where_clause {
                walk(w, visit);
            }
        }
        AstKind::Delete => {
            if let Some(w) = &ast.where_clause {
                walk(w, visit);
            }
        }
    }
}

/// ORDER BY, LIMIT, OFFSET, in that order — the suffix `emit_trailing_clauses`
/// appends after a set-operation or a `Select` body.
fn walk_trailing_clauses(ast: &Ast, visit: &mut dyn FnMut(&Expr) -> bool) {
    for item in &ast.order_by {
        walk(&item.expr, visit);
    }
    if let Some(l) = &ast.limit {
        walk(l, visit);
    }
    if let Some(o) = &ast.offset {
        walk(o, visit);
    }
}

/// The deduplicated set of parameters referenced anywhere in `ast`, each
/// appearing once, ordered by first appearance.
#[must_use]
pub fn collect_params(ast: &Ast) -> Vec<ParamInfo> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    walk_ast(ast, &mut |e| {
        if let Expr::Param { name, host_type } = e {
            if seen.insert(name.clone()) {
                out.push(ParamInfo::new(name.clone(), *host_type));
            }
        }
        true
    });
    out
}

/// The full, ordered list of parameter names referenced in `ast`, including
/// duplicates, in appearance order. Matches [`crate::compile::compile`]'s
/// `paramOrder`.
#[must_use]
pub fn collect_param_order(ast: &Ast) -> Vec<String> {
    let mut out = Vec::new();
    walk_ast(ast, &mut |e| {
        if let Expr::Param { name, .. } = e {
            out.push(name.clone());
        }
        true
    });
    out
}

/// `true` iff a `Subquery`, `Exists`, or CTE appears anywhere in `ast`.
#[must_use]
pub fn has_subqueries(ast: &Ast) -> bool {
    if !ast.ctes.is_empty() {
        return true;
    }
    if let Some(so) = &ast.set_op {
        if has_subqueries(&so.left) || has_subqueries(&so.right) {
            return true;
        }
    }
    let mut found = false;
    walk_ast(ast, &mut |e| {
        if matches!(e, Expr::Subquery(_) | Expr::Exists { .. }) {
            found = true;
        }
        true
    });
    found
}
