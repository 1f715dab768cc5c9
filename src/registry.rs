//! Process-wide registry of named queries (C7).
//!
//! A [`Registry`] is a name → `(Ast, ReturnKind)` map. The crate exposes both
//! a first-class value (construct one locally, e.g. per test) and a
//! process-wide global behind [`define`]/[`try_define`]/[`get`]/[`get_all`]/
//! [`clear`]/[`serialize_all`], supporting
//! "define-at-startup" ergonomics while still allowing a caller to hold its
//! own instance for isolation. The global is guarded by a `Mutex` behind a
//! `OnceLock`, the same pattern the rest of this corpus uses for lazily
//! initialized process-wide state.

use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};

use crate::error::{CoreError, Result};
use crate::ir::ast::Ast;
use crate::serialize::serialize_ast;

/// The result-arity tag attached to a registered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// A single row.
    One,
    /// Zero or more rows.
    Many,
    /// No rows; only an affected-row count.
    Exec,
}

impl ReturnKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Many => "many",
            Self::Exec => "exec",
        }
    }
}

/// A registered query: its AST plus the return-arity tag the caller declared
/// for it. The registry itself does not check `kind` against the AST's
/// shape — that is left to the caller.
#[derive(Debug, Clone)]
pub struct RegisteredQuery {
    pub name: String,
    pub return_kind: ReturnKind,
    pub ast: Ast,
}

/// A name → query map. `Define`/`TryDefine`/`Clear`/`GetAll` are
/// linearizable with respect to each other; within a single
/// `Registry` value this falls out of `&mut self` access, and the
/// process-wide global wraps one in a `Mutex`.
#[derive(Debug, Default)]
pub struct Registry {
    queries: BTreeMap<String, RegisteredQuery>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ast` under `name`. Fails if `name` is already taken.
    pub fn define(&mut self, name: &str, ast: Ast, kind: ReturnKind) -> Result<()> {
        if self.queries.contains_key(name) {
            return Err(CoreError::Registry(format!("query {name:?} is already defined")));
        }
        tracing::debug!(query = name, return_kind = kind.as_str(), "registry: defining query");
        self.queries.insert(
            name.to_string(),
            RegisteredQuery {
                name: name.to_string(),
                return_kind: kind,
                ast,
            },
        );
        Ok(())
    }

    /// Registers `ast` under `name`, returning `false` instead of an error if
    /// `name` is already taken.
    pub fn try_define(&mut self, name: &str, ast: Ast, kind: ReturnKind) -> bool {
        self.define(name, ast, kind).is_ok()
    }

    /// Looks up a registered query by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredQuery> {
        self.queries.get(name)
    }

    /// All registered queries, in name order (the map is a `BTreeMap`, so
    /// iteration order is already the sort order `SerializeAll` requires).
    #[must_use]
    pub fn get_all(&self) -> Vec<&RegisteredQuery> {
        self.queries.values().collect()
    }

    /// Removes every registered query. Intended for test isolation.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.queries.len(), "registry: clearing all queries");
        self.queries.clear();
    }

    /// Emits the name-sorted JSON array the wire format calls for: two-space
    /// indentation, trailing newline, one `{ name, return_type, ast }` object
    /// per registered query.
    pub fn serialize_all(&self) -> Result<String> {
        let mut entries = Vec::with_capacity(self.queries.len());
        for q in self.queries.values() {
            let ast_json: serde_json::Value = serde_json::from_str(&serialize_ast(&q.ast)?)
                .map_err(|e| CoreError::Serialization(e.to_string()))?;
            entries.push(serde_json::json!({
                "name": q.name,
                "return_type": q.return_kind.as_str(),
                "ast": ast_json,
            }));
        }
        let mut out = serde_json::to_string_pretty(&serde_json::Value::Array(entries))
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

fn global() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry::new()))
}

/// Registers `ast` in the process-wide registry. Fails if `name` is taken.
pub fn define(name: &str, ast: Ast, kind: ReturnKind) -> Result<()> {
    global()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .define(name, ast, kind)
}

/// Registers `ast` in the process-wide registry, returning `false` on a
/// duplicate name instead of failing.
pub fn try_define(name: &str, ast: Ast, kind: ReturnKind) -> bool {
    global()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .try_define(name, ast, kind)
}

/// Registers `ast` in the process-wide registry, aborting the process on a
/// duplicate name. Only safe to call during initialization, before any
/// concurrent compilation or serialization might be underway.
pub fn must_define(name: &str, ast: Ast, kind: ReturnKind) {
    if let Err(e) = define(name, ast, kind) {
        panic!("must_define({name:?}): {e}");
    }
}

/// Looks up a query by name in the process-wide registry.
#[must_use]
pub fn get(name: &str) -> Option<RegisteredQuery> {
    global()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// All queries in the process-wide registry, in name order.
#[must_use]
pub fn get_all() -> Vec<RegisteredQuery> {
    global()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get_all()
        .into_iter()
        .cloned()
        .collect()
}

/// Removes every query from the process-wide registry. Intended for test
/// isolation between test functions that each define their own queries.
pub fn clear() {
    global()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clear();
}

/// Serializes the process-wide registry's contents (see
/// [`Registry::serialize_all`]).
pub fn serialize_all() -> Result<String> {
    global()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .serialize_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{col, from};

    fn sample_ast(table: &str) -> Ast {
        from(table).select([col(table, "id").column()]).build()
    }

    #[test]
    fn local_registry_rejects_duplicate_names() {
        let mut r = Registry::new();
        r.define("get_thing", sample_ast("things"), ReturnKind::One).unwrap();
        let err = r.define("get_thing", sample_ast("things"), ReturnKind::One).unwrap_err();
        assert!(matches!(err, CoreError::Registry(_)));
    }

    #[test]
    fn try_define_returns_false_on_duplicate_without_erroring() {
        let mut r = Registry::new();
        assert!(r.try_define("q", sample_ast("things"), ReturnKind::Many));
        assert!(!r.try_define("q", sample_ast("things"), ReturnKind::Many));
    }

    #[test]
    fn get_all_is_sorted_by_name() {
        let mut r = Registry::new();
        r.define("zeta", sample_ast("z"), ReturnKind::One).unwrap();
        r.define("alpha", sample_ast("a"), ReturnKind::One).unwrap();
        let names: Vec<_> = r.get_all().iter().map(|q| q.name.clone()).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn serialize_all_is_byte_identical_across_two_calls() {
        let mut r = Registry::new();
        r.define("get_thing", sample_ast("things"), ReturnKind::One).unwrap();
        let a = r.serialize_all().unwrap();
        let b = r.serialize_all().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serialize_all_sorts_by_name_and_includes_return_type() {
        let mut r = Registry::new();
        r.define("zeta", sample_ast("z"), ReturnKind::Exec).unwrap();
        r.define("alpha", sample_ast("a"), ReturnKind::Many).unwrap();
        let json = r.serialize_all().unwrap();
        let alpha_pos = json.find("\"alpha\"").unwrap();
        let zeta_pos = json.find("\"zeta\"").unwrap();
        assert!(alpha_pos < zeta_pos);
        assert!(json.contains("\"return_type\": \"many\""));
        assert!(json.contains("\"return_type\": \"exec\""));
    }

    #[test]
    fn global_registry_define_and_clear_round_trip() {
        clear();
        define("global_query", sample_ast("things"), ReturnKind::One).unwrap();
        assert!(get("global_query").is_some());
        assert_eq!(get_all().len(), 1);
        clear();
        assert!(get_all().is_empty());
    }
}
