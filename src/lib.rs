//! # queryforge
//!
//! A multi-dialect SQL query compiler and serialization core. Applications
//! construct typed, structured query descriptions with a fluent [`builder`],
//! validate them, serialize them to/from a stable JSON form, and compile
//! them to parameterized SQL for PostgreSQL, MySQL, and SQLite.
//!
//! The pieces, leaves first:
//! - [`ir`] — column/type primitives and the expression/AST node types (C1, C2).
//! - [`builder`] — the fluent constructors used to assemble an [`ir::Ast`] (C3).
//! - [`validate`] — structural checks over an `Ast` before compilation (C4).
//! - [`serialize`] — canonical JSON round-trip of an `Ast` (C5).
//! - [`compile`] — the three dialect backends (C6).
//! - [`registry`] — a process-wide name → query map (C7).
//! - [`walk`] — a tree walker and parameter/subquery analyses (C8).
//!
//! ```rust
//! use queryforge::builder::{col, from};
//! use queryforge::compile::{compile, PostgresDialect};
//! use queryforge::ir::{param, TypeTag};
//!
//! let ast = from("authors")
//!     .select([col("authors", "id").column(), col("authors", "name").column()])
//!     .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
//!     .build();
//!
//! let (sql, param_order) = compile(&ast, &PostgresDialect).unwrap();
//! assert_eq!(sql, "SELECT \"authors\".\"id\", \"authors\".\"name\" FROM \"authors\" WHERE (\"authors\".\"id\" = $1)");
//! assert_eq!(param_order, vec!["id".to_string()]);
//! ```
//!
//! This crate does not execute SQL, model transactions, or check expressions
//! against a catalog; it validates IR shape and identifier syntax only (see
//! the crate-level design notes for the full non-goal list).

pub mod builder;
pub mod compile;
pub mod error;
pub mod ir;
pub mod registry;
pub mod serialize;
pub mod validate;
pub mod walk;

pub use error::{CoreError, Result};
