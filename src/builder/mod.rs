//! Fluent Builder (C3).
//!
//! Public constructors for SELECT/INSERT/UPDATE/DELETE, JOINs, CTEs, and set
//! operations, plus column-level comparison/ordering helpers.
//!
//! ```rust
//! use queryforge::builder::{from, col};
//! use queryforge::ir::{param, TypeTag};
//!
//! let ast = from("authors")
//!     .select([col("authors", "id").column(), col("authors", "name").column()])
//!     .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
//!     .build();
//! ```

mod column;
mod delete;
mod insert;
mod select;
mod update;

pub use column::{col, ColumnHandle};
pub use delete::{delete_from, DeleteBuilder};
pub use insert::{insert_into, InsertBuilder};
pub use select::{cte_ref, from, with, CteBuilder, JoinBuilder, SelectBuilder};
pub use update::{update, UpdateBuilder};
