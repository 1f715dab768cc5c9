//! Cross-dialect param-order and placeholder-count properties.

use queryforge::builder::{col, delete_from, from, insert_into, update};
use queryforge::compile::{compile, MySqlDialect, PostgresDialect, SqliteDialect};
use queryforge::ir::{literal, param, TypeTag};
use queryforge::walk::collect_param_order;

fn assert_same_param_order_across_dialects(ast: &queryforge::ir::Ast) {
    let (_, pg) = compile(ast, &PostgresDialect).unwrap();
    let (_, my) = compile(ast, &MySqlDialect).unwrap();
    let (_, lite) = compile(ast, &SqliteDialect).unwrap();
    assert_eq!(pg, my, "postgres/mysql param order diverged");
    assert_eq!(my, lite, "mysql/sqlite param order diverged");
    assert_eq!(pg, collect_param_order(ast), "compile() disagrees with collect_param_order()");
}

#[test]
fn select_with_subquery_and_exists_keeps_order() {
    let inner = from("books")
        .select([col("books", "id").column()])
        .where_clause(col("books", "author_id").eq(param("author_id", TypeTag::Int64)))
        .build();

    let ast = from("authors")
        .select([col("authors", "id").column()])
        .where_clause(
            col("authors", "active")
                .eq(literal(true))
                .and(queryforge::ir::Expr::Exists {
                    query: Box::new(inner),
                    negated: false,
                }),
        )
        .limit(param("limit", TypeTag::Int64))
        .offset(param("offset", TypeTag::Int64))
        .build();

    assert_same_param_order_across_dialects(&ast);
    let (_, params) = compile(&ast, &PostgresDialect).unwrap();
    assert_eq!(
        params,
        vec!["author_id".to_string(), "limit".to_string(), "offset".to_string()]
    );
}

#[test]
fn insert_update_delete_preserve_param_order() {
    let insert_ast = insert_into("authors")
        .columns([col("authors", "name").column()])
        .values([param("name", TypeTag::String)])
        .build();
    assert_same_param_order_across_dialects(&insert_ast);

    let update_ast = update("authors")
        .set(col("authors", "name").column(), param("new_name", TypeTag::String))
        .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
        .build();
    assert_same_param_order_across_dialects(&update_ast);

    let delete_ast = delete_from("authors")
        .where_clause(col("authors", "id").eq(param("id", TypeTag::Int64)))
        .build();
    assert_same_param_order_across_dialects(&delete_ast);
}

#[test]
fn duplicate_param_name_appears_twice_and_is_not_deduplicated() {
    let ast = from("authors")
        .select([col("authors", "id").column()])
        .where_clause(
            col("authors", "id")
                .eq(param("id", TypeTag::Int64))
                .or(col("authors", "parent_id").eq(param("id", TypeTag::Int64))),
        )
        .build();

    let (sql, params) = compile(&ast, &PostgresDialect).unwrap();
    assert_eq!(params, vec!["id".to_string(), "id".to_string()]);
    assert_eq!(sql.matches('$').count(), 2);
    assert!(sql.contains("$1"));
    assert!(sql.contains("$2"));
}

#[test]
fn placeholder_occurrence_count_matches_param_order_length() {
    let ast = from("authors")
        .select([col("authors", "id").column()])
        .where_clause(
            col("authors", "a").eq(param("a", TypeTag::Int64)).and(
                col("authors", "b")
                    .eq(param("b", TypeTag::Int64))
                    .and(col("authors", "c").eq(param("c", TypeTag::Int64))),
            ),
        )
        .build();

    let (sql, params) = compile(&ast, &MySqlDialect).unwrap();
    assert_eq!(sql.matches('?').count(), params.len());

    let (sql, params) = compile(&ast, &PostgresDialect).unwrap();
    assert_eq!(sql.matches('$').count(), params.len());
}
