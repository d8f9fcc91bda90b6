//! DML generation.
//!
//! Row-level `INSERT`/`UPDATE`/`DELETE` from entity values, and the batch
//! `UPDATE … SET` / `DELETE … WHERE` forms from validated queries.

use tracing::debug;

use crate::entity::Row;
use crate::query::ast::Expr;
use crate::query::builder::Queryable;

use super::expr::{expr_tokens, literal_token, Scope};
use super::select::{aliases, where_tokens};
use super::token::{Token, TokenStream};

/// Generate an `INSERT` for an entity value.
///
/// The primary-key column and its value are omitted and returned by the
/// database instead (`RETURNING pk`) when the schema declares one.
pub fn insert(row: &Row) -> String {
    let entity = row.entity();
    let pk = entity.primary_key().map(str::to_string);
    let is_pk = |field: &str| pk.as_deref() == Some(field);

    let mut ts = TokenStream::new();
    ts.push(Token::Insert)
        .space()
        .push(Token::Into)
        .space()
        .ident(entity.dataset())
        .space()
        .lparen();

    for (index, (field, _)) in row.fields().filter(|&(f, _)| !is_pk(f)).enumerate() {
        if index > 0 {
            ts.comma().space();
        }
        ts.ident(field);
    }

    ts.rparen().newline().push(Token::Values).space().lparen();
    for (index, (_, value)) in row.fields().filter(|&(f, _)| !is_pk(f)).enumerate() {
        if index > 0 {
            ts.comma().space();
        }
        ts.push(literal_token(value));
    }
    ts.rparen();

    if let Some(pk) = &pk {
        ts.newline().push(Token::Returning).space().ident(pk);
    }

    debug!(dataset = entity.dataset(), "generated insert statement");
    ts.serialize()
}

/// Generate an `UPDATE` keyed on the primary key.
///
/// # Panics
///
/// The schema must declare a primary key.
pub fn update(row: &Row) -> String {
    let entity = row.entity();
    let (pk, pk_value) = row
        .primary_key()
        .unwrap_or_else(|| panic!("cannot update {} without a primary key", entity.dataset()));

    let mut ts = TokenStream::new();
    ts.push(Token::Update)
        .space()
        .ident(entity.dataset())
        .newline()
        .push(Token::Set)
        .space();

    for (index, (field, value)) in row.fields().filter(|&(f, _)| f != pk).enumerate() {
        if index > 0 {
            ts.comma().space();
        }
        ts.ident(field)
            .space()
            .push(Token::Eq)
            .space()
            .push(literal_token(value));
    }

    ts.newline()
        .push(Token::Where)
        .space()
        .ident(pk)
        .space()
        .push(Token::Eq)
        .space()
        .push(literal_token(pk_value));

    debug!(dataset = entity.dataset(), "generated update statement");
    ts.serialize()
}

/// Generate a `DELETE` keyed on the primary key.
///
/// # Panics
///
/// The schema must declare a primary key.
pub fn delete(row: &Row) -> String {
    let entity = row.entity();
    let (pk, pk_value) = row
        .primary_key()
        .unwrap_or_else(|| panic!("cannot delete from {} without a primary key", entity.dataset()));

    let mut ts = TokenStream::new();
    ts.push(Token::Delete)
        .space()
        .push(Token::From)
        .space()
        .ident(entity.dataset())
        .newline()
        .push(Token::Where)
        .space()
        .ident(pk)
        .space()
        .push(Token::Eq)
        .space()
        .push(literal_token(pk_value));

    debug!(dataset = entity.dataset(), "generated delete statement");
    ts.serialize()
}

/// Generate a batch `UPDATE … SET` over a validated queryable.
///
/// Value expressions are lowered in the alias scope of `binding`, so they
/// may reference the updated entity (`views: p.views + 1`).
pub fn update_all(
    queryable: impl Queryable,
    binding: &[String],
    values: &[(String, Expr)],
) -> String {
    let query = queryable.to_query();
    let aliases = aliases(&query.froms);
    let entity = single_from(&query.froms);
    let scope = Scope::new(binding, &aliases, &query.froms);

    let mut ts = TokenStream::new();
    ts.push(Token::Update)
        .space()
        .ident(entity.dataset())
        .space()
        .push(Token::As)
        .space()
        .ident(&aliases[0])
        .newline()
        .push(Token::Set)
        .space();

    for (index, (field, value)) in values.iter().enumerate() {
        if index > 0 {
            ts.comma().space();
        }
        ts.ident(field)
            .space()
            .push(Token::Eq)
            .space()
            .append(&expr_tokens(value, &scope));
    }

    if let Some(wheres) = where_tokens(&query.wheres, &aliases, &query.froms) {
        ts.newline().append(&wheres);
    }

    debug!(dataset = entity.dataset(), "generated batch update statement");
    ts.serialize()
}

/// Generate a batch `DELETE` over a validated queryable.
pub fn delete_all(queryable: impl Queryable) -> String {
    let query = queryable.to_query();
    let aliases = aliases(&query.froms);
    let entity = single_from(&query.froms);

    let mut ts = TokenStream::new();
    ts.push(Token::Delete)
        .space()
        .push(Token::From)
        .space()
        .ident(entity.dataset())
        .space()
        .push(Token::As)
        .space()
        .ident(&aliases[0]);

    if let Some(wheres) = where_tokens(&query.wheres, &aliases, &query.froms) {
        ts.newline().append(&wheres);
    }

    debug!(dataset = entity.dataset(), "generated batch delete statement");
    ts.serialize()
}

fn single_from(froms: &[crate::entity::EntityRef]) -> crate::entity::EntityRef {
    match froms {
        [entity] => *entity,
        other => panic!(
            "batch statements require exactly one from expression, got {}",
            other.len()
        ),
    }
}
