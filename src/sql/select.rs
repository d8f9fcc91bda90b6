//! SELECT statement generation.
//!
//! Lowers a validated, normalized query to PostgreSQL text: alias
//! generation, the select list, and the clause-by-clause assembly. Clauses
//! are newline-separated.

use tracing::debug;

use crate::entity::EntityRef;
use crate::query::ast::{Expr, Query, QueryExpr, SortDir};

use super::expr::{entity_fields, expr_tokens, Scope};
use super::token::{Token, TokenStream};

/// Generate a `SELECT` statement.
///
/// # Panics
///
/// The query must be validated and normalized; in particular it must carry a
/// select expression.
pub fn select(query: &Query) -> String {
    let aliases = aliases(&query.froms);

    let select_clause = query
        .select
        .as_ref()
        .unwrap_or_else(|| panic!("cannot lower a query without a select expression"));

    let mut ts = TokenStream::new();

    // SELECT
    ts.push(Token::Select).space();
    let scope = clause_scope(select_clause, &aliases, &query.froms);
    ts.append(&select_list(&select_clause.expr.body, &scope));

    // FROM
    ts.newline().push(Token::From).space();
    for (index, (entity, alias)) in query.froms.iter().zip(aliases.iter()).enumerate() {
        if index > 0 {
            ts.comma().space();
        }
        ts.ident(entity.dataset())
            .space()
            .push(Token::As)
            .space()
            .ident(alias);
    }

    // WHERE
    if let Some(wheres) = where_tokens(&query.wheres, &aliases, &query.froms) {
        ts.newline().append(&wheres);
    }

    // ORDER BY
    if !query.order_bys.is_empty() {
        ts.newline().push(Token::OrderBy).space();
        let mut first = true;
        for clause in &query.order_bys {
            let scope = clause_scope(clause, &aliases, &query.froms);
            for item in &clause.expr {
                if !first {
                    ts.comma().space();
                }
                first = false;
                let (alias, _) = scope.lookup(&item.var);
                ts.ident(alias).push(Token::Dot).ident(&item.field);
                match item.dir {
                    Some(SortDir::Asc) => {
                        ts.space().push(Token::Asc);
                    }
                    Some(SortDir::Desc) => {
                        ts.space().push(Token::Desc);
                    }
                    None => {}
                }
            }
        }
    }

    // LIMIT / OFFSET
    if let Some(clause) = &query.limit {
        let scope = clause_scope(clause, &aliases, &query.froms);
        ts.newline().push(Token::Limit).space();
        ts.append(&expr_tokens(&clause.expr, &scope));
    }
    if let Some(clause) = &query.offset {
        let scope = clause_scope(clause, &aliases, &query.froms);
        ts.newline().push(Token::Offset).space();
        ts.append(&expr_tokens(&clause.expr, &scope));
    }

    let sql = ts.serialize();
    debug!(froms = query.froms.len(), "generated select statement");
    sql
}

/// Generate unique table aliases for the from list.
///
/// Each alias is the first character of the entity's table name plus the
/// smallest non-negative integer that keeps it unique; determinism depends
/// only on input order.
pub(crate) fn aliases(froms: &[EntityRef]) -> Vec<String> {
    froms.iter().fold(Vec::new(), |mut taken, entity| {
        let head = entity.dataset().chars().next().unwrap_or('t');
        let mut counter = 0usize;
        let alias = loop {
            let candidate = format!("{}{}", head, counter);
            if !taken.contains(&candidate) {
                break candidate;
            }
            counter += 1;
        };
        taken.push(alias);
        taken
    })
}

/// `WHERE (e1) AND (e2) AND …`, or nothing when there are no wheres.
pub(crate) fn where_tokens(
    wheres: &[QueryExpr<Expr>],
    aliases: &[String],
    froms: &[EntityRef],
) -> Option<TokenStream> {
    if wheres.is_empty() {
        return None;
    }

    let mut ts = TokenStream::new();
    ts.push(Token::Where).space();
    for (index, clause) in wheres.iter().enumerate() {
        if index > 0 {
            ts.space().push(Token::And).space();
        }
        let scope = clause_scope(clause, aliases, froms);
        ts.lparen().append(&expr_tokens(&clause.expr, &scope)).rparen();
    }
    Some(ts)
}

pub(crate) fn clause_scope<T>(
    clause: &QueryExpr<T>,
    aliases: &[String],
    froms: &[EntityRef],
) -> Scope {
    Scope::new(&clause.binding, aliases, froms)
}

/// The select list: tuple and list bodies emit their elements comma-joined,
/// anything else is a single element; a bare variable expands to all of its
/// entity's fields.
fn select_list(body: &Expr, scope: &Scope) -> TokenStream {
    let mut ts = TokenStream::new();
    match body {
        Expr::Tuple(items) | Expr::List(items) => {
            let lowered: Vec<TokenStream> = items
                .iter()
                .map(|item| select_element(item, scope))
                .collect();
            ts.comma_separated(lowered.iter());
        }
        other => {
            ts.append(&select_element(other, scope));
        }
    }
    ts
}

fn select_element(expr: &Expr, scope: &Scope) -> TokenStream {
    match expr {
        Expr::Var(var) => {
            let (alias, entity) = scope.lookup(var);
            entity_fields(alias, entity)
        }
        other => expr_tokens(other, scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntitySchema, FieldType};

    #[derive(Debug)]
    struct Named(&'static str);

    impl EntitySchema for Named {
        fn dataset(&self) -> &str {
            self.0
        }

        fn field_names(&self) -> &[&str] {
            &["id"]
        }

        fn field_type(&self, field: &str) -> FieldType {
            match field {
                "id" => FieldType::Integer,
                _ => FieldType::Unknown,
            }
        }

        fn primary_key(&self) -> Option<&str> {
            Some("id")
        }
    }

    static POSTS: Named = Named("posts");
    static COMMENTS: Named = Named("comments");

    #[test]
    fn test_alias_generation() {
        let froms = vec![
            EntityRef::new(&POSTS),
            EntityRef::new(&COMMENTS),
            EntityRef::new(&POSTS),
        ];
        assert_eq!(aliases(&froms), vec!["p0", "c0", "p1"]);
    }

    #[test]
    fn test_aliases_are_pairwise_distinct() {
        let froms = vec![EntityRef::new(&POSTS); 8];
        let aliases = aliases(&froms);
        for (i, a) in aliases.iter().enumerate() {
            for b in &aliases[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_empty_froms_have_no_aliases() {
        assert!(aliases(&[]).is_empty());
    }
}
