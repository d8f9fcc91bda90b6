//! Clause merging.
//!
//! The builder front-end hands fully-constructed clause expressions to
//! [`Query::merge`], which appends or assigns them while enforcing the
//! single-select/limit/offset and binding-arity rules. Each merge returns a
//! new query; the base is never mutated.

use crate::entity::EntityRef;
use crate::error::{InvalidQuery, QueryResult};
use crate::query::ast::{Expr, OrderBy, Query, QueryExpr, Select};

/// A clause to merge into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    From(EntityRef),
    Where(QueryExpr<Expr>),
    Select(QueryExpr<Select>),
    OrderBy(QueryExpr<Vec<OrderBy>>),
    Limit(QueryExpr<Expr>),
    Offset(QueryExpr<Expr>),
}

/// Anything convertible to a query: a query itself, or an entity reference
/// treated as `from(entity)`.
pub trait Queryable {
    fn to_query(self) -> Query;
}

impl Queryable for Query {
    fn to_query(self) -> Query {
        self
    }
}

impl Queryable for EntityRef {
    fn to_query(self) -> Query {
        Query::from(self)
    }
}

impl Query {
    /// Merge a clause, returning the extended query.
    pub fn merge(mut self, clause: QueryClause) -> QueryResult<Query> {
        if let QueryClause::From(entity) = clause {
            self.froms.push(entity);
            return Ok(self);
        }

        check_binding(clause_binding(&clause), self.froms.len())?;

        match clause {
            QueryClause::From(_) => unreachable!(),
            QueryClause::Where(clause) => self.wheres.push(clause),
            QueryClause::OrderBy(clause) => self.order_bys.push(clause),
            QueryClause::Select(clause) => {
                if self.select.is_some() {
                    return Err(only_one("select"));
                }
                self.select = Some(clause);
            }
            QueryClause::Limit(clause) => {
                if self.limit.is_some() {
                    return Err(only_one("limit"));
                }
                self.limit = Some(clause);
            }
            QueryClause::Offset(clause) => {
                if self.offset.is_some() {
                    return Err(only_one("offset"));
                }
                self.offset = Some(clause);
            }
        }

        Ok(self)
    }

    /// Append another entity source.
    pub fn and_from(mut self, entity: impl Into<EntityRef>) -> Query {
        self.froms.push(entity.into());
        self
    }

    /// Append a where clause.
    pub fn filter(self, clause: QueryExpr<Expr>) -> QueryResult<Query> {
        self.merge(QueryClause::Where(clause))
    }

    /// Set the select clause.
    pub fn select(self, clause: QueryExpr<Select>) -> QueryResult<Query> {
        self.merge(QueryClause::Select(clause))
    }

    /// Append an order_by clause.
    pub fn order_by(self, clause: QueryExpr<Vec<OrderBy>>) -> QueryResult<Query> {
        self.merge(QueryClause::OrderBy(clause))
    }

    /// Set the limit clause.
    pub fn limit(self, clause: QueryExpr<Expr>) -> QueryResult<Query> {
        self.merge(QueryClause::Limit(clause))
    }

    /// Set the offset clause.
    pub fn offset(self, clause: QueryExpr<Expr>) -> QueryResult<Query> {
        self.merge(QueryClause::Offset(clause))
    }
}

fn clause_binding(clause: &QueryClause) -> &[String] {
    match clause {
        QueryClause::From(_) => &[],
        QueryClause::Where(clause) => &clause.binding,
        QueryClause::Select(clause) => &clause.binding,
        QueryClause::OrderBy(clause) => &clause.binding,
        QueryClause::Limit(clause) => &clause.binding,
        QueryClause::Offset(clause) => &clause.binding,
    }
}

fn only_one(kind: &str) -> InvalidQuery {
    InvalidQuery::new(format!("only one {} expression is allowed", kind))
}

/// Verify a binding list: valid variable names, no non-wildcard name bound
/// twice, and no more variables than there are from expressions.
pub(crate) fn check_binding(binding: &[String], froms: usize) -> QueryResult<()> {
    if binding.len() > froms {
        return Err(InvalidQuery::new(
            "cannot bind more variables than there are from expressions",
        ));
    }

    for (index, name) in binding.iter().enumerate() {
        if !is_variable(name) {
            return Err(InvalidQuery::new(
                "binding list should contain only variables",
            ));
        }
        if name != "_" && binding[..index].contains(name) {
            return Err(InvalidQuery::new(format!(
                "variable `{}` is bound more than once",
                name
            )));
        }
    }

    Ok(())
}

fn is_variable(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
