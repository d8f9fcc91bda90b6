//! Validator entry points.
//!
//! Orchestrates the structural invariants, binding resolution, and the type
//! checker for the three flows: select, batch update, and batch delete.
//! Clause-scoped failures are annotated with the clause kind and the source
//! coordinates of the enclosing expression.

use tracing::debug;

use crate::entity::EntityRef;
use crate::error::{ClauseKind, InvalidQuery, QueryResult};
use crate::query::ast::{Expr, Query, QueryExpr};
use crate::query::builder::check_binding;
use crate::query::typing::{collapse, infer, ExprType, TypeEnv};

/// Options for [`validate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOpts {
    /// Skip select presence and select type checks (update/delete flows).
    pub skip_select: bool,
}

/// Validate a query for the select flow.
pub fn validate(query: &Query, opts: ValidateOpts) -> QueryResult<()> {
    debug!(froms = query.froms.len(), "validating query");

    if query.froms.is_empty() {
        return Err(InvalidQuery::new("a query must have a from expression"));
    }

    if !opts.skip_select && query.select.is_none() && query.froms.len() > 1 {
        return Err(InvalidQuery::new(
            "a query must have a select expression if querying from more than one entity",
        ));
    }

    for clause in &query.wheres {
        in_clause(ClauseKind::Where, clause, || {
            let env = clause_env(clause, query)?;
            let where_type = infer(&clause.expr, &env)?;
            if where_type != ExprType::Boolean {
                return Err(InvalidQuery::new(format!(
                    "where expression must be of type boolean, got {}",
                    where_type
                )));
            }
            Ok(())
        })?;
    }

    for clause in &query.order_bys {
        in_clause(ClauseKind::OrderBy, clause, || {
            let env = clause_env(clause, query)?;
            for item in &clause.expr {
                let entity = env.lookup(&item.var)?;
                if !entity.has_field(&item.field) {
                    return Err(InvalidQuery::new(format!(
                        "unknown field `{}.{}`",
                        item.var, item.field
                    )));
                }
            }
            Ok(())
        })?;
    }

    if let Some(clause) = &query.limit {
        check_integer_clause(ClauseKind::Limit, clause, query)?;
    }
    if let Some(clause) = &query.offset {
        check_integer_clause(ClauseKind::Offset, clause, query)?;
    }

    if !opts.skip_select {
        if let Some(clause) = &query.select {
            in_clause(ClauseKind::Select, clause, || {
                let env = clause_env(clause, query)?;
                // Every subexpression must type; the top-level type is free.
                infer(&clause.expr.body, &env).map(|_| ())
            })?;
        }
    }

    Ok(())
}

/// Validate a batch update: restricted shape, binding, and SET pairs.
pub fn validate_update(
    query: &Query,
    binding: &[String],
    values: &[(String, Expr)],
) -> QueryResult<()> {
    debug!(values = values.len(), "validating update_all query");
    let entity = restricted_shape(query, "update_all")?;

    check_binding(binding, query.froms.len())?;
    let env = TypeEnv::new(binding, &query.froms);

    for (field, expr) in values {
        let expected = collapse(entity.field_type(field)).ok_or_else(|| {
            InvalidQuery::new(format!(
                "unknown field `{}` on {}",
                field,
                entity.dataset()
            ))
        })?;
        let actual = infer(expr, &env)?;
        if actual != expected {
            return Err(InvalidQuery::new(format!(
                "value of field `{}` must be of type {}, got {}",
                field, expected, actual
            )));
        }
    }

    validate(query, ValidateOpts { skip_select: true })
}

/// Validate a batch delete: restricted shape only.
pub fn validate_delete(query: &Query) -> QueryResult<()> {
    debug!("validating delete_all query");
    restricted_shape(query, "delete_all")?;
    validate(query, ValidateOpts { skip_select: true })
}

/// Require the `from + optional wheres` shape and exactly one source.
fn restricted_shape(query: &Query, operation: &str) -> QueryResult<EntityRef> {
    if query.select.is_some()
        || query.limit.is_some()
        || query.offset.is_some()
        || !query.order_bys.is_empty()
    {
        return Err(InvalidQuery::new(format!(
            "only `from` and `where` clauses are allowed in {} queries",
            operation
        )));
    }
    match query.froms.as_slice() {
        [entity] => Ok(*entity),
        _ => Err(InvalidQuery::new(format!(
            "{} queries must have exactly one from expression",
            operation
        ))),
    }
}

fn check_integer_clause(
    kind: ClauseKind,
    clause: &QueryExpr<Expr>,
    query: &Query,
) -> QueryResult<()> {
    in_clause(kind, clause, || {
        let env = clause_env(clause, query)?;
        let clause_type = infer(&clause.expr, &env)?;
        if clause_type != ExprType::Number {
            return Err(InvalidQuery::new(format!(
                "{} expression must be of type number, got {}",
                kind, clause_type
            )));
        }
        Ok(())
    })
}

/// Re-check the binding invariant and build the clause environment.
fn clause_env<T>(clause: &QueryExpr<T>, query: &Query) -> QueryResult<TypeEnv> {
    check_binding(&clause.binding, query.froms.len())?;
    Ok(TypeEnv::new(&clause.binding, &query.froms))
}

/// Wrap-on-error combinator: run a clause check, annotating any failure with
/// the clause kind and the clause's source coordinates.
fn in_clause<T, R>(
    kind: ClauseKind,
    clause: &QueryExpr<T>,
    check: impl FnOnce() -> QueryResult<R>,
) -> QueryResult<R> {
    check().map_err(|err| err.in_clause(kind, &clause.file, clause.line))
}
