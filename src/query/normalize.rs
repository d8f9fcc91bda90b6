//! Query normalization.
//!
//! A query over a single source needs no explicit select: the whole bound
//! entity is the result row. The normalizer fills that default in so the
//! generator only ever sees queries with a select clause. Multi-source
//! queries are left untouched; the validator rejects them when the select is
//! missing.

use tracing::debug;

use crate::query::ast::{var, Query, QueryExpr, Select, SelectKind};

/// Fill in the default `select entity` for single-from queries.
///
/// Idempotent: a query that already has a select (or that has zero or
/// several froms) passes through unchanged.
pub fn normalize(mut query: Query) -> Query {
    if query.select.is_none() && query.froms.len() == 1 {
        debug!(dataset = query.froms[0].dataset(), "installing default select");
        query.select = Some(
            QueryExpr::new(Select::new(SelectKind::Entity, var("entity")))
                .with_binding(["entity"]),
        );
    }
    query
}
