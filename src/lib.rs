//! # entiq
//!
//! The query core of a relational data mapper: a typed query IR with a
//! validator, a normalizer, and a PostgreSQL generator.
//!
//! A builder front-end constructs [`Query`] values over *entities* (schema-
//! bound record types implementing [`EntitySchema`]); this crate merges
//! clauses under the structural rules, type checks and normalizes the
//! result, and lowers it to SQL text for the database transport.
//!
//! ## Quick start
//!
//! ```rust
//! use entiq::prelude::*;
//!
//! #[derive(Debug)]
//! struct PostEntity;
//!
//! impl EntitySchema for PostEntity {
//!     fn dataset(&self) -> &str {
//!         "post_entity"
//!     }
//!
//!     fn field_names(&self) -> &[&str] {
//!         &["id", "title"]
//!     }
//!
//!     fn field_type(&self, field: &str) -> FieldType {
//!         match field {
//!             "id" => FieldType::Integer,
//!             "title" => FieldType::String,
//!             _ => FieldType::Unknown,
//!         }
//!     }
//!
//!     fn primary_key(&self) -> Option<&str> {
//!         Some("id")
//!     }
//! }
//!
//! fn main() -> Result<(), InvalidQuery> {
//!     let query = Query::from(EntityRef::new(&PostEntity))
//!         .filter(QueryExpr::new(field("p", "title").eq("x")).with_binding(["p"]))?;
//!
//!     let query = normalize(query);
//!     validate(&query, ValidateOpts::default())?;
//!
//!     assert_eq!(
//!         entiq::sql::select(&query),
//!         "SELECT p0.id, p0.title\nFROM post_entity AS p0\nWHERE (p0.title = 'x')"
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! builder front-end
//!        │
//!        ▼
//!   query::ast ──merge──▶ query::builder
//!        │
//!        ▼
//!   query::validate (typing) ──▶ query::normalize
//!        │
//!        ▼
//!   sql (select / dml) ──▶ SQL string ──▶ transport
//! ```
//!
//! The core is a pure, synchronous transformer: queries are immutable
//! values, every pass returns a new value, and nothing is shared or
//! stateful across calls. Literals are inlined into the emitted SQL (a
//! documented limitation of this design, not an injection-safe interface).

pub mod entity;
pub mod error;
pub mod query;
pub mod sql;

pub use entity::{EntityRef, EntitySchema, FieldType, Row};
pub use error::{ClauseKind, InvalidQuery, QueryResult};
pub use query::{
    normalize, validate, validate_delete, validate_update, Query, QueryClause, QueryExpr,
    Queryable, ValidateOpts,
};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::entity::{EntityRef, EntitySchema, FieldType, Row};
    pub use crate::error::{ClauseKind, InvalidQuery, QueryResult};
    pub use crate::query::{
        // Constructors
        atom,
        field,
        lit,
        lit_bool,
        lit_float,
        lit_int,
        lit_nil,
        lit_str,
        list,
        range,
        tuple,
        var,
        // Passes
        normalize,
        validate,
        validate_delete,
        validate_update,
        // Types
        BinaryOperator,
        Expr,
        ExprExt,
        Literal,
        OrderBy,
        Query,
        QueryClause,
        QueryExpr,
        Queryable,
        Select,
        SelectKind,
        SortDir,
        UnaryOperator,
        ValidateOpts,
    };
}
