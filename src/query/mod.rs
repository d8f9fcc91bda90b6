//! The query data model and its transformation passes.
//!
//! - [`ast`] - the immutable query value and expression tree
//! - [`builder`] - clause merging with the structural rules
//! - [`typing`] - binding resolution and type inference
//! - [`normalize`] - default-select synthesis
//! - [`validate`] - the validator entry points

pub mod ast;
pub mod builder;
pub mod normalize;
pub mod typing;
pub mod validate;

pub use ast::{
    atom, field, lit, lit_bool, lit_float, lit_int, lit_nil, lit_str, list, range, tuple, var,
    BinaryOperator, Expr, ExprExt, Literal, OrderBy, Query, QueryExpr, Select, SelectKind,
    SortDir, UnaryOperator,
};
pub use builder::{QueryClause, Queryable};
pub use normalize::normalize;
pub use typing::{infer, ExprType, TypeEnv};
pub use validate::{validate, validate_delete, validate_update, ValidateOpts};
