//! The query AST.
//!
//! A [`Query`] is an immutable value: merging a clause, type checking, and
//! normalizing all produce new queries. Every clause is a [`QueryExpr`]
//! carrying the expression payload, the positional binding list, and the
//! source coordinates used to enrich validation errors.

use crate::entity::EntityRef;

// =============================================================================
// Expression AST
// =============================================================================

/// A query expression.
///
/// Every variant must be handled by the type checker and the lowerer - the
/// compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Field access: `var.field`.
    Field { var: String, field: String },

    /// The whole entity bound to `var`.
    Var(String),

    /// Unary operation: `not e`, `+e`, `-e`.
    UnaryOp { op: UnaryOperator, arg: Box<Expr> },

    /// Binary operation: `left op right`.
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Closed interval over numbers: `first..last`.
    Range { first: Box<Expr>, last: Box<Expr> },

    /// List of expressions.
    List(Vec<Expr>),

    /// Tuple of expressions.
    Tuple(Vec<Expr>),

    /// Literal value.
    Literal(Literal),

    /// A bare atom. Representable so the type checker can reject it with a
    /// proper error instead of the front-end crashing.
    Atom(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Plus,
    Minus,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Membership
    In,
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
        };
        write!(f, "{}", symbol)
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Gte => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::In => "in",
        };
        write!(f, "{}", symbol)
    }
}

// =============================================================================
// Clauses
// =============================================================================

/// A clause expression: payload plus binding and source location.
///
/// The binding is zipped positionally with the query's froms when the clause
/// is resolved; `"_"` is the wildcard and binds nothing.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct QueryExpr<T> {
    pub expr: T,
    pub binding: Vec<String>,
    pub file: String,
    pub line: u32,
}

impl<T> QueryExpr<T> {
    pub fn new(expr: T) -> Self {
        Self {
            expr,
            binding: vec![],
            file: String::new(),
            line: 0,
        }
    }

    pub fn with_binding(mut self, binding: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.binding = binding.into_iter().map(|name| name.into()).collect();
        self
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.file = file.to_string();
        self.line = line;
        self
    }
}

/// Result shape of a select, for the row mapper downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    Entity,
    Tuple,
    List,
    Expr,
}

/// A select clause payload: shape tag plus body expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub kind: SelectKind,
    pub body: Expr,
}

impl Select {
    pub fn new(kind: SelectKind, body: Expr) -> Self {
        Self { kind, body }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// One `ORDER BY` item: optional direction plus a bound field.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub dir: Option<SortDir>,
    pub var: String,
    pub field: String,
}

impl OrderBy {
    pub fn new(var: &str, field: &str) -> Self {
        Self {
            dir: None,
            var: var.into(),
            field: field.into(),
        }
    }

    pub fn asc(var: &str, field: &str) -> Self {
        Self {
            dir: Some(SortDir::Asc),
            ..Self::new(var, field)
        }
    }

    pub fn desc(var: &str, field: &str) -> Self {
        Self {
            dir: Some(SortDir::Desc),
            ..Self::new(var, field)
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// A query over one or more entity sources.
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use = "Query has no effect until validated and lowered"]
pub struct Query {
    pub froms: Vec<EntityRef>,
    pub wheres: Vec<QueryExpr<Expr>>,
    pub select: Option<QueryExpr<Select>>,
    pub order_bys: Vec<QueryExpr<Vec<OrderBy>>>,
    pub limit: Option<QueryExpr<Expr>>,
    pub offset: Option<QueryExpr<Expr>>,
}

impl Query {
    /// Start a query from a single entity source.
    pub fn from(entity: impl Into<EntityRef>) -> Self {
        Self {
            froms: vec![entity.into()],
            ..Self::default()
        }
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Field access: `var.field`.
pub fn field(var: &str, name: &str) -> Expr {
    Expr::Field {
        var: var.into(),
        field: name.into(),
    }
}

/// Reference to a whole bound entity.
pub fn var(name: &str) -> Expr {
    Expr::Var(name.into())
}

/// Integer literal.
pub fn lit_int(value: i64) -> Expr {
    Expr::Literal(Literal::Int(value))
}

/// Float literal.
pub fn lit_float(value: f64) -> Expr {
    Expr::Literal(Literal::Float(value))
}

/// String literal.
pub fn lit_str(value: &str) -> Expr {
    Expr::Literal(Literal::Str(value.into()))
}

/// Boolean literal.
pub fn lit_bool(value: bool) -> Expr {
    Expr::Literal(Literal::Bool(value))
}

/// Nil literal.
pub fn lit_nil() -> Expr {
    Expr::Literal(Literal::Nil)
}

/// A bare atom (always rejected by the type checker).
pub fn atom(name: &str) -> Expr {
    Expr::Atom(name.into())
}

/// Closed numeric interval.
pub fn range(first: impl Into<Expr>, last: impl Into<Expr>) -> Expr {
    Expr::Range {
        first: Box::new(first.into()),
        last: Box::new(last.into()),
    }
}

/// List literal.
pub fn list(items: impl IntoIterator<Item = impl Into<Expr>>) -> Expr {
    Expr::List(items.into_iter().map(|item| item.into()).collect())
}

/// Tuple literal.
pub fn tuple(items: impl IntoIterator<Item = impl Into<Expr>>) -> Expr {
    Expr::Tuple(items.into_iter().map(|item| item.into()).collect())
}

/// A literal row value.
pub fn lit(value: impl Into<Literal>) -> Literal {
    value.into()
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn binary(self, op: BinaryOperator, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(self.into_expr()),
            right: Box::new(other.into()),
        }
    }

    // Comparison operators
    fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Ne, other)
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lt, other)
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lte, other)
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gt, other)
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gte, other)
    }

    // Logical operators
    fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Or, other)
    }

    fn negate(self) -> Expr {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            arg: Box::new(self.into_expr()),
        }
    }

    // Arithmetic operators
    fn add(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Add, other)
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Sub, other)
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Mul, other)
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Div, other)
    }

    // Membership
    fn is_in(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::In, other)
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value as i64)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.into())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        lit_int(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        lit_int(value as i64)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        lit_float(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        lit_str(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        lit_bool(value)
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Expr::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinators_build_the_expected_tree() {
        let expr = field("p", "views").gte(10).and(field("p", "title").ne(lit_nil()));
        match expr {
            Expr::BinaryOp {
                op: BinaryOperator::And,
                left,
                right,
            } => {
                assert!(matches!(
                    *left,
                    Expr::BinaryOp {
                        op: BinaryOperator::Gte,
                        ..
                    }
                ));
                assert!(matches!(
                    *right,
                    Expr::BinaryOp {
                        op: BinaryOperator::Ne,
                        ..
                    }
                ));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_query_expr_builders() {
        let clause = QueryExpr::new(field("p", "id").eq(1))
            .with_binding(["p"])
            .with_location("queries.rs", 7);
        assert_eq!(clause.binding, vec!["p".to_string()]);
        assert_eq!(clause.file, "queries.rs");
        assert_eq!(clause.line, 7);
    }

    #[test]
    fn test_literal_conversions() {
        assert_eq!(Expr::from(3i64), lit_int(3));
        assert_eq!(Expr::from("hi"), lit_str("hi"));
        assert_eq!(lit(true), Literal::Bool(true));
    }

    #[test]
    fn test_order_by_constructors() {
        assert_eq!(OrderBy::asc("p", "title").dir, Some(SortDir::Asc));
        assert_eq!(OrderBy::desc("p", "id").dir, Some(SortDir::Desc));
        assert_eq!(OrderBy::new("p", "id").dir, None);
    }
}
