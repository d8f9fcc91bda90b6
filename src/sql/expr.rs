//! Expression lowering.
//!
//! Lowers validated expression trees to token streams. The rewrites that
//! separate the IR from PostgreSQL happen here: NULL comparisons become
//! `IS [NOT] NULL`, `in` over a range becomes `BETWEEN`, list membership
//! becomes `= ANY (…)`, and lists become `ARRAY[…]` literals.
//!
//! The lowerer assumes validated input; an expression shape that cannot
//! appear after validation is a programmer error and panics with the node
//! rendered.

use crate::entity::EntityRef;
use crate::query::ast::{BinaryOperator, Expr, Literal, UnaryOperator};

use super::token::{Token, TokenStream};

/// Alias scope of a single clause: binding names resolved to table aliases
/// and their entities, by positional zip with the query's froms.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    vars: Vec<(String, String, EntityRef)>,
}

impl Scope {
    pub(crate) fn new(binding: &[String], aliases: &[String], froms: &[EntityRef]) -> Self {
        let vars = binding
            .iter()
            .zip(aliases.iter())
            .zip(froms.iter())
            .filter(|((name, _), _)| name.as_str() != "_")
            .map(|((name, alias), entity)| (name.clone(), alias.clone(), *entity))
            .collect();
        Self { vars }
    }

    /// Resolve a variable to its alias and entity.
    ///
    /// # Panics
    ///
    /// Validation guarantees every variable resolves; a miss here is a
    /// programmer error.
    pub(crate) fn lookup(&self, var: &str) -> (&str, EntityRef) {
        self.vars
            .iter()
            .find(|(name, _, _)| name == var)
            .map(|(_, alias, entity)| (alias.as_str(), *entity))
            .unwrap_or_else(|| panic!("unresolved variable `{}` in validated query", var))
    }
}

/// Lower an expression to tokens.
pub(crate) fn expr_tokens(expr: &Expr, scope: &Scope) -> TokenStream {
    let mut ts = TokenStream::new();

    match expr {
        Expr::Field { var, field } => {
            let (alias, _) = scope.lookup(var);
            ts.ident(alias).push(Token::Dot).ident(field);
        }

        Expr::Var(var) => {
            let (alias, entity) = scope.lookup(var);
            ts.append(&entity_fields(alias, entity));
        }

        Expr::UnaryOp { op, arg } => match op {
            UnaryOperator::Not => {
                ts.push(Token::Not).space().lparen();
                ts.append(&expr_tokens(arg, scope));
                ts.rparen();
            }
            UnaryOperator::Plus => {
                ts.push(Token::Plus).append(&expr_tokens(arg, scope));
            }
            UnaryOperator::Minus => {
                ts.push(Token::Minus).append(&expr_tokens(arg, scope));
            }
        },

        Expr::BinaryOp { op, left, right } => {
            ts.append(&binary_tokens(*op, left, right, scope));
        }

        Expr::Range { first, last } => {
            // A range in value position is its enumerated list.
            ts.append(&expr_tokens(&enumerate_range(first, last), scope));
        }

        Expr::List(items) => {
            ts.push(Token::Array).push(Token::LBracket);
            let lowered: Vec<TokenStream> =
                items.iter().map(|item| expr_tokens(item, scope)).collect();
            ts.comma_separated(lowered.iter());
            ts.push(Token::RBracket);
        }

        Expr::Literal(literal) => {
            ts.push(literal_token(literal));
        }

        Expr::Tuple(_) | Expr::Atom(_) => {
            panic!("unexpected expression node in SQL generation: {:?}", expr)
        }
    }

    ts
}

fn binary_tokens(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    scope: &Scope,
) -> TokenStream {
    let mut ts = TokenStream::new();

    // NULL comparison rewrite: `x == nil` / `nil == x` have no `=` form.
    if matches!(op, BinaryOperator::Eq | BinaryOperator::Ne) {
        let target = match (left, right) {
            (_, Expr::Literal(Literal::Nil)) => Some(left),
            (Expr::Literal(Literal::Nil), _) => Some(right),
            _ => None,
        };
        if let Some(target) = target {
            ts.append(&expr_tokens(target, scope)).space();
            ts.push(if op == BinaryOperator::Eq {
                Token::IsNull
            } else {
                Token::IsNotNull
            });
            return ts;
        }
    }

    if op == BinaryOperator::In {
        match right {
            // `x in a..b` is a closed interval test.
            Expr::Range { first, last } => {
                ts.append(&expr_tokens(left, scope)).space();
                ts.push(Token::Between).space();
                ts.append(&expr_tokens(first, scope)).space();
                ts.push(Token::And).space();
                ts.append(&expr_tokens(last, scope));
            }
            _ => {
                ts.append(&expr_tokens(left, scope)).space();
                ts.push(Token::Eq).space().push(Token::Any).space().lparen();
                ts.append(&expr_tokens(right, scope));
                ts.rparen();
            }
        }
        return ts;
    }

    ts.append(&operand_tokens(left, scope)).space();
    ts.push(operator_token(op)).space();
    ts.append(&operand_tokens(right, scope));
    ts
}

/// Lower a binary operand, parenthesizing nested binary operations.
fn operand_tokens(expr: &Expr, scope: &Scope) -> TokenStream {
    match expr {
        Expr::BinaryOp { .. } => {
            let mut ts = TokenStream::new();
            ts.lparen().append(&expr_tokens(expr, scope)).rparen();
            ts
        }
        _ => expr_tokens(expr, scope),
    }
}

/// All of an entity's fields as `alias.field`, comma-joined.
pub(crate) fn entity_fields(alias: &str, entity: EntityRef) -> TokenStream {
    let mut ts = TokenStream::new();
    for (index, field) in entity.field_names().iter().enumerate() {
        if index > 0 {
            ts.comma().space();
        }
        ts.ident(alias).push(Token::Dot).ident(field);
    }
    ts
}

/// The operator table: IR operator to SQL token.
fn operator_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Add => Token::Plus,
        BinaryOperator::Sub => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::In => unreachable!("`in` is rewritten before operator lookup"),
    }
}

pub(crate) fn literal_token(literal: &Literal) -> Token {
    match literal {
        Literal::Nil => Token::LitNull,
        Literal::Bool(b) => Token::LitBool(*b),
        Literal::Int(n) => Token::LitInt(*n),
        Literal::Float(f) => Token::LitFloat(*f),
        Literal::Str(s) => Token::LitString(s.clone()),
    }
}

/// Expand a value-position range into its enumerated list.
///
/// Validation only guarantees numeric bounds; enumeration additionally needs
/// integer literals, anything else is a programmer error.
fn enumerate_range(first: &Expr, last: &Expr) -> Expr {
    let (first, last) = match (first, last) {
        (Expr::Literal(Literal::Int(first)), Expr::Literal(Literal::Int(last))) => {
            (*first, *last)
        }
        _ => panic!(
            "range in value position requires integer literal bounds: {:?}..{:?}",
            first, last
        ),
    };

    let values: Vec<i64> = if first <= last {
        (first..=last).collect()
    } else {
        (last..=first).rev().collect()
    };
    Expr::List(
        values
            .into_iter()
            .map(|n| Expr::Literal(Literal::Int(n)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntitySchema, FieldType};
    use crate::query::ast::{field, list, lit_int, lit_nil, lit_str, range, var, ExprExt};

    #[derive(Debug)]
    struct Posts;

    impl EntitySchema for Posts {
        fn dataset(&self) -> &str {
            "posts"
        }

        fn field_names(&self) -> &[&str] {
            &["id", "title", "views"]
        }

        fn field_type(&self, field: &str) -> FieldType {
            match field {
                "id" | "views" => FieldType::Integer,
                "title" => FieldType::String,
                _ => FieldType::Unknown,
            }
        }

        fn primary_key(&self) -> Option<&str> {
            Some("id")
        }
    }

    fn scope() -> Scope {
        Scope::new(
            &["p".into()],
            &["p0".into()],
            &[EntityRef::new(&Posts)],
        )
    }

    fn lower(expr: &Expr) -> String {
        expr_tokens(expr, &scope()).serialize()
    }

    #[test]
    fn test_field_access() {
        assert_eq!(lower(&field("p", "title")), "p0.title");
    }

    #[test]
    fn test_var_expands_to_fields() {
        assert_eq!(lower(&var("p")), "p0.id, p0.title, p0.views");
    }

    #[test]
    fn test_binary_operand_parenthesization() {
        let expr = field("p", "views").add(1).mul(2);
        assert_eq!(lower(&expr), "(p0.views + 1) * 2");
    }

    #[test]
    fn test_flat_comparison_is_bare() {
        assert_eq!(lower(&field("p", "title").eq(lit_str("x"))), "p0.title = 'x'");
        assert_eq!(lower(&field("p", "views").ne(3)), "p0.views != 3");
    }

    #[test]
    fn test_and_wraps_binary_operands() {
        let expr = field("p", "views").gt(1).and(field("p", "views").lt(9));
        assert_eq!(lower(&expr), "(p0.views > 1) AND (p0.views < 9)");
    }

    #[test]
    fn test_nil_comparisons() {
        assert_eq!(lower(&field("p", "title").eq(lit_nil())), "p0.title IS NULL");
        assert_eq!(
            lower(&lit_nil().ne(field("p", "title"))),
            "p0.title IS NOT NULL"
        );
    }

    #[test]
    fn test_not_wraps_argument() {
        let expr = field("p", "views").gt(1).negate();
        assert_eq!(lower(&expr), "NOT (p0.views > 1)");
    }

    #[test]
    fn test_unary_sign() {
        let expr = Expr::UnaryOp {
            op: UnaryOperator::Minus,
            arg: Box::new(field("p", "views")),
        };
        assert_eq!(lower(&expr), "-p0.views");
    }

    #[test]
    fn test_in_range_is_between() {
        let expr = field("p", "views").is_in(range(1, 3));
        assert_eq!(lower(&expr), "p0.views BETWEEN 1 AND 3");
    }

    #[test]
    fn test_in_list_is_any() {
        let expr = field("p", "views").is_in(list([1, 2, 3]));
        assert_eq!(lower(&expr), "p0.views = ANY (ARRAY[1, 2, 3])");
    }

    #[test]
    fn test_range_value_enumerates() {
        assert_eq!(lower(&range(1, 3)), "ARRAY[1, 2, 3]");
        assert_eq!(lower(&range(3, 1)), "ARRAY[3, 2, 1]");
    }

    #[test]
    fn test_list_literal() {
        assert_eq!(
            lower(&list([lit_str("a"), lit_str("b")])),
            "ARRAY['a', 'b']"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(lower(&lit_nil()), "NULL");
        assert_eq!(lower(&lit_int(7)), "7");
        assert_eq!(lower(&crate::query::ast::lit_bool(false)), "FALSE");
    }

    #[test]
    #[should_panic(expected = "unexpected expression node")]
    fn test_nested_tuple_panics() {
        lower(&crate::query::ast::tuple([lit_int(1), lit_int(2)]));
    }

    #[test]
    #[should_panic(expected = "unresolved variable")]
    fn test_unresolved_variable_panics() {
        lower(&field("q", "id"));
    }
}
