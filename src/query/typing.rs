//! Expression type checking.
//!
//! Binding resolution produces a small per-clause environment mapping
//! variable names to entity references; [`infer`] walks the expression tree
//! against it and either returns the expression's type or rejects the query.
//! Integer and float collapse to `number` at field lookup, so cross-numeric
//! comparison and arithmetic are uniform.

use std::fmt;

use crate::entity::{EntityRef, FieldType};
use crate::error::{InvalidQuery, QueryResult};
use crate::query::ast::{BinaryOperator, Expr, Literal, UnaryOperator};

/// Inferred expression types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    Number,
    Boolean,
    String,
    Nil,
    List,
    Tuple,
    Entity,
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExprType::Number => "number",
            ExprType::Boolean => "boolean",
            ExprType::String => "string",
            ExprType::Nil => "nil",
            ExprType::List => "list",
            ExprType::Tuple => "tuple",
            ExprType::Entity => "entity",
        };
        write!(f, "{}", name)
    }
}

/// Collapse a declared field type into the inferred type domain.
pub fn collapse(field_type: FieldType) -> Option<ExprType> {
    match field_type {
        FieldType::Integer | FieldType::Float => Some(ExprType::Number),
        FieldType::String => Some(ExprType::String),
        FieldType::Boolean => Some(ExprType::Boolean),
        FieldType::Unknown => None,
    }
}

/// Per-clause variable environment.
///
/// Built once per clause by positionally zipping the clause's binding with
/// the query's froms; wildcards bind nothing, and a binding shorter than the
/// from list simply leaves the suffix unnamed.
#[derive(Debug, Clone)]
pub struct TypeEnv {
    vars: Vec<(String, EntityRef)>,
}

impl TypeEnv {
    pub fn new(binding: &[String], froms: &[EntityRef]) -> Self {
        let vars = binding
            .iter()
            .zip(froms.iter())
            .filter(|(name, _)| name.as_str() != "_")
            .map(|(name, entity)| (name.clone(), *entity))
            .collect();
        Self { vars }
    }

    pub fn lookup(&self, var: &str) -> QueryResult<EntityRef> {
        self.vars
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, entity)| *entity)
            .ok_or_else(|| InvalidQuery::new(format!("unbound variable `{}`", var)))
    }
}

/// Infer the type of `expr` in `env`.
pub fn infer(expr: &Expr, env: &TypeEnv) -> QueryResult<ExprType> {
    match expr {
        Expr::Field { var, field } => {
            let entity = env.lookup(var)?;
            collapse(entity.field_type(field)).ok_or_else(|| {
                InvalidQuery::new(format!("unknown field `{}.{}`", var, field))
            })
        }

        Expr::Var(var) => {
            env.lookup(var)?;
            Ok(ExprType::Entity)
        }

        Expr::UnaryOp { op, arg } => {
            let arg_type = infer(arg, env)?;
            let expected = match op {
                UnaryOperator::Not => ExprType::Boolean,
                UnaryOperator::Plus | UnaryOperator::Minus => ExprType::Number,
            };
            if arg_type != expected {
                return Err(InvalidQuery::new(format!(
                    "argument of `{}` must be of type {}, got {}",
                    op, expected, arg_type
                )));
            }
            Ok(expected)
        }

        Expr::BinaryOp { op, left, right } => {
            let left_type = infer(left, env)?;
            let right_type = infer(right, env)?;
            infer_binary(*op, left_type, right_type)
        }

        Expr::Range { first, last } => {
            let first_type = infer(first, env)?;
            let last_type = infer(last, env)?;
            if first_type != ExprType::Number || last_type != ExprType::Number {
                return Err(InvalidQuery::new(format!(
                    "both range bounds must be of type number, got {} and {}",
                    first_type, last_type
                )));
            }
            Ok(ExprType::List)
        }

        Expr::List(items) => {
            for item in items {
                infer(item, env)?;
            }
            Ok(ExprType::List)
        }

        Expr::Tuple(items) => {
            for item in items {
                infer(item, env)?;
            }
            Ok(ExprType::Tuple)
        }

        Expr::Literal(literal) => Ok(match literal {
            Literal::Nil => ExprType::Nil,
            Literal::Bool(_) => ExprType::Boolean,
            Literal::Int(_) | Literal::Float(_) => ExprType::Number,
            Literal::Str(_) => ExprType::String,
        }),

        Expr::Atom(_) => Err(InvalidQuery::new("atoms are not allowed in queries")),
    }
}

fn infer_binary(
    op: BinaryOperator,
    left: ExprType,
    right: ExprType,
) -> QueryResult<ExprType> {
    use BinaryOperator::*;

    match op {
        Eq | Ne => {
            if left == right || left == ExprType::Nil || right == ExprType::Nil {
                Ok(ExprType::Boolean)
            } else {
                Err(InvalidQuery::new(format!(
                    "both arguments of `{}` must be of the same type, got {} and {}",
                    op, left, right
                )))
            }
        }
        And | Or => {
            expect_both(op, ExprType::Boolean, left, right)?;
            Ok(ExprType::Boolean)
        }
        Lt | Lte | Gt | Gte => {
            expect_both(op, ExprType::Number, left, right)?;
            Ok(ExprType::Boolean)
        }
        Add | Sub | Mul | Div => {
            expect_both(op, ExprType::Number, left, right)?;
            Ok(ExprType::Number)
        }
        In => {
            if right != ExprType::List {
                return Err(InvalidQuery::new(format!(
                    "right argument of `in` must be of type list, got {}",
                    right
                )));
            }
            Ok(ExprType::Boolean)
        }
    }
}

fn expect_both(
    op: BinaryOperator,
    expected: ExprType,
    left: ExprType,
    right: ExprType,
) -> QueryResult<()> {
    if left != expected || right != expected {
        return Err(InvalidQuery::new(format!(
            "arguments of `{}` must be of type {}, got {} and {}",
            op, expected, left, right
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntitySchema;
    use crate::query::ast::{atom, field, list, lit_int, lit_nil, lit_str, range, var, ExprExt};

    #[derive(Debug)]
    struct Posts;

    impl EntitySchema for Posts {
        fn dataset(&self) -> &str {
            "posts"
        }

        fn field_names(&self) -> &[&str] {
            &["id", "title", "views", "score", "published"]
        }

        fn field_type(&self, field: &str) -> FieldType {
            match field {
                "id" | "views" => FieldType::Integer,
                "score" => FieldType::Float,
                "title" => FieldType::String,
                "published" => FieldType::Boolean,
                _ => FieldType::Unknown,
            }
        }

        fn primary_key(&self) -> Option<&str> {
            Some("id")
        }
    }

    fn env() -> TypeEnv {
        TypeEnv::new(&["p".into()], &[EntityRef::new(&Posts)])
    }

    #[test]
    fn test_field_types_collapse_to_number() {
        assert_eq!(infer(&field("p", "views"), &env()).unwrap(), ExprType::Number);
        assert_eq!(infer(&field("p", "score"), &env()).unwrap(), ExprType::Number);
        assert_eq!(infer(&field("p", "title"), &env()).unwrap(), ExprType::String);
    }

    #[test]
    fn test_var_is_entity() {
        assert_eq!(infer(&var("p"), &env()).unwrap(), ExprType::Entity);
    }

    #[test]
    fn test_unbound_variable() {
        let err = infer(&field("q", "id"), &env()).unwrap_err();
        assert_eq!(err.reason, "unbound variable `q`");
    }

    #[test]
    fn test_unknown_field() {
        let err = infer(&field("p", "likes"), &env()).unwrap_err();
        assert_eq!(err.reason, "unknown field `p.likes`");
    }

    #[test]
    fn test_wildcard_binds_nothing() {
        let env = TypeEnv::new(&["_".into()], &[EntityRef::new(&Posts)]);
        assert!(env.lookup("_").is_err());
    }

    #[test]
    fn test_eq_requires_same_type_or_nil() {
        let env = env();
        assert_eq!(
            infer(&field("p", "title").eq("x"), &env).unwrap(),
            ExprType::Boolean
        );
        assert_eq!(
            infer(&field("p", "title").eq(lit_nil()), &env).unwrap(),
            ExprType::Boolean
        );
        assert!(infer(&field("p", "title").eq(1), &env).is_err());
    }

    #[test]
    fn test_cross_numeric_comparison() {
        // Integer field against float literal: both collapse to number.
        assert_eq!(
            infer(&field("p", "views").lt(1.5), &env()).unwrap(),
            ExprType::Boolean
        );
    }

    #[test]
    fn test_logical_operators_require_booleans() {
        let env = env();
        let ok = field("p", "published").and(field("p", "views").gt(0));
        assert_eq!(infer(&ok, &env).unwrap(), ExprType::Boolean);

        let err = infer(&field("p", "title").or(lit_int(1)), &env).unwrap_err();
        assert!(err.reason.contains("`or`"), "reason: {}", err.reason);
    }

    #[test]
    fn test_arithmetic_is_number() {
        assert_eq!(
            infer(&field("p", "views").add(1).mul(2), &env()).unwrap(),
            ExprType::Number
        );
    }

    #[test]
    fn test_in_requires_list() {
        let env = env();
        assert_eq!(
            infer(&field("p", "views").is_in(list([1, 2, 3])), &env).unwrap(),
            ExprType::Boolean
        );
        assert_eq!(
            infer(&field("p", "views").is_in(range(1, 3)), &env).unwrap(),
            ExprType::Boolean
        );
        let err = infer(&field("p", "views").is_in(lit_int(1)), &env).unwrap_err();
        assert_eq!(err.reason, "right argument of `in` must be of type list, got number");
    }

    #[test]
    fn test_range_bounds_must_be_numbers() {
        assert_eq!(infer(&range(1, 3), &env()).unwrap(), ExprType::List);
        assert!(infer(&range(lit_str("a"), 3), &env()).is_err());
    }

    #[test]
    fn test_atoms_are_rejected() {
        let err = infer(&atom("ok"), &env()).unwrap_err();
        assert_eq!(err.reason, "atoms are not allowed in queries");
    }

    #[test]
    fn test_not_requires_boolean() {
        let env = env();
        assert_eq!(
            infer(&field("p", "published").negate(), &env).unwrap(),
            ExprType::Boolean
        );
        assert!(infer(&field("p", "views").negate(), &env).is_err());
    }
}
