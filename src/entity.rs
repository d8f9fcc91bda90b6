//! Entity schemas - the capability contract of schema-bound record types.
//!
//! The core never sees concrete schema types; it is polymorphic over
//! [`EntitySchema`] and obtains the table name, field list, field types, and
//! the optional primary key exclusively through it.

use std::fmt;

use crate::query::ast::Literal;

/// Declared type of an entity field.
///
/// `Unknown` is what [`EntitySchema::field_type`] answers for a field the
/// schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Float,
    String,
    Boolean,
    Unknown,
}

/// Capability set every entity schema satisfies.
///
/// Implementations are usually generated unit structs; the crate only ever
/// holds `&'static dyn EntitySchema` handles to them.
pub trait EntitySchema: fmt::Debug + Send + Sync {
    /// Name of the backing table.
    fn dataset(&self) -> &str;

    /// Ordered field names, primary key first if one is declared.
    fn field_names(&self) -> &[&str];

    /// Declared type of `field`, or `Unknown` when undeclared.
    fn field_type(&self, field: &str) -> FieldType;

    /// The primary-key field, if the schema declares one.
    fn primary_key(&self) -> Option<&str> {
        None
    }
}

/// A copyable reference to an entity schema.
///
/// Equality compares datasets: two handles to the same table are the same
/// entity for query purposes.
#[derive(Clone, Copy)]
pub struct EntityRef {
    schema: &'static dyn EntitySchema,
}

impl EntityRef {
    pub fn new(schema: &'static dyn EntitySchema) -> Self {
        Self { schema }
    }

    pub fn dataset(&self) -> &str {
        self.schema.dataset()
    }

    pub fn field_names(&self) -> &[&str] {
        self.schema.field_names()
    }

    pub fn field_type(&self, field: &str) -> FieldType {
        self.schema.field_type(field)
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.schema.primary_key()
    }

    /// Whether the schema declares `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.schema.field_type(field) != FieldType::Unknown
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({})", self.schema.dataset())
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.schema.dataset() == other.schema.dataset()
    }
}

impl<T: EntitySchema> From<&'static T> for EntityRef {
    fn from(schema: &'static T) -> Self {
        EntityRef::new(schema)
    }
}

/// An entity value: one literal per declared field, in schema order.
///
/// The schema witness travels with the values, so the DML generator can
/// extract the table, the column list, and the primary key without ever
/// touching a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    entity: EntityRef,
    values: Vec<Literal>,
}

impl Row {
    /// Build a row from values aligned with `entity.field_names()`.
    ///
    /// # Panics
    ///
    /// Panics when the value count does not match the schema's field count.
    pub fn new(entity: EntityRef, values: Vec<Literal>) -> Self {
        assert_eq!(
            entity.field_names().len(),
            values.len(),
            "row for {} expects {} values, got {}",
            entity.dataset(),
            entity.field_names().len(),
            values.len()
        );
        Self { entity, values }
    }

    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    /// Field names zipped with their values, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.entity
            .field_names()
            .iter()
            .copied()
            .zip(self.values.iter())
    }

    /// Value of `field`, if the schema declares it.
    pub fn get(&self, field: &str) -> Option<&Literal> {
        self.fields().find(|(name, _)| *name == field).map(|(_, v)| v)
    }

    /// Primary-key field and value, if the schema declares a pk.
    pub fn primary_key(&self) -> Option<(&str, &Literal)> {
        let pk = self.entity.primary_key()?;
        self.get(pk).map(|value| (pk, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::lit;

    #[derive(Debug)]
    struct Accounts;

    impl EntitySchema for Accounts {
        fn dataset(&self) -> &str {
            "accounts"
        }

        fn field_names(&self) -> &[&str] {
            &["id", "email", "balance"]
        }

        fn field_type(&self, field: &str) -> FieldType {
            match field {
                "id" => FieldType::Integer,
                "email" => FieldType::String,
                "balance" => FieldType::Float,
                _ => FieldType::Unknown,
            }
        }

        fn primary_key(&self) -> Option<&str> {
            Some("id")
        }
    }

    #[test]
    fn test_entity_ref_capabilities() {
        let entity = EntityRef::new(&Accounts);
        assert_eq!(entity.dataset(), "accounts");
        assert_eq!(entity.field_names(), &["id", "email", "balance"]);
        assert_eq!(entity.field_type("email"), FieldType::String);
        assert_eq!(entity.field_type("missing"), FieldType::Unknown);
        assert!(entity.has_field("balance"));
        assert!(!entity.has_field("missing"));
        assert_eq!(entity.primary_key(), Some("id"));
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::new(
            EntityRef::new(&Accounts),
            vec![lit(1), lit("a@b.c"), lit(9.5)],
        );
        assert_eq!(row.get("email"), Some(&Literal::Str("a@b.c".into())));
        assert_eq!(row.primary_key(), Some(("id", &Literal::Int(1))));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    #[should_panic(expected = "expects 3 values")]
    fn test_row_arity_mismatch_panics() {
        Row::new(EntityRef::new(&Accounts), vec![lit(1)]);
    }
}
