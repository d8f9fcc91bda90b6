//! Shared entity fixtures for the integration suites.

use entiq::{EntityRef, EntitySchema, FieldType};

#[derive(Debug)]
pub struct PostEntity;

impl EntitySchema for PostEntity {
    fn dataset(&self) -> &str {
        "post_entity"
    }

    fn field_names(&self) -> &[&str] {
        &["id", "title"]
    }

    fn field_type(&self, field: &str) -> FieldType {
        match field {
            "id" => FieldType::Integer,
            "title" => FieldType::String,
            _ => FieldType::Unknown,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        Some("id")
    }
}

#[derive(Debug)]
pub struct CommentEntity;

impl EntitySchema for CommentEntity {
    fn dataset(&self) -> &str {
        "comment_entity"
    }

    fn field_names(&self) -> &[&str] {
        &["id", "text"]
    }

    fn field_type(&self, field: &str) -> FieldType {
        match field {
            "id" => FieldType::Integer,
            "text" => FieldType::String,
            _ => FieldType::Unknown,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        Some("id")
    }
}

#[derive(Debug)]
pub struct AccountEntity;

impl EntitySchema for AccountEntity {
    fn dataset(&self) -> &str {
        "account_entity"
    }

    fn field_names(&self) -> &[&str] {
        &["id", "email", "active", "balance"]
    }

    fn field_type(&self, field: &str) -> FieldType {
        match field {
            "id" => FieldType::Integer,
            "email" => FieldType::String,
            "active" => FieldType::Boolean,
            "balance" => FieldType::Float,
            _ => FieldType::Unknown,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        Some("id")
    }
}

pub fn post() -> EntityRef {
    EntityRef::new(&PostEntity)
}

pub fn comment() -> EntityRef {
    EntityRef::new(&CommentEntity)
}

pub fn account() -> EntityRef {
    EntityRef::new(&AccountEntity)
}
