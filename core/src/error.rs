use std::fmt;
use thiserror::Error;

use crate::model::type_enum::EntityKind;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("{kind} {id} does not exist")]
    MissingReference { kind: EntityKind, id: i64 },
    #[error("{kind} {id} is referenced by {shows} show(s)")]
    InUse {
        kind: EntityKind,
        id: i64,
        shows: u64,
    },
    #[error("Database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        CatalogError::NotFound { kind, id }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

/// Every field rejected by a form, in the order they were checked.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.push(FieldError {
            field,
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.reason)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
