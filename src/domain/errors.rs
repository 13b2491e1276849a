//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::collections::BTreeMap;
use std::fmt;

use sea_orm::SqlErr;

/// Field-level validation messages, keyed by the field name clients sent.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Records the outcome of a single-field check.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// One or more fields failed validation
    Validation(ValidationErrors),
    /// Write rejected by an integrity rule (restricted delete, duplicate key)
    Conflict(String),
    /// Missing or wrong credentials
    Unauthorized,
    /// Authenticated but not allowed
    Forbidden,
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(errors) => write!(f, "Validation error: {}", errors),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Unauthorized => write!(f, "Invalid credentials"),
            DomainError::Forbidden => write!(f, "Permission denied"),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => DomainError::Conflict(format!(
                "record is still referenced by other records ({})",
                msg
            )),
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                DomainError::Conflict(format!("record already exists ({})", msg))
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("code", "too short");
        errors.add("code", "not alphanumeric");
        errors.check("name", Ok(()));
        errors.check("name", Err("required".to_string()));

        assert_eq!(errors.get("code").map(|m| m.len()), Some(2));
        assert_eq!(errors.get("name"), Some(&["required".to_string()][..]));
        assert!(matches!(
            errors.clone().into_result(),
            Err(DomainError::Validation(_))
        ));

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"][0], "required");
    }

    #[test]
    fn empty_validation_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
