//! Catalog records as clients see them, and the write shapes they send.
//!
//! Read shapes embed related rows (`classification_detail: {code, name, ...}`)
//! while write shapes reference them by code (`classification_detail: "A01"`).

use serde::{Deserialize, Serialize};

use super::errors::{DomainError, ValidationErrors};
use super::validation::{self, NAME_MAX, TITLE_MAX};

pub const CLASSIFICATION_CODE_LEN: usize = 3;
pub const CLASSIFICATION_DETAIL_CODE_LEN: usize = 3;
pub const DIVISION_CODE_LEN: usize = 2;

/// Whether a write creates a row or changes an existing one. Primary key
/// codes are only read on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRef {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub code: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationDetailRef {
    pub code: String,
    pub name: String,
    pub classification: ClassificationRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDetail {
    pub code: String,
    pub name: String,
    pub classification: ClassificationRef,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionRef {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Division {
    pub code: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    /// Publication date, `YYYY-MM-DD`
    pub published_on: Option<String>,
    pub isbn: Option<String>,
    pub classification_detail: ClassificationDetailRef,
    pub division: DivisionRef,
    pub is_disposed: bool,
    pub disposed_on: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassificationInput {
    pub code: String,
    pub name: String,
}

impl ClassificationInput {
    pub fn clean(self, mode: WriteMode) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let code = clean_code(&mut errors, mode, &self.code, CLASSIFICATION_CODE_LEN);
        let name = validation::required_text(&self.name, NAME_MAX)
            .map_err(|e| errors.add("name", e))
            .unwrap_or_default();
        errors.into_result()?;
        Ok(Self { code, name })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassificationDetailInput {
    pub code: String,
    pub name: String,
    /// Code of the parent classification
    pub classification: String,
}

impl ClassificationDetailInput {
    pub fn clean(self, mode: WriteMode) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let code = clean_code(
            &mut errors,
            mode,
            &self.code,
            CLASSIFICATION_DETAIL_CODE_LEN,
        );
        let name = validation::required_text(&self.name, NAME_MAX)
            .map_err(|e| errors.add("name", e))
            .unwrap_or_default();
        let classification = validation::code(&self.classification, CLASSIFICATION_CODE_LEN)
            .map_err(|e| errors.add("classification", e))
            .unwrap_or_default();
        errors.into_result()?;
        Ok(Self {
            code,
            name,
            classification,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DivisionInput {
    pub code: String,
    pub name: String,
}

impl DivisionInput {
    pub fn clean(self, mode: WriteMode) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let code = clean_code(&mut errors, mode, &self.code, DIVISION_CODE_LEN);
        let name = validation::required_text(&self.name, NAME_MAX)
            .map_err(|e| errors.add("name", e))
            .unwrap_or_default();
        errors.into_result()?;
        Ok(Self { code, name })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    /// Publication date, `YYYY-MM-DD`
    pub published_on: Option<String>,
    pub isbn: Option<String>,
    /// Code of the classification detail
    pub classification_detail: String,
    /// Code of the responsible division
    pub division: String,
    pub is_disposed: bool,
    pub disposed_on: Option<String>,
}

impl BookInput {
    pub fn clean(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();

        let title = validation::required_text(&self.title, TITLE_MAX)
            .map_err(|e| errors.add("title", e))
            .unwrap_or_default();
        let author = validation::optional_text(self.author.as_deref(), NAME_MAX)
            .map_err(|e| errors.add("author", e))
            .unwrap_or_default();
        let publisher = validation::optional_text(self.publisher.as_deref(), NAME_MAX)
            .map_err(|e| errors.add("publisher", e))
            .unwrap_or_default();
        let published_on = validation::optional_date(self.published_on.as_deref())
            .map_err(|e| errors.add("published_on", e))
            .unwrap_or_default();
        let isbn = validation::isbn(self.isbn.as_deref())
            .map_err(|e| errors.add("isbn", e))
            .unwrap_or_default();
        let classification_detail =
            validation::code(&self.classification_detail, CLASSIFICATION_DETAIL_CODE_LEN)
                .map_err(|e| errors.add("classification_detail", e))
                .unwrap_or_default();
        let division = validation::code(&self.division, DIVISION_CODE_LEN)
            .map_err(|e| errors.add("division", e))
            .unwrap_or_default();
        let disposed_on = validation::optional_date(self.disposed_on.as_deref())
            .map_err(|e| errors.add("disposed_on", e))
            .unwrap_or_default();

        if disposed_on.is_some() && !self.is_disposed {
            errors.add(
                "disposed_on",
                "A disposal date requires the book to be marked as disposed.",
            );
        }

        errors.into_result()?;
        Ok(Self {
            title,
            author,
            publisher,
            published_on,
            isbn,
            classification_detail,
            division,
            is_disposed: self.is_disposed,
            disposed_on,
        })
    }
}

fn clean_code(errors: &mut ValidationErrors, mode: WriteMode, raw: &str, len: usize) -> String {
    match mode {
        WriteMode::Create => validation::code(raw, len)
            .map_err(|e| errors.add("code", e))
            .unwrap_or_default(),
        // read only once created; the path decides which row is updated
        WriteMode::Update => String::new(),
    }
}
