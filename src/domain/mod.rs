//! Domain layer - Pure business abstractions
//!
//! Catalog records and their write shapes, field validation, book
//! identifiers, repository traits and domain error types. Nothing here knows
//! about HTTP.

pub mod catalog;
pub mod errors;
pub mod ids;
pub mod repositories;
pub mod validation;

pub use catalog::*;
pub use errors::{DomainError, ValidationErrors};
pub use ids::{BookId, BookIdGenerator};
pub use repositories::*;
