//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::catalog::{
    Book, BookInput, Classification, ClassificationDetail, ClassificationDetailInput,
    ClassificationInput, Division, DivisionInput,
};
use super::ids::BookId;

/// Optional pagination shared by every list query. `page` is zero based and
/// only applies when `limit` is set.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Filter criteria for classification detail queries
#[derive(Debug, Default, Clone)]
pub struct ClassificationDetailFilter {
    /// Parent classification code
    pub classification: Option<String>,
    pub pagination: Pagination,
}

/// Filter criteria for book queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Classification code, matched through the book's classification detail
    pub classification: Option<String>,
    pub division: Option<String>,
    pub disposed: Option<bool>,
    pub pagination: Pagination,
}

/// Paginated result with total count
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Repository trait for Classification entity
#[async_trait]
pub trait ClassificationRepository: Send + Sync {
    /// Find all classifications ordered by code
    async fn find_all(&self, pagination: Pagination)
    -> Result<Paginated<Classification>, DomainError>;

    /// Find a classification by code
    async fn find_by_code(&self, code: &str) -> Result<Option<Classification>, DomainError>;

    async fn create(&self, input: ClassificationInput) -> Result<Classification, DomainError>;

    async fn update(
        &self,
        code: &str,
        input: ClassificationInput,
    ) -> Result<Classification, DomainError>;

    /// Delete a classification; fails with `Conflict` while details refer to it
    async fn delete(&self, code: &str) -> Result<(), DomainError>;
}

/// Repository trait for ClassificationDetail entity
#[async_trait]
pub trait ClassificationDetailRepository: Send + Sync {
    async fn find_all(
        &self,
        filter: ClassificationDetailFilter,
    ) -> Result<Paginated<ClassificationDetail>, DomainError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<ClassificationDetail>, DomainError>;

    async fn create(
        &self,
        input: ClassificationDetailInput,
    ) -> Result<ClassificationDetail, DomainError>;

    async fn update(
        &self,
        code: &str,
        input: ClassificationDetailInput,
    ) -> Result<ClassificationDetail, DomainError>;

    /// Delete a detail; fails with `Conflict` while books refer to it
    async fn delete(&self, code: &str) -> Result<(), DomainError>;
}

/// Repository trait for Division entity
#[async_trait]
pub trait DivisionRepository: Send + Sync {
    async fn find_all(&self, pagination: Pagination) -> Result<Paginated<Division>, DomainError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Division>, DomainError>;

    async fn create(&self, input: DivisionInput) -> Result<Division, DomainError>;

    async fn update(&self, code: &str, input: DivisionInput) -> Result<Division, DomainError>;

    /// Delete a division; fails with `Conflict` while books refer to it
    async fn delete(&self, code: &str) -> Result<(), DomainError>;
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria, oldest first
    async fn find_all(&self, filter: BookFilter) -> Result<Paginated<Book>, DomainError>;

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, DomainError>;

    /// Create a new book under a freshly generated id
    async fn create(&self, input: BookInput) -> Result<Book, DomainError>;

    async fn update(&self, id: &BookId, input: BookInput) -> Result<Book, DomainError>;

    async fn delete(&self, id: &BookId) -> Result<(), DomainError>;
}

/// User data for API responses. The password hash never leaves the
/// infrastructure layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

/// Input for updating a user; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// Repository trait for User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Check a username/password pair. Unknown users, inactive users and
    /// wrong passwords all fail with `Unauthorized`.
    async fn verify_credentials(&self, username: &str, password: &str)
    -> Result<User, DomainError>;

    async fn create(&self, input: NewUser) -> Result<User, DomainError>;

    async fn update(&self, id: i32, input: UserUpdate) -> Result<User, DomainError>;

    /// Replace a user's password after checking the current one
    async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
