//! Book API handlers
//!
//! Books are addressed by their ULID. A path segment that is not a
//! well-formed ULID cannot name a book and is answered with 404.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::domain::{BookFilter, BookId, BookInput, DomainError, Pagination};
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookListQuery {
    /// Classification code, matched through the book's classification detail
    pub classification: Option<String>,
    pub division: Option<String>,
    pub disposed: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl From<BookListQuery> for BookFilter {
    fn from(query: BookListQuery) -> Self {
        Self {
            classification: query.classification,
            division: query.division,
            disposed: query.disposed,
            pagination: Pagination {
                page: query.page,
                limit: query.limit,
            },
        }
    }
}

fn parse_id(raw: &str) -> Result<BookId, DomainError> {
    BookId::parse(raw).ok_or(DomainError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("classification" = Option<String>, Query, description = "Classification code"),
        ("division" = Option<String>, Query, description = "Division code"),
        ("disposed" = Option<bool>, Query, description = "Only disposed / only kept books"),
        ("page" = Option<u64>, Query, description = "Zero-based page, used with limit"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 1000")
    ),
    responses((status = 200, description = "Books in creation order"))
)]
pub async fn list_books(
    _claims: Claims,
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let result = state.book_repo.find_all(query.into()).await?;

    Ok(Json(json!({
        "books": result.items,
        "total": result.total
    })))
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created under a new ULID"),
        (status = 400, description = "Invalid fields or unknown references")
    )
)]
pub async fn create_book(
    _claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<BookInput>,
) -> Result<impl IntoResponse, DomainError> {
    let book = state.book_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book created successfully",
            "book": book
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "26-character ULID")),
    responses(
        (status = 200, description = "Book with its classification and division"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    _claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let id = parse_id(&id)?;
    let book = state
        .book_repo
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(json!({ "book": book })))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "26-character ULID")),
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Invalid fields or unknown references"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    _claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<BookInput>,
) -> Result<impl IntoResponse, DomainError> {
    let id = parse_id(&id)?;
    let book = state.book_repo.update(&id, payload).await?;

    Ok(Json(json!({ "book": book })))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "26-character ULID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    _claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let id = parse_id(&id)?;
    state.book_repo.delete(&id).await?;

    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
