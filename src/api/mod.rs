pub mod auth;
pub mod books;
pub mod classification_details;
pub mod classifications;
pub mod divisions;
pub mod errors;
pub mod health;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::domain::Pagination;
use crate::infrastructure::AppState;

/// Pagination query accepted by the plain list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        .route("/auth/password", post(auth::change_password))
        // Users (admin)
        .route("/users", get(user::list_users).post(user::create_user))
        .route(
            "/users/:id",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        // Classifications
        .route(
            "/classifications",
            get(classifications::list_classifications)
                .post(classifications::create_classification),
        )
        .route(
            "/classifications/:code",
            get(classifications::get_classification)
                .put(classifications::update_classification)
                .delete(classifications::delete_classification),
        )
        // Classification details
        .route(
            "/classification-details",
            get(classification_details::list_classification_details)
                .post(classification_details::create_classification_detail),
        )
        .route(
            "/classification-details/:code",
            get(classification_details::get_classification_detail)
                .put(classification_details::update_classification_detail)
                .delete(classification_details::delete_classification_detail),
        )
        // Divisions
        .route(
            "/divisions",
            get(divisions::list_divisions).post(divisions::create_division),
        )
        .route(
            "/divisions/:code",
            get(divisions::get_division)
                .put(divisions::update_division)
                .delete(divisions::delete_division),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state)
}
