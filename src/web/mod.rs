//! Server-rendered HTML interface.
//!
//! Mirrors the JSON API over the same repositories. Every page except the
//! login screen requires a session cookie.

pub mod auth;
pub mod books;
pub mod classification_details;
pub mod classifications;
pub mod divisions;
pub mod session;
pub mod templates;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::domain::{BookFilter, ClassificationDetailFilter, DomainError, Pagination};
use crate::infrastructure::AppState;
use session::SessionUser;
use templates::{error_page, layout};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// Landing page with the size of each catalog.
pub async fn home(user: SessionUser, State(state): State<AppState>) -> Response {
    // only the totals are needed
    let count_only = Pagination {
        page: Some(0),
        limit: Some(1),
    };

    let totals = async {
        let books = state
            .book_repo
            .find_all(BookFilter {
                pagination: count_only,
                ..Default::default()
            })
            .await?
            .total;
        let classifications = state.classification_repo.find_all(count_only).await?.total;
        let details = state
            .classification_detail_repo
            .find_all(ClassificationDetailFilter {
                classification: None,
                pagination: count_only,
            })
            .await?
            .total;
        let divisions = state.division_repo.find_all(count_only).await?.total;
        Ok::<_, DomainError>((books, classifications, details, divisions))
    }
    .await;

    let (books, classifications, details, divisions) = match totals {
        Ok(totals) => totals,
        Err(e) => return error_page(&user, e),
    };

    let content = format!(
        r#"<ul class="summary">
<li><a href="/books">Books</a>: {books}</li>
<li><a href="/classifications">Classifications</a>: {classifications}</li>
<li><a href="/classification-details">Classification details</a>: {details}</li>
<li><a href="/divisions">Divisions</a>: {divisions}</li>
</ul>"#
    );
    layout("Library records", &user, &content).into_response()
}

pub fn web_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        // Session
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/account/password",
            get(auth::password_page).post(auth::change_password),
        )
        // Classifications
        .route("/classifications", get(classifications::list_page))
        .route(
            "/classifications/new",
            get(classifications::new_page).post(classifications::create),
        )
        .route("/classifications/:code", get(classifications::detail_page))
        .route(
            "/classifications/:code/edit",
            get(classifications::edit_page).post(classifications::update),
        )
        .route(
            "/classifications/:code/delete",
            get(classifications::delete_page).post(classifications::delete),
        )
        // Classification details
        .route(
            "/classification-details",
            get(classification_details::list_page),
        )
        .route(
            "/classification-details/new",
            get(classification_details::new_page).post(classification_details::create),
        )
        .route(
            "/classification-details/:code",
            get(classification_details::detail_page),
        )
        .route(
            "/classification-details/:code/edit",
            get(classification_details::edit_page).post(classification_details::update),
        )
        .route(
            "/classification-details/:code/delete",
            get(classification_details::delete_page).post(classification_details::delete),
        )
        // Divisions
        .route("/divisions", get(divisions::list_page))
        .route(
            "/divisions/new",
            get(divisions::new_page).post(divisions::create),
        )
        .route("/divisions/:code", get(divisions::detail_page))
        .route(
            "/divisions/:code/edit",
            get(divisions::edit_page).post(divisions::update),
        )
        .route(
            "/divisions/:code/delete",
            get(divisions::delete_page).post(divisions::delete),
        )
        // Books
        .route("/books", get(books::list_page))
        .route("/books/new", get(books::new_page).post(books::create))
        .route("/books/:id", get(books::detail_page))
        .route(
            "/books/:id/edit",
            get(books::edit_page).post(books::update),
        )
        .route(
            "/books/:id/delete",
            get(books::delete_page).post(books::delete),
        )
        .with_state(state)
}
