use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::session::SessionUser;
use super::templates::{
    PAGE_SIZE, checkbox, confirm_delete, date_input, error_page, escape, form, layout, pager,
    render, select, text_input,
};
use crate::domain::{
    Book, BookFilter, BookId, BookInput, ClassificationDetailFilter, DomainError, Pagination,
    ValidationErrors,
};
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookPageQuery {
    pub classification: Option<String>,
    pub division: Option<String>,
    /// `yes`, `no` or empty for both
    pub disposed: Option<String>,
    pub page: Option<u64>,
}

/// Raw book form as the browser posts it. Unchecked checkboxes are simply
/// missing from the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_on: String,
    pub isbn: String,
    pub classification_detail: String,
    pub division: String,
    pub is_disposed: Option<String>,
    pub disposed_on: String,
}

impl BookForm {
    fn from_book(book: &Book) -> Self {
        BookForm {
            title: book.title.clone(),
            author: book.author.clone().unwrap_or_default(),
            publisher: book.publisher.clone().unwrap_or_default(),
            published_on: book.published_on.clone().unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            classification_detail: book.classification_detail.code.clone(),
            division: book.division.code.clone(),
            is_disposed: book.is_disposed.then(|| "on".to_string()),
            disposed_on: book.disposed_on.clone().unwrap_or_default(),
        }
    }

    fn is_disposed(&self) -> bool {
        self.is_disposed.is_some()
    }

    fn to_input(&self) -> BookInput {
        BookInput {
            title: self.title.clone(),
            author: Some(self.author.clone()),
            publisher: Some(self.publisher.clone()),
            published_on: Some(self.published_on.clone()),
            isbn: Some(self.isbn.clone()),
            classification_detail: self.classification_detail.clone(),
            division: self.division.clone(),
            is_disposed: self.is_disposed(),
            disposed_on: Some(self.disposed_on.clone()),
        }
    }
}

fn url_for(id: &str) -> String {
    format!("/books/{}", urlencoding::encode(id))
}

async fn load(state: &AppState, id: &str) -> Result<Book, DomainError> {
    let id = BookId::parse(id).ok_or(DomainError::NotFound)?;
    state
        .book_repo
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound)
}

async fn classification_options(state: &AppState) -> Result<Vec<(String, String)>, DomainError> {
    let all = state
        .classification_repo
        .find_all(Pagination::default())
        .await?;
    Ok(all
        .items
        .into_iter()
        .map(|c| {
            let label = format!("{} {}", c.code, c.name);
            (c.code, label)
        })
        .collect())
}

async fn detail_options(state: &AppState) -> Result<Vec<(String, String)>, DomainError> {
    let all = state
        .classification_detail_repo
        .find_all(ClassificationDetailFilter::default())
        .await?;
    Ok(all
        .items
        .into_iter()
        .map(|d| {
            let label = format!("{} {} ({})", d.code, d.name, d.classification.name);
            (d.code, label)
        })
        .collect())
}

async fn division_options(state: &AppState) -> Result<Vec<(String, String)>, DomainError> {
    let all = state.division_repo.find_all(Pagination::default()).await?;
    Ok(all
        .items
        .into_iter()
        .map(|d| {
            let label = format!("{} {}", d.code, d.name);
            (d.code, label)
        })
        .collect())
}

/// Shared by the new and edit screens; `id` is `None` when creating.
async fn book_form(
    state: &AppState,
    user: &SessionUser,
    id: Option<&str>,
    values: &BookForm,
    errors: Option<&ValidationErrors>,
) -> Response {
    let details = match detail_options(state).await {
        Ok(options) => options,
        Err(e) => return error_page(user, e),
    };
    let divisions = match division_options(state).await {
        Ok(options) => options,
        Err(e) => return error_page(user, e),
    };

    let (title, action, cancel, submit) = match id {
        None => (
            "New book".to_string(),
            "/books/new".to_string(),
            "/books".to_string(),
            "Create",
        ),
        Some(id) => (
            "Edit book".to_string(),
            format!("{}/edit", url_for(id)),
            url_for(id),
            "Save",
        ),
    };

    let fields = [
        text_input("Title", "title", &values.title, errors, r#"maxlength="200" required autofocus"#),
        text_input("Author", "author", &values.author, errors, r#"maxlength="100""#),
        text_input("Publisher", "publisher", &values.publisher, errors, r#"maxlength="100""#),
        date_input("Published on", "published_on", &values.published_on, errors),
        text_input("ISBN", "isbn", &values.isbn, errors, r#"maxlength="17""#),
        select(
            "Classification detail",
            "classification_detail",
            &details,
            &values.classification_detail,
            errors,
        ),
        select("Division", "division", &divisions, &values.division, errors),
        checkbox("Disposed", "is_disposed", values.is_disposed(), errors),
        date_input("Disposed on", "disposed_on", &values.disposed_on, errors),
    ]
    .concat();

    let status = if errors.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    render(
        status,
        layout(&title, user, &form(&action, &fields, submit, &cancel)),
    )
}

pub async fn list_page(
    user: SessionUser,
    State(state): State<AppState>,
    Query(query): Query<BookPageQuery>,
) -> Response {
    let page = query.page.unwrap_or(0);
    let classification = query
        .classification
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_default();
    let division = query
        .division
        .map(|d| d.trim().to_uppercase())
        .unwrap_or_default();
    let disposed = query.disposed.unwrap_or_default();

    let filter = BookFilter {
        classification: Some(classification.clone()).filter(|c| !c.is_empty()),
        division: Some(division.clone()).filter(|d| !d.is_empty()),
        disposed: match disposed.as_str() {
            "yes" => Some(true),
            "no" => Some(false),
            _ => None,
        },
        pagination: Pagination {
            page: Some(page),
            limit: Some(PAGE_SIZE),
        },
    };

    let found = match state.book_repo.find_all(filter).await {
        Ok(found) => found,
        Err(e) => return error_page(&user, e),
    };
    let classifications = match classification_options(&state).await {
        Ok(options) => options,
        Err(e) => return error_page(&user, e),
    };
    let divisions = match division_options(&state).await {
        Ok(options) => options,
        Err(e) => return error_page(&user, e),
    };
    let disposed_options = vec![
        ("no".to_string(), "In holdings".to_string()),
        ("yes".to_string(), "Disposed".to_string()),
    ];

    let mut content = format!(
        r#"<form method="get" action="/books" class="filters">{}{}{}<p><button type="submit">Filter</button></p></form>
<p><a class="button" href="/books/new">New book</a> {} found</p>"#,
        select("Classification", "classification", &classifications, &classification, None),
        select("Division", "division", &divisions, &division, None),
        select("Status", "disposed", &disposed_options, &disposed, None),
        found.total,
    );

    if found.items.is_empty() {
        content.push_str("<p>No books found.</p>");
    } else {
        content.push_str(
            "<table><thead><tr><th>Title</th><th>Author</th><th>Classification</th><th>Division</th><th>Status</th></tr></thead><tbody>",
        );
        for b in &found.items {
            content.push_str(&format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{} {}</td><td>{}</td><td>{}</td></tr>"#,
                escape(&url_for(&b.id)),
                escape(&b.title),
                escape(b.author.as_deref().unwrap_or("")),
                escape(&b.classification_detail.code),
                escape(&b.classification_detail.name),
                escape(&b.division.name),
                if b.is_disposed { "Disposed" } else { "" },
            ));
        }
        content.push_str("</tbody></table>");
    }
    content.push_str(&pager(
        "/books",
        &[
            ("classification", &classification),
            ("division", &division),
            ("disposed", &disposed),
        ],
        page,
        found.total,
    ));

    layout("Books", &user, &content).into_response()
}

pub async fn detail_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let book = match load(&state, &id).await {
        Ok(b) => b,
        Err(e) => return error_page(&user, e),
    };

    let optional = |v: &Option<String>| escape(v.as_deref().unwrap_or("-"));
    let url = url_for(&book.id);
    let content = format!(
        r#"<dl>
<dt>ID</dt><dd><code>{id}</code></dd>
<dt>Author</dt><dd>{author}</dd>
<dt>Publisher</dt><dd>{publisher}</dd>
<dt>Published on</dt><dd>{published_on}</dd>
<dt>ISBN</dt><dd>{isbn}</dd>
<dt>Classification</dt><dd>{class_code} {class_name}</dd>
<dt>Classification detail</dt><dd><a href="{detail_url}">{detail_code}</a> {detail_name}</dd>
<dt>Division</dt><dd><a href="{division_url}">{division_code}</a> {division_name}</dd>
<dt>Disposed</dt><dd>{disposed}</dd>
<dt>Created</dt><dd>{created}</dd>
<dt>Updated</dt><dd>{updated}</dd>
</dl>
<p><a class="button" href="{edit}">Edit</a> <a class="button danger" href="{delete}">Delete</a></p>"#,
        id = escape(&book.id),
        author = optional(&book.author),
        publisher = optional(&book.publisher),
        published_on = optional(&book.published_on),
        isbn = optional(&book.isbn),
        class_code = escape(&book.classification_detail.classification.code),
        class_name = escape(&book.classification_detail.classification.name),
        detail_url = escape(&format!(
            "/classification-details/{}",
            urlencoding::encode(&book.classification_detail.code)
        )),
        detail_code = escape(&book.classification_detail.code),
        detail_name = escape(&book.classification_detail.name),
        division_url = escape(&format!(
            "/divisions/{}",
            urlencoding::encode(&book.division.code)
        )),
        division_code = escape(&book.division.code),
        division_name = escape(&book.division.name),
        disposed = match (book.is_disposed, &book.disposed_on) {
            (true, Some(on)) => format!("Yes, on {}", escape(on)),
            (true, None) => "Yes".to_string(),
            (false, _) => "No".to_string(),
        },
        created = escape(&book.created_at),
        updated = escape(&book.updated_at),
        edit = escape(&format!("{}/edit", url)),
        delete = escape(&format!("{}/delete", url)),
    );

    layout(&book.title, &user, &content).into_response()
}

pub async fn new_page(user: SessionUser, State(state): State<AppState>) -> Response {
    book_form(&state, &user, None, &BookForm::default(), None).await
}

pub async fn create(
    user: SessionUser,
    State(state): State<AppState>,
    Form(values): Form<BookForm>,
) -> Response {
    match state.book_repo.create(values.to_input()).await {
        Ok(created) => {
            tracing::info!("{} created book {}", user.username, created.id);
            Redirect::to(&url_for(&created.id)).into_response()
        }
        Err(DomainError::Validation(errors)) => {
            book_form(&state, &user, None, &values, Some(&errors)).await
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn edit_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match load(&state, &id).await {
        Ok(book) => {
            let values = BookForm::from_book(&book);
            book_form(&state, &user, Some(book.id.as_str()), &values, None).await
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn update(
    user: SessionUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(values): Form<BookForm>,
) -> Response {
    let Some(book_id) = BookId::parse(&id) else {
        return error_page(&user, DomainError::NotFound);
    };
    match state.book_repo.update(&book_id, values.to_input()).await {
        Ok(updated) => Redirect::to(&url_for(&updated.id)).into_response(),
        Err(DomainError::Validation(errors)) => {
            let id = book_id.to_string();
            book_form(&state, &user, Some(id.as_str()), &values, Some(&errors)).await
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn delete_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match load(&state, &id).await {
        Ok(book) => {
            let url = url_for(&book.id);
            let content = confirm_delete(
                &format!("\"{}\"", book.title),
                &format!("{}/delete", url),
                &url,
            );
            layout("Delete book", &user, &content).into_response()
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn delete(
    user: SessionUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(book_id) = BookId::parse(&id) else {
        return error_page(&user, DomainError::NotFound);
    };
    match state.book_repo.delete(&book_id).await {
        Ok(()) => {
            tracing::info!("{} deleted book {}", user.username, book_id);
            Redirect::to("/books").into_response()
        }
        Err(e) => error_page(&user, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchecked_checkbox_means_not_disposed() {
        let values = BookForm {
            title: "Dune".to_string(),
            classification_detail: "933".to_string(),
            division: "01".to_string(),
            ..Default::default()
        };
        let input = values.to_input().clean().unwrap();
        assert!(!input.is_disposed);
        assert_eq!(input.author, None);
        assert_eq!(input.disposed_on, None);
    }

    #[test]
    fn test_checked_checkbox_with_date() {
        let values = BookForm {
            title: "Dune".to_string(),
            classification_detail: "933".to_string(),
            division: "01".to_string(),
            is_disposed: Some("on".to_string()),
            disposed_on: "2024-03-01".to_string(),
            ..Default::default()
        };
        let input = values.to_input().clean().unwrap();
        assert!(input.is_disposed);
        assert_eq!(input.disposed_on.as_deref(), Some("2024-03-01"));
    }
}
