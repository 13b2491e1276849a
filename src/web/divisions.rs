use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use super::PageQuery;
use super::session::SessionUser;
use super::templates::{
    PAGE_SIZE, confirm_delete, error_page, escape, form, layout, link_with_query, pager, render,
    text_input,
};
use crate::domain::{Division, DivisionInput, DomainError, Pagination, ValidationErrors};
use crate::infrastructure::AppState;

fn url_for(code: &str) -> String {
    format!("/divisions/{}", urlencoding::encode(code))
}

async fn load(state: &AppState, code: &str) -> Result<Division, DomainError> {
    state
        .division_repo
        .find_by_code(code)
        .await?
        .ok_or(DomainError::NotFound)
}

/// Shared by the new and edit screens; `code` is `None` when creating.
fn division_form(
    user: &SessionUser,
    code: Option<&str>,
    input: &DivisionInput,
    errors: Option<&ValidationErrors>,
) -> Response {
    let (title, action, cancel, code_attrs, submit) = match code {
        None => (
            "New division".to_string(),
            "/divisions/new".to_string(),
            "/divisions".to_string(),
            r#"maxlength="2" required autofocus"#,
            "Create",
        ),
        Some(code) => (
            format!("Edit division {}", code),
            format!("{}/edit", url_for(code)),
            url_for(code),
            r#"maxlength="2" readonly"#,
            "Save",
        ),
    };

    let fields = format!(
        "{}{}",
        text_input("Code", "code", &input.code, errors, code_attrs),
        text_input("Name", "name", &input.name, errors, r#"maxlength="100" required"#),
    );
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
    Query(query): Query<PageQuery>,
) -> Response {
    let page = query.page.unwrap_or(0);
    let found = match state
        .division_repo
        .find_all(Pagination {
            page: Some(page),
            limit: Some(PAGE_SIZE),
        })
        .await
    {
        Ok(found) => found,
        Err(e) => return error_page(&user, e),
    };

    let mut content =
        String::from(r#"<p><a class="button" href="/divisions/new">New division</a></p>"#);
    if found.items.is_empty() {
        content.push_str("<p>No divisions yet.</p>");
    } else {
        content.push_str("<table><thead><tr><th>Code</th><th>Name</th></tr></thead><tbody>");
        for d in &found.items {
            content.push_str(&format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td></tr>"#,
                escape(&url_for(&d.code)),
                escape(&d.code),
                escape(&d.name)
            ));
        }
        content.push_str("</tbody></table>");
    }
    content.push_str(&pager("/divisions", &[], page, found.total));

    layout("Divisions", &user, &content).into_response()
}

pub async fn detail_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    let division = match load(&state, &code).await {
        Ok(d) => d,
        Err(e) => return error_page(&user, e),
    };

    let url = url_for(&division.code);
    let content = format!(
        r#"<dl>
<dt>Code</dt><dd>{code}</dd>
<dt>Name</dt><dd>{name}</dd>
<dt>Created</dt><dd>{created}</dd>
<dt>Updated</dt><dd>{updated}</dd>
</dl>
<p><a class="button" href="{edit}">Edit</a> <a class="button danger" href="{delete}">Delete</a> <a href="{books}">Books held by this division</a></p>"#,
        code = escape(&division.code),
        name = escape(&division.name),
        created = escape(&division.created_at),
        updated = escape(&division.updated_at),
        edit = escape(&format!("{}/edit", url)),
        delete = escape(&format!("{}/delete", url)),
        books = escape(&link_with_query("/books", &[("division", &division.code)])),
    );

    let title = format!("Division {}", division.code);
    layout(&title, &user, &content).into_response()
}

pub async fn new_page(user: SessionUser) -> Response {
    division_form(&user, None, &DivisionInput::default(), None)
}

pub async fn create(
    user: SessionUser,
    State(state): State<AppState>,
    Form(input): Form<DivisionInput>,
) -> Response {
    match state.division_repo.create(input.clone()).await {
        Ok(created) => {
            tracing::info!("{} created division {}", user.username, created.code);
            Redirect::to(&url_for(&created.code)).into_response()
        }
        Err(DomainError::Validation(errors)) => division_form(&user, None, &input, Some(&errors)),
        Err(e) => error_page(&user, e),
    }
}

pub async fn edit_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match load(&state, &code).await {
        Ok(d) => {
            let input = DivisionInput {
                code: d.code.clone(),
                name: d.name,
            };
            division_form(&user, Some(d.code.as_str()), &input, None)
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn update(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Form(mut input): Form<DivisionInput>,
) -> Response {
    match state.division_repo.update(&code, input.clone()).await {
        Ok(updated) => Redirect::to(&url_for(&updated.code)).into_response(),
        Err(DomainError::Validation(errors)) => {
            input.code = code.to_uppercase();
            division_form(&user, Some(input.code.as_str()), &input, Some(&errors))
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn delete_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match load(&state, &code).await {
        Ok(d) => {
            let url = url_for(&d.code);
            let content = confirm_delete(
                &format!("division {} ({})", d.code, d.name),
                &format!("{}/delete", url),
                &url,
            );
            layout("Delete division", &user, &content).into_response()
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn delete(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match state.division_repo.delete(&code).await {
        Ok(()) => {
            tracing::info!("{} deleted division {}", user.username, code);
            Redirect::to("/divisions").into_response()
        }
        Err(e) => error_page(&user, e),
    }
}
