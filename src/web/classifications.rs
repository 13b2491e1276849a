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
use crate::domain::{
    Classification, ClassificationDetailFilter, ClassificationInput, DomainError, Pagination,
    ValidationErrors,
};
use crate::infrastructure::AppState;

fn url_for(code: &str) -> String {
    format!("/classifications/{}", urlencoding::encode(code))
}

fn form_fields(input: &ClassificationInput, errors: Option<&ValidationErrors>, editing: bool) -> String {
    let code_attrs = if editing {
        r#"maxlength="3" readonly"#
    } else {
        r#"maxlength="3" required autofocus"#
    };
    format!(
        "{}{}",
        text_input("Code", "code", &input.code, errors, code_attrs),
        text_input("Name", "name", &input.name, errors, r#"maxlength="100" required"#),
    )
}

async fn load(state: &AppState, code: &str) -> Result<Classification, DomainError> {
    state
        .classification_repo
        .find_by_code(code)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn list_page(
    user: SessionUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let page = query.page.unwrap_or(0);
    let result = state
        .classification_repo
        .find_all(Pagination {
            page: Some(page),
            limit: Some(PAGE_SIZE),
        })
        .await;

    let found = match result {
        Ok(found) => found,
        Err(e) => return error_page(&user, e),
    };

    let mut content = String::from(
        r#"<p><a class="button" href="/classifications/new">New classification</a></p>"#,
    );
    if found.items.is_empty() {
        content.push_str("<p>No classifications yet.</p>");
    } else {
        content.push_str("<table><thead><tr><th>Code</th><th>Name</th></tr></thead><tbody>");
        for c in &found.items {
            content.push_str(&format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td></tr>"#,
                escape(&url_for(&c.code)),
                escape(&c.code),
                escape(&c.name)
            ));
        }
        content.push_str("</tbody></table>");
    }
    content.push_str(&pager("/classifications", &[], page, found.total));

    layout("Classifications", &user, &content).into_response()
}

pub async fn detail_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    let classification = match load(&state, &code).await {
        Ok(c) => c,
        Err(e) => return error_page(&user, e),
    };
    let details = match state
        .classification_detail_repo
        .find_all(ClassificationDetailFilter {
            classification: Some(classification.code.clone()),
            ..Default::default()
        })
        .await
    {
        Ok(found) => found.items,
        Err(e) => return error_page(&user, e),
    };

    let url = url_for(&classification.code);
    let mut content = format!(
        r#"<dl>
<dt>Code</dt><dd>{code}</dd>
<dt>Name</dt><dd>{name}</dd>
<dt>Created</dt><dd>{created}</dd>
<dt>Updated</dt><dd>{updated}</dd>
</dl>
<p><a class="button" href="{edit}">Edit</a> <a class="button danger" href="{delete}">Delete</a> <a href="{books}">Books in this classification</a></p>
<h2>Classification details</h2>"#,
        code = escape(&classification.code),
        name = escape(&classification.name),
        created = escape(&classification.created_at),
        updated = escape(&classification.updated_at),
        edit = escape(&format!("{}/edit", url)),
        delete = escape(&format!("{}/delete", url)),
        books = escape(&link_with_query(
            "/books",
            &[("classification", &classification.code)]
        )),
    );

    if details.is_empty() {
        content.push_str("<p>None yet.</p>");
    } else {
        content.push_str("<ul>");
        for d in &details {
            content.push_str(&format!(
                r#"<li><a href="/classification-details/{}">{}</a> {}</li>"#,
                escape(&urlencoding::encode(&d.code)),
                escape(&d.code),
                escape(&d.name)
            ));
        }
        content.push_str("</ul>");
    }
    content.push_str(&format!(
        r#"<p><a href="{}">Add a detail</a></p>"#,
        escape(&link_with_query(
            "/classification-details/new",
            &[("classification", &classification.code)]
        ))
    ));

    let title = format!("Classification {}", classification.code);
    layout(&title, &user, &content).into_response()
}

fn new_form(user: &SessionUser, input: &ClassificationInput, errors: Option<&ValidationErrors>) -> Response {
    let content = form(
        "/classifications/new",
        &form_fields(input, errors, false),
        "Create",
        "/classifications",
    );
    let status = if errors.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    render(status, layout("New classification", user, &content))
}

pub async fn new_page(user: SessionUser) -> Response {
    new_form(&user, &ClassificationInput::default(), None)
}

pub async fn create(
    user: SessionUser,
    State(state): State<AppState>,
    Form(input): Form<ClassificationInput>,
) -> Response {
    match state.classification_repo.create(input.clone()).await {
        Ok(created) => {
            tracing::info!("{} created classification {}", user.username, created.code);
            Redirect::to(&url_for(&created.code)).into_response()
        }
        Err(DomainError::Validation(errors)) => new_form(&user, &input, Some(&errors)),
        Err(e) => error_page(&user, e),
    }
}

fn edit_form(
    user: &SessionUser,
    code: &str,
    input: &ClassificationInput,
    errors: Option<&ValidationErrors>,
) -> Response {
    let url = url_for(code);
    let content = form(
        &format!("{}/edit", url),
        &form_fields(input, errors, true),
        "Save",
        &url,
    );
    let status = if errors.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let title = format!("Edit classification {}", code);
    render(status, layout(&title, user, &content))
}

pub async fn edit_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match load(&state, &code).await {
        Ok(c) => {
            let input = ClassificationInput {
                code: c.code.clone(),
                name: c.name,
            };
            edit_form(&user, &c.code, &input, None)
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn update(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Form(mut input): Form<ClassificationInput>,
) -> Response {
    match state.classification_repo.update(&code, input.clone()).await {
        Ok(updated) => Redirect::to(&url_for(&updated.code)).into_response(),
        Err(DomainError::Validation(errors)) => {
            input.code = code.to_uppercase();
            edit_form(&user, &input.code, &input, Some(&errors))
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
        Ok(c) => {
            let url = url_for(&c.code);
            let content = confirm_delete(
                &format!("classification {} ({})", c.code, c.name),
                &format!("{}/delete", url),
                &url,
            );
            layout("Delete classification", &user, &content).into_response()
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn delete(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match state.classification_repo.delete(&code).await {
        Ok(()) => {
            tracing::info!("{} deleted classification {}", user.username, code);
            Redirect::to("/classifications").into_response()
        }
        Err(e) => error_page(&user, e),
    }
}
