use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::session::SessionUser;
use super::templates::{
    PAGE_SIZE, confirm_delete, error_page, escape, form, layout, link_with_query, pager, render,
    select, text_input,
};
use crate::domain::{
    ClassificationDetail, ClassificationDetailFilter, ClassificationDetailInput, DomainError,
    Pagination, ValidationErrors,
};
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DetailPageQuery {
    pub classification: Option<String>,
    pub page: Option<u64>,
}

fn url_for(code: &str) -> String {
    format!("/classification-details/{}", urlencoding::encode(code))
}

async fn load(state: &AppState, code: &str) -> Result<ClassificationDetail, DomainError> {
    state
        .classification_detail_repo
        .find_by_code(code)
        .await?
        .ok_or(DomainError::NotFound)
}

/// `(code, "code name")` pairs for the classification dropdowns.
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

async fn detail_form(
    state: &AppState,
    user: &SessionUser,
    code: Option<&str>,
    input: &ClassificationDetailInput,
    errors: Option<&ValidationErrors>,
) -> Response {
    let options = match classification_options(state).await {
        Ok(options) => options,
        Err(e) => return error_page(user, e),
    };

    let (title, action, cancel, code_attrs, submit) = match code {
        None => (
            "New classification detail".to_string(),
            "/classification-details/new".to_string(),
            "/classification-details".to_string(),
            r#"maxlength="3" required autofocus"#,
            "Create",
        ),
        Some(code) => (
            format!("Edit classification detail {}", code),
            format!("{}/edit", url_for(code)),
            url_for(code),
            r#"maxlength="3" readonly"#,
            "Save",
        ),
    };

    let fields = format!(
        "{}{}{}",
        select(
            "Classification",
            "classification",
            &options,
            &input.classification,
            errors
        ),
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
    Query(query): Query<DetailPageQuery>,
) -> Response {
    let page = query.page.unwrap_or(0);
    let classification = query
        .classification
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_default();

    let found = match state
        .classification_detail_repo
        .find_all(ClassificationDetailFilter {
            classification: Some(classification.clone()).filter(|c| !c.is_empty()),
            pagination: Pagination {
                page: Some(page),
                limit: Some(PAGE_SIZE),
            },
        })
        .await
    {
        Ok(found) => found,
        Err(e) => return error_page(&user, e),
    };
    let options = match classification_options(&state).await {
        Ok(options) => options,
        Err(e) => return error_page(&user, e),
    };

    let mut content = format!(
        r#"<form method="get" action="/classification-details" class="filters">{}<p><button type="submit">Filter</button></p></form>
<p><a class="button" href="{}">New classification detail</a></p>"#,
        select("Classification", "classification", &options, &classification, None),
        escape(&link_with_query(
            "/classification-details/new",
            &[("classification", &classification)]
        )),
    );

    if found.items.is_empty() {
        content.push_str("<p>No classification details found.</p>");
    } else {
        content.push_str(
            "<table><thead><tr><th>Code</th><th>Name</th><th>Classification</th></tr></thead><tbody>",
        );
        for d in &found.items {
            content.push_str(&format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{} {}</td></tr>"#,
                escape(&url_for(&d.code)),
                escape(&d.code),
                escape(&d.name),
                escape(&d.classification.code),
                escape(&d.classification.name)
            ));
        }
        content.push_str("</tbody></table>");
    }
    content.push_str(&pager(
        "/classification-details",
        &[("classification", &classification)],
        page,
        found.total,
    ));

    layout("Classification details", &user, &content).into_response()
}

pub async fn detail_page(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    let detail = match load(&state, &code).await {
        Ok(d) => d,
        Err(e) => return error_page(&user, e),
    };

    let url = url_for(&detail.code);
    let content = format!(
        r#"<dl>
<dt>Code</dt><dd>{code}</dd>
<dt>Name</dt><dd>{name}</dd>
<dt>Classification</dt><dd><a href="{class_url}">{class_code}</a> {class_name}</dd>
<dt>Created</dt><dd>{created}</dd>
<dt>Updated</dt><dd>{updated}</dd>
</dl>
<p><a class="button" href="{edit}">Edit</a> <a class="button danger" href="{delete}">Delete</a></p>"#,
        code = escape(&detail.code),
        name = escape(&detail.name),
        class_url = escape(&format!(
            "/classifications/{}",
            urlencoding::encode(&detail.classification.code)
        )),
        class_code = escape(&detail.classification.code),
        class_name = escape(&detail.classification.name),
        created = escape(&detail.created_at),
        updated = escape(&detail.updated_at),
        edit = escape(&format!("{}/edit", url)),
        delete = escape(&format!("{}/delete", url)),
    );

    let title = format!("Classification detail {}", detail.code);
    layout(&title, &user, &content).into_response()
}

pub async fn new_page(
    user: SessionUser,
    State(state): State<AppState>,
    Query(query): Query<DetailPageQuery>,
) -> Response {
    let input = ClassificationDetailInput {
        classification: query.classification.unwrap_or_default(),
        ..Default::default()
    };
    detail_form(&state, &user, None, &input, None).await
}

pub async fn create(
    user: SessionUser,
    State(state): State<AppState>,
    Form(input): Form<ClassificationDetailInput>,
) -> Response {
    match state.classification_detail_repo.create(input.clone()).await {
        Ok(created) => {
            tracing::info!(
                "{} created classification detail {}",
                user.username,
                created.code
            );
            Redirect::to(&url_for(&created.code)).into_response()
        }
        Err(DomainError::Validation(errors)) => {
            detail_form(&state, &user, None, &input, Some(&errors)).await
        }
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
            let input = ClassificationDetailInput {
                code: d.code.clone(),
                name: d.name,
                classification: d.classification.code,
            };
            detail_form(&state, &user, Some(d.code.as_str()), &input, None).await
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn update(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Form(mut input): Form<ClassificationDetailInput>,
) -> Response {
    match state
        .classification_detail_repo
        .update(&code, input.clone())
        .await
    {
        Ok(updated) => Redirect::to(&url_for(&updated.code)).into_response(),
        Err(DomainError::Validation(errors)) => {
            input.code = code.to_uppercase();
            detail_form(&state, &user, Some(input.code.as_str()), &input, Some(&errors)).await
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
                &format!("classification detail {} ({})", d.code, d.name),
                &format!("{}/delete", url),
                &url,
            );
            layout("Delete classification detail", &user, &content).into_response()
        }
        Err(e) => error_page(&user, e),
    }
}

pub async fn delete(
    user: SessionUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    match state.classification_detail_repo.delete(&code).await {
        Ok(()) => {
            tracing::info!("{} deleted classification detail {}", user.username, code);
            Redirect::to("/classification-details").into_response()
        }
        Err(e) => error_page(&user, e),
    }
}
