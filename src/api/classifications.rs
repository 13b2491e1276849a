//! Classification API handlers using repository pattern

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::ListQuery;
use crate::auth::Claims;
use crate::domain::{ClassificationInput, DomainError};
use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/classifications",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page, used with limit"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 1000")
    ),
    responses(
        (status = 200, description = "Classifications ordered by code"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_classifications(
    _claims: Claims,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let result = state
        .classification_repo
        .find_all(query.pagination())
        .await?;

    Ok(Json(json!({
        "classifications": result.items,
        "total": result.total
    })))
}

#[utoipa::path(
    post,
    path = "/api/classifications",
    responses(
        (status = 201, description = "Classification created"),
        (status = 400, description = "Invalid fields or duplicate code")
    )
)]
pub async fn create_classification(
    _claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<ClassificationInput>,
) -> Result<impl IntoResponse, DomainError> {
    let classification = state.classification_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Classification created successfully",
            "classification": classification
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/classifications/{code}",
    params(("code" = String, Path, description = "3-character classification code")),
    responses(
        (status = 200, description = "Classification found"),
        (status = 404, description = "Classification not found")
    )
)]
pub async fn get_classification(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let classification = state
        .classification_repo
        .find_by_code(&code)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(json!({ "classification": classification })))
}

#[utoipa::path(
    put,
    path = "/api/classifications/{code}",
    params(("code" = String, Path, description = "3-character classification code")),
    responses(
        (status = 200, description = "Classification updated"),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Classification not found")
    )
)]
pub async fn update_classification(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<ClassificationInput>,
) -> Result<impl IntoResponse, DomainError> {
    let classification = state.classification_repo.update(&code, payload).await?;

    Ok(Json(json!({ "classification": classification })))
}

#[utoipa::path(
    delete,
    path = "/api/classifications/{code}",
    params(("code" = String, Path, description = "3-character classification code")),
    responses(
        (status = 200, description = "Classification deleted"),
        (status = 404, description = "Classification not found"),
        (status = 409, description = "Classification details still refer to it")
    )
)]
pub async fn delete_classification(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.classification_repo.delete(&code).await?;

    Ok(Json(json!({ "message": "Classification deleted" })))
}
