//! Classification detail API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::domain::{
    ClassificationDetailFilter, ClassificationDetailInput, DomainError, Pagination,
};
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DetailListQuery {
    /// Only details under this classification code
    pub classification: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/classification-details",
    params(
        ("classification" = Option<String>, Query, description = "Parent classification code"),
        ("page" = Option<u64>, Query, description = "Zero-based page, used with limit"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 1000")
    ),
    responses((status = 200, description = "Classification details ordered by code"))
)]
pub async fn list_classification_details(
    _claims: Claims,
    State(state): State<AppState>,
    Query(query): Query<DetailListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let filter = ClassificationDetailFilter {
        classification: query.classification,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
        },
    };
    let result = state.classification_detail_repo.find_all(filter).await?;

    Ok(Json(json!({
        "classification_details": result.items,
        "total": result.total
    })))
}

#[utoipa::path(
    post,
    path = "/api/classification-details",
    responses(
        (status = 201, description = "Classification detail created"),
        (status = 400, description = "Invalid fields, duplicate code or unknown classification")
    )
)]
pub async fn create_classification_detail(
    _claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<ClassificationDetailInput>,
) -> Result<impl IntoResponse, DomainError> {
    let detail = state.classification_detail_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Classification detail created successfully",
            "classification_detail": detail
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/classification-details/{code}",
    params(("code" = String, Path, description = "3-character detail code")),
    responses(
        (status = 200, description = "Classification detail with its classification"),
        (status = 404, description = "Classification detail not found")
    )
)]
pub async fn get_classification_detail(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let detail = state
        .classification_detail_repo
        .find_by_code(&code)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(json!({ "classification_detail": detail })))
}

#[utoipa::path(
    put,
    path = "/api/classification-details/{code}",
    params(("code" = String, Path, description = "3-character detail code")),
    responses(
        (status = 200, description = "Classification detail updated"),
        (status = 400, description = "Invalid fields or unknown classification"),
        (status = 404, description = "Classification detail not found")
    )
)]
pub async fn update_classification_detail(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<ClassificationDetailInput>,
) -> Result<impl IntoResponse, DomainError> {
    let detail = state
        .classification_detail_repo
        .update(&code, payload)
        .await?;

    Ok(Json(json!({ "classification_detail": detail })))
}

#[utoipa::path(
    delete,
    path = "/api/classification-details/{code}",
    params(("code" = String, Path, description = "3-character detail code")),
    responses(
        (status = 200, description = "Classification detail deleted"),
        (status = 404, description = "Classification detail not found"),
        (status = 409, description = "Books still refer to it")
    )
)]
pub async fn delete_classification_detail(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.classification_detail_repo.delete(&code).await?;

    Ok(Json(json!({ "message": "Classification detail deleted" })))
}
