//! Division API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::ListQuery;
use crate::auth::Claims;
use crate::domain::{DivisionInput, DomainError};
use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/divisions",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page, used with limit"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 1000")
    ),
    responses((status = 200, description = "Divisions ordered by code"))
)]
pub async fn list_divisions(
    _claims: Claims,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, DomainError> {
    let result = state.division_repo.find_all(query.pagination()).await?;

    Ok(Json(json!({
        "divisions": result.items,
        "total": result.total
    })))
}

#[utoipa::path(
    post,
    path = "/api/divisions",
    responses(
        (status = 201, description = "Division created"),
        (status = 400, description = "Invalid fields or duplicate code")
    )
)]
pub async fn create_division(
    _claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<DivisionInput>,
) -> Result<impl IntoResponse, DomainError> {
    let division = state.division_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Division created successfully",
            "division": division
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/divisions/{code}",
    params(("code" = String, Path, description = "2-character division code")),
    responses(
        (status = 200, description = "Division found"),
        (status = 404, description = "Division not found")
    )
)]
pub async fn get_division(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let division = state
        .division_repo
        .find_by_code(&code)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(json!({ "division": division })))
}

#[utoipa::path(
    put,
    path = "/api/divisions/{code}",
    params(("code" = String, Path, description = "2-character division code")),
    responses(
        (status = 200, description = "Division updated"),
        (status = 404, description = "Division not found")
    )
)]
pub async fn update_division(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<DivisionInput>,
) -> Result<impl IntoResponse, DomainError> {
    let division = state.division_repo.update(&code, payload).await?;

    Ok(Json(json!({ "division": division })))
}

#[utoipa::path(
    delete,
    path = "/api/divisions/{code}",
    params(("code" = String, Path, description = "2-character division code")),
    responses(
        (status = 200, description = "Division deleted"),
        (status = 404, description = "Division not found"),
        (status = 409, description = "Books still refer to it")
    )
)]
pub async fn delete_division(
    _claims: Claims,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    state.division_repo.delete(&code).await?;

    Ok(Json(json!({ "message": "Division deleted" })))
}
