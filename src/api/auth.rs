use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Claims, create_jwt};
use crate::domain::DomainError;
use crate::infrastructure::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Bearer token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, DomainError> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = state
        .user_repo
        .verify_credentials(&payload.username, &payload.password)
        .await?;
    let token =
        create_jwt(user.id, &user.username, &user.role).map_err(DomainError::Internal)?;

    tracing::info!("Token issued for user: {}", user.username);
    Ok((StatusCode::OK, Json(json!({ "token": token, "user": user }))))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user"),
        (status = 401, description = "Missing, invalid or stale token")
    )
)]
pub async fn get_me(
    claims: Claims,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DomainError> {
    // The account may have been removed or disabled after the token was issued
    let user = state
        .user_repo
        .find_by_id(claims.uid)
        .await?
        .filter(|u| u.is_active)
        .ok_or(DomainError::Unauthorized)?;

    Ok(Json(json!({ "user": user })))
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/password",
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password")
    )
)]
pub async fn change_password(
    claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, DomainError> {
    state
        .user_repo
        .change_password(claims.uid, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password changed" })))
}
