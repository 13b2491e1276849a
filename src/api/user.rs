//! User administration. Every handler here is admin only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::auth::Claims;
use crate::domain::{DomainError, NewUser, User, UserUpdate};
use crate::infrastructure::AppState;

/// The token's role is only a first filter: the caller must still be an
/// active admin in the database.
async fn require_active_admin(state: &AppState, claims: &Claims) -> Result<User, DomainError> {
    claims.require_admin()?;
    match state.user_repo.find_by_id(claims.uid).await? {
        Some(user) if user.is_active && user.is_admin() => Ok(user),
        _ => {
            tracing::warn!(
                "Token for {} carries admin rights the account no longer has",
                claims.sub
            );
            Err(DomainError::Forbidden)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    claims: Claims,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DomainError> {
    require_active_admin(&state, &claims).await?;
    let users = state.user_repo.find_all().await?;
    let total = users.len();

    Ok(Json(json!({ "users": users, "total": total })))
}

#[utoipa::path(
    post,
    path = "/api/users",
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Invalid fields or taken username")
    )
)]
pub async fn create_user(
    claims: Claims,
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, DomainError> {
    require_active_admin(&state, &claims).await?;
    let user = state.user_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "user": user })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    require_active_admin(&state, &claims).await?;
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(json!({ "user": user })))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    require_active_admin(&state, &claims).await?;
    if id == claims.uid && (payload.is_active == Some(false) || payload.role.as_deref() == Some("user")) {
        return Err(DomainError::Conflict(
            "You cannot demote or deactivate your own account.".to_string(),
        ));
    }
    let user = state.user_repo.update(id, payload).await?;

    Ok(Json(json!({ "user": user })))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Admins cannot delete themselves")
    )
)]
pub async fn delete_user(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    require_active_admin(&state, &claims).await?;
    if id == claims.uid {
        return Err(DomainError::Conflict(
            "You cannot delete your own account.".to_string(),
        ));
    }
    state.user_repo.delete(id).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}
