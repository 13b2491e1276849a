//! Login, logout and the own-password screen.

use axum::{
    Form,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::session::{SessionUser, clear_session_cookie, safe_next, session_cookie};
use super::templates::{bare_layout, error_page, escape, form, layout, password_input, render};
use crate::auth::create_jwt;
use crate::domain::{DomainError, ValidationErrors};
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

fn login_form(username: &str, next: &str, failed: bool) -> Response {
    let mut content = String::new();
    if failed {
        content.push_str(
            r#"<p class="error">Please enter a correct username and password. Both fields may be case-sensitive.</p>"#,
        );
    }
    content.push_str(&format!(
        r#"<form method="post" action="/login">
<p><label for="id_username">Username</label><input type="text" id="id_username" name="username" value="{username}" maxlength="30" required autofocus></p>
<p><label for="id_password">Password</label><input type="password" id="id_password" name="password" required></p>
<input type="hidden" name="next" value="{next}">
<p><button type="submit">Log in</button></p>
</form>"#,
        username = escape(username),
        next = escape(next),
    ));
    bare_layout("Log in", &content).into_response()
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Response {
    login_form("", &safe_next(query.next.as_deref()), false)
}

pub async fn login(State(state): State<AppState>, Form(input): Form<LoginForm>) -> Response {
    let next = safe_next(input.next.as_deref());
    let user = match state
        .user_repo
        .verify_credentials(&input.username, &input.password)
        .await
    {
        Ok(user) => user,
        Err(DomainError::Unauthorized) => return login_form(&input.username, &next, true),
        Err(e) => {
            tracing::error!("Login failed unexpectedly: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let cookie = match create_jwt(user.id, &user.username, &user.role)
        .and_then(|token| session_cookie(&token))
    {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!("Could not issue session for {}: {}", user.username, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    tracing::info!("User {} logged in to the web UI", user.username);
    ([(header::SET_COOKIE, cookie)], Redirect::to(&next)).into_response()
}

pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn password_form(user: &SessionUser, errors: Option<&ValidationErrors>, done: bool) -> Response {
    let mut content = String::new();
    if done {
        content.push_str(r#"<p class="success">Your password was changed.</p>"#);
    }
    let fields = format!(
        "{}{}{}",
        password_input("Current password", "current_password", errors),
        password_input("New password", "new_password", errors),
        password_input("New password (again)", "confirm_password", errors),
    );
    content.push_str(&form("/account/password", &fields, "Change password", "/"));

    let status = if errors.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    render(status, layout("Change password", user, &content))
}

pub async fn password_page(user: SessionUser) -> Response {
    password_form(&user, None, false)
}

pub async fn change_password(
    user: SessionUser,
    State(state): State<AppState>,
    Form(input): Form<PasswordForm>,
) -> Response {
    if input.new_password != input.confirm_password {
        let errors = ValidationErrors::single("confirm_password", "The two passwords differ.");
        return password_form(&user, Some(&errors), false);
    }

    match state
        .user_repo
        .change_password(user.id, &input.current_password, &input.new_password)
        .await
    {
        Ok(()) => {
            tracing::info!("User {} changed their password", user.username);
            password_form(&user, None, true)
        }
        Err(DomainError::Validation(errors)) => password_form(&user, Some(&errors), false),
        Err(e) => error_page(&user, e),
    }
}
