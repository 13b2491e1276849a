//! Cookie-backed sessions for the web UI.
//!
//! The cookie carries the same signed token the JSON API hands out, so a
//! session expires together with its token.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Uri, header, request::Parts},
    response::Redirect,
};

use crate::auth::{Claims, SESSION_COOKIE, TOKEN_TTL_HOURS, decode_jwt};

#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub role: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        SessionUser {
            id: claims.uid,
            username: claims.sub,
            role: claims.role,
        }
    }
}

/// Pulls a cookie value out of every `Cookie` header on the request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str) -> Result<HeaderValue, String> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        token,
        TOKEN_TTL_HOURS * 3600
    ))
    .map_err(|e| e.to_string())
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("librarium_session=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

/// Only same-site absolute paths are followed after login.
///
/// Browsers read `/\host` like `//host`, so backslashes are refused along
/// with anything that is not visible ASCII or not a bare path.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    if !path.starts_with('/') || path.starts_with("//") {
        return false;
    }
    if !path.bytes().all(|b| b.is_ascii_graphic() && b != b'\\') {
        return false;
    }
    match path.parse::<Uri>() {
        Ok(uri) => uri.scheme().is_none() && uri.authority().is_none(),
        Err(_) => false,
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = read_cookie(&parts.headers, SESSION_COOKIE)
            .and_then(|token| decode_jwt(&token).ok());

        match claims {
            Some(claims) => Ok(claims.into()),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                tracing::debug!("No valid session for {}, redirecting to login", next);
                Err(Redirect::to(&format!(
                    "/login?next={}",
                    urlencoding::encode(next)
                )))
            }
        }
    }
}
