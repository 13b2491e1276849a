use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
};
use serde_json::json;

use crate::domain::DomainError;

/// Name of the cookie holding the web UI session token
pub const SESSION_COOKIE: &str = "librarium_session";

/// Lifetime of issued tokens, API and web session alike
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub uid: i32,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Rejects non-admin callers with `Forbidden`.
    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!("User {} attempted an admin-only action", self.sub);
            Err(DomainError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing Authorization header" })),
            ))?;

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid Authorization header format" })),
            ));
        };

        decode_jwt(token).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid or expired token" })),
            )
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn get_jwt_secret() -> Result<String, String> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ if cfg!(debug_assertions) => Ok("secret".to_string()),
        _ => Err("JWT_SECRET environment variable must be set in production".to_string()),
    }
}

/// Fails early at startup instead of on the first login.
pub fn ensure_jwt_secret() -> Result<(), String> {
    get_jwt_secret().map(|_| ())
}

pub fn create_jwt(user_id: i32, username: &str, role: &str) -> Result<String, String> {
    let secret = get_jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| "token expiry out of range".to_string())?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret()?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = create_jwt(7, "reader", "user").expect("Failed to create token");
        let mut tampered = token.clone();
        tampered.push('x');

        assert!(decode_jwt(&token).is_ok());
        assert!(decode_jwt(&tampered).is_err());
    }

    #[test]
    fn test_claims_carry_user_id_and_role() {
        let token = create_jwt(42, "chief", "admin").unwrap();
        let claims = decode_jwt(&token).unwrap();
        assert_eq!(claims.uid, 42);
        assert!(claims.is_admin());
        assert!(claims.require_admin().is_ok());

        let token = create_jwt(43, "clerk", "user").unwrap();
        let claims = decode_jwt(&token).unwrap();
        assert!(matches!(
            claims.require_admin(),
            Err(DomainError::Forbidden)
        ));
    }
}
