use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use librarium::api;
use librarium::auth::{create_jwt, decode_jwt, hash_password, verify_password};
use librarium::db;
use librarium::domain::{NewUser, UserUpdate};
use librarium::infrastructure::AppState;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app state with one admin and one regular user
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db);

    state
        .user_repo
        .create(NewUser {
            username: "admin".to_string(),
            password: "admin_password".to_string(),
            role: Some("admin".to_string()),
        })
        .await
        .expect("Failed to create admin");
    state
        .user_repo
        .create(NewUser {
            username: "clerk".to_string(),
            password: "clerk_password".to_string(),
            role: None,
        })
        .await
        .expect("Failed to create user");

    state
}

async fn post_json(app: &Router, uri: &str, token: Option<&str>, payload: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = builder
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    post_json(
        app,
        "/auth/login",
        None,
        json!({ "username": username, "password": password }),
    )
    .await
}

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let token = create_jwt(5, "test_user", "admin").expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "test_user");
    assert_eq!(claims.uid, 5);
    assert_eq!(claims.role, "admin");
}

#[tokio::test]
async fn test_login_flow() {
    let state = setup_test_state().await;
    let app = api::api_router(state);

    // Success
    let (status, json) = login(&app, "admin", "admin_password").await;
    assert_eq!(status, StatusCode::OK);
    let token = json["token"].as_str().expect("token in response");
    assert_eq!(json["user"]["username"], "admin");
    assert!(json["user"].get("password_hash").is_none());
    assert_eq!(decode_jwt(token).unwrap().role, "admin");

    // Wrong password and unknown user look the same
    let (status, _) = login(&app, "admin", "wrong_password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "nobody", "admin_password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Usernames are trimmed the same way they were on creation
    let (status, json) = login(&app, " clerk ", "clerk_password").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["username"], "clerk");
}

#[tokio::test]
async fn test_padded_username_can_log_in_as_registered() {
    let state = setup_test_state().await;
    let created = state
        .user_repo
        .create(NewUser {
            username: " alice".to_string(),
            password: "alice_password".to_string(),
            role: None,
        })
        .await
        .unwrap();
    assert_eq!(created.username, "alice");

    let app = api::api_router(state);
    let (status, _) = login(&app, " alice", "alice_password").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = login(&app, "alice", "alice_password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let state = setup_test_state().await;
    let clerk = state
        .user_repo
        .find_by_username("clerk")
        .await
        .unwrap()
        .unwrap();
    state
        .user_repo
        .update(
            clerk.id,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let app = api::api_router(state);
    let (status, _) = login(&app, "clerk", "clerk_password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_and_change_password() {
    let state = setup_test_state().await;
    let app = api::api_router(state);

    let (_, json) = login(&app, "clerk", "clerk_password").await;
    let token = json["token"].as_str().unwrap().to_string();

    let req = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong current password
    let (status, json) = post_json(
        &app,
        "/auth/password",
        Some(&token),
        json!({ "current_password": "nope", "new_password": "brand_new_password" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["current_password"].is_array());

    let (status, _) = post_json(
        &app,
        "/auth/password",
        Some(&token),
        json!({ "current_password": "clerk_password", "new_password": "brand_new_password" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "clerk", "clerk_password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "clerk", "brand_new_password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_manages_users() {
    let state = setup_test_state().await;
    let app = api::api_router(state);

    let (_, json) = login(&app, "admin", "admin_password").await;
    let token = json["token"].as_str().unwrap().to_string();
    let admin_id = json["user"]["id"].as_i64().unwrap();

    let (status, json) = post_json(
        &app,
        "/users",
        Some(&token),
        json!({ "username": "reader", "password": "reader_password" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["user"]["role"], "user");

    // Taken username
    let (status, json) = post_json(
        &app,
        "/users",
        Some(&token),
        json!({ "username": "reader", "password": "reader_password" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["username"].is_array());

    // An admin cannot delete themselves
    let req = Request::builder()
        .uri(format!("/users/{}", admin_id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let req = Request::builder()
        .uri("/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 3);
}

#[tokio::test]
async fn test_demoted_admin_token_loses_admin_rights() {
    let state = setup_test_state().await;
    let bob = state
        .user_repo
        .create(NewUser {
            username: "bob".to_string(),
            password: "bob_password".to_string(),
            role: Some("admin".to_string()),
        })
        .await
        .unwrap();
    let app = api::api_router(state.clone());

    let (_, json) = login(&app, "bob", "bob_password").await;
    let token = json["token"].as_str().unwrap().to_string();

    let list_users = |token: String| {
        Request::builder()
            .uri("/users")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };
    let response = app.clone().oneshot(list_users(token.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    state
        .user_repo
        .update(
            bob.id,
            UserUpdate {
                role: Some("user".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The token still says admin, the account no longer is
    assert_eq!(decode_jwt(&token).unwrap().role, "admin");
    let response = app.clone().oneshot(list_users(token.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        &app,
        "/users",
        Some(&token),
        json!({ "username": "mallory", "password": "mallory_password" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A deleted admin's token is refused as well
    let ghost = create_jwt(9999, "ghost", "admin").unwrap();
    let response = app.oneshot(list_users(ghost)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
