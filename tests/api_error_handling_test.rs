use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use librarium::api;
use librarium::auth;
use librarium::db;
use librarium::domain::{ClassificationDetailInput, ClassificationInput, DivisionInput};
use librarium::infrastructure::AppState;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app state
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

// Helper to create a valid auth token
fn get_test_token() -> String {
    auth::create_jwt(1, "test_user", "user").expect("Failed to create token")
}

async fn setup_app() -> (Router, AppState) {
    let state = setup_test_state().await;
    state
        .classification_repo
        .create(ClassificationInput {
            code: "900".to_string(),
            name: "Literature".to_string(),
        })
        .await
        .unwrap();
    state
        .classification_detail_repo
        .create(ClassificationDetailInput {
            code: "933".to_string(),
            name: "English fiction".to_string(),
            classification: "900".to_string(),
        })
        .await
        .unwrap();
    state
        .division_repo
        .create(DivisionInput {
            code: "01".to_string(),
            name: "Main library".to_string(),
        })
        .await
        .unwrap();

    (api::api_router(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::AUTHORIZATION, format!("Bearer {}", get_test_token()));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app().await;

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["database"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _) = setup_app().await;

    let req = Request::builder()
        .uri("/classifications")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/books")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_book_not_found() {
    let (app, _) = setup_app().await;

    // Malformed id
    let response = send(&app, "GET", "/books/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Well-formed id that names nothing
    let response = send(&app, "GET", "/books/01ARZ3NDEKTSV4RRFFQ69G5FAV", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let payload = json!({
        "title": "Non-existent Book",
        "classification_detail": "933",
        "division": "01"
    });
    let response = send(&app, "PUT", "/books/01ARZ3NDEKTSV4RRFFQ69G5FAV", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", "/books/01ARZ3NDEKTSV4RRFFQ69G5FAV", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_book_invalid_json() {
    let (app, _) = setup_app().await;

    let req = Request::builder()
        .uri("/books")
        .method("POST")
        .header(header::AUTHORIZATION, format!("Bearer {}", get_test_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("invalid json"))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    // Axum's Json extractor returns 400 for malformed JSON
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_errors_name_fields() {
    let (app, _) = setup_app().await;

    let response = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": "", "isbn": "12345", "division": "77" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Validation failed");
    assert!(json["fields"]["title"].is_array());
    assert!(json["fields"]["isbn"].is_array());
    assert!(json["fields"]["classification_detail"].is_array());

    let response = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "Frankenstein",
            "published_on": "1818",
            "classification_detail": "933",
            "division": "01"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["published_on"].is_array());

    let response = send(
        &app,
        "POST",
        "/classifications",
        Some(json!({ "code": "9000", "name": "Too long a code" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["code"].is_array());
}

#[tokio::test]
async fn test_create_and_get_book() {
    let (app, _) = setup_app().await;

    let response = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "Frankenstein",
            "author": "Mary Shelley",
            "published_on": "1818-01-01",
            "classification_detail": "933",
            "division": "01"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["book"]["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 26);

    // Lower-case ids resolve to the same book
    let response = send(&app, "GET", &format!("/books/{}", id.to_lowercase()), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["book"]["title"], "Frankenstein");
    assert_eq!(json["book"]["published_on"], "1818-01-01");
    assert_eq!(json["book"]["classification_detail"]["code"], "933");
    assert_eq!(
        json["book"]["classification_detail"]["classification"]["name"],
        "Literature"
    );
    assert_eq!(json["book"]["division"]["code"], "01");
}

#[tokio::test]
async fn test_list_books_with_filters() {
    let (app, _) = setup_app().await;

    for i in 1..=3 {
        let response = send(
            &app,
            "POST",
            "/books",
            Some(json!({
                "title": format!("Book {}", i),
                "classification_detail": "933",
                "division": "01",
                "is_disposed": i == 3
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, "GET", "/books?limit=2&page=0", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["books"].as_array().unwrap().len(), 2);

    let response = send(&app, "GET", "/books?disposed=true", None).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["books"][0]["title"], "Book 3");

    let response = send(&app, "GET", "/books?classification=400", None).await;
    assert_eq!(body_json(response).await["total"], 0);
}

#[tokio::test]
async fn test_pagination_bounds() {
    let (app, _) = setup_app().await;

    // Past the end: empty page, total still reported
    let response = send(&app, "GET", "/classifications?page=5&limit=10", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["classifications"].as_array().unwrap().len(), 0);

    // Offsets that do not fit are treated the same way
    for uri in [
        "/classifications?page=1844674407370955161&limit=100",
        "/divisions?page=18446744073709551615&limit=18446744073709551615",
        "/classification-details?page=9223372036854775807&limit=2",
        "/books?page=18446744073709551615&limit=1000",
    ] {
        let response = send(&app, "GET", uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let json = body_json(response).await;
        assert_eq!(json["total"], if uri.starts_with("/books") { 0 } else { 1 });
    }

    // Oversized limits are clamped rather than rejected
    let response = send(&app, "GET", "/divisions?page=0&limit=18446744073709551615", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["divisions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_book_with_unknown_references() {
    let (app, _) = setup_app().await;

    let response = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "Dracula",
            "classification_detail": "933",
            "division": "01"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["book"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &app,
        "PUT",
        &format!("/books/{}", id),
        Some(json!({
            "title": "Dracula",
            "classification_detail": "999",
            "division": "77"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["classification_detail"].is_array());
    assert!(json["fields"]["division"].is_array());

    // The stored book is unchanged
    let response = send(&app, "GET", &format!("/books/{}", id), None).await;
    let json = body_json(response).await;
    assert_eq!(json["book"]["classification_detail"]["code"], "933");
    assert_eq!(json["book"]["division"]["code"], "01");
}

#[tokio::test]
async fn test_restricted_delete_is_conflict() {
    let (app, _) = setup_app().await;

    let response = send(&app, "DELETE", "/classifications/900", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_json(response).await["error"].is_string());

    // Still there
    let response = send(&app, "GET", "/classifications/900", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "DELETE", "/classifications/123", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_list_filter() {
    let (app, _) = setup_app().await;

    let response = send(&app, "GET", "/classification-details?classification=900", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["classification_details"][0]["classification"]["code"], "900");

    let response = send(&app, "GET", "/classification-details?classification=000", None).await;
    assert_eq!(body_json(response).await["total"], 0);
}

#[tokio::test]
async fn test_division_update_keeps_code() {
    let (app, _) = setup_app().await;

    let response = send(
        &app,
        "PUT",
        "/divisions/01",
        Some(json!({ "code": "99", "name": "Central library" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["division"]["code"], "01");
    assert_eq!(json["division"]["name"], "Central library");
}

#[tokio::test]
async fn test_user_admin_is_forbidden_for_users() {
    let (app, _) = setup_app().await;

    let response = send(&app, "GET", "/users", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "username": "intruder", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
