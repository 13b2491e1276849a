use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use librarium::auth::{SESSION_COOKIE, create_jwt};
use librarium::db;
use librarium::domain::{
    BookFilter, ClassificationDetailInput, ClassificationInput, DivisionInput, NewUser,
};
use librarium::infrastructure::AppState;
use librarium::web;
use tower::util::ServiceExt; // for `oneshot`

async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

fn session() -> String {
    let token = create_jwt(1, "librarian", "user").expect("Failed to create token");
    format!("{}={}", SESSION_COOKIE, token)
}

async fn get(app: &Router, uri: &str) -> Response {
    let req = Request::builder()
        .uri(uri)
        .header(header::COOKIE, session())
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
    let req = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::COOKIE, session())
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_pages_require_a_session() {
    let app = web::web_router(setup_test_state().await);

    let req = Request::builder()
        .uri("/books?division=01")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fbooks%3Fdivision%3D01");

    // The login page itself is public
    let req = Request::builder()
        .uri("/login")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let state = setup_test_state().await;
    state
        .user_repo
        .create(NewUser {
            username: "librarian".to_string(),
            password: "shelf_password".to_string(),
            role: None,
        })
        .await
        .unwrap();
    let app = web::web_router(state);

    let req = Request::builder()
        .uri("/login")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "username=librarian&password=wrong_password&next=%2Fbooks",
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("correct username and password"));

    let req = Request::builder()
        .uri("/login")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "username=librarian&password=shelf_password&next=%2Fbooks",
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("librarium_session="));
    assert!(cookie.contains("HttpOnly"));

    let req = Request::builder()
        .uri("/logout")
        .method("POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_classification_form_flow() {
    let app = web::web_router(setup_test_state().await);

    let response = get(&app, "/classifications/new").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Invalid input re-renders the form with messages
    let response = post_form(&app, "/classifications/new", "code=12&name=").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("errorlist"));
    assert!(html.contains("Must be exactly 3 characters."));
    assert!(html.contains(r#"value="12""#));

    let response = post_form(&app, "/classifications/new", "code=abc&name=Literature").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/classifications/ABC");

    let response = post_form(&app, "/classifications/ABC/edit", "code=ABC&name=Fiction").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = get(&app, "/classifications/ABC").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Fiction"));

    let response = get(&app, "/classifications/ABC/delete").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post_form(&app, "/classifications/ABC/delete", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/classifications");

    let response = get(&app, "/classifications/ABC").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_output_is_escaped() {
    let state = setup_test_state().await;
    state
        .division_repo
        .create(DivisionInput {
            code: "01".to_string(),
            name: "<script>alert(1)</script>".to_string(),
        })
        .await
        .unwrap();
    let app = web::web_router(state);

    let html = body_text(get(&app, "/divisions").await).await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_restricted_delete_renders_conflict() {
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
    let app = web::web_router(state.clone());

    let response = post_form(&app, "/classifications/900/delete", "").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("still refer to it"));
    assert!(
        state
            .classification_repo
            .find_by_code("900")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_book_pages() {
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
    let app = web::web_router(state.clone());

    // Missing references are reported on the form
    let response = post_form(&app, "/books/new", "title=Emma&classification_detail=&division=01").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = post_form(
        &app,
        "/books/new",
        "title=Emma&author=Jane+Austen&classification_detail=933&division=01&disposed_on=&published_on=1815-12-23",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let book_url = location(&response).to_string();
    assert!(book_url.starts_with("/books/"));
    assert_eq!(book_url.len(), "/books/".len() + 26);

    let html = body_text(get(&app, &book_url).await).await;
    assert!(html.contains("Jane Austen"));
    assert!(html.contains("English fiction"));
    assert!(html.contains("1815-12-23"));

    // Checking the box marks the book as disposed
    let response = post_form(
        &app,
        &format!("{}/edit", book_url),
        "title=Emma&classification_detail=933&division=01&is_disposed=on&disposed_on=2024-05-01",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let books = state.book_repo.find_all(BookFilter::default()).await.unwrap();
    assert!(books.items[0].is_disposed);

    let html = body_text(get(&app, "/books?classification=900").await).await;
    assert!(html.contains("Emma"));
    let html = body_text(get(&app, "/books?classification=400").await).await;
    assert!(html.contains("No books found."));

    let response = get(&app, "/books/not-a-ulid").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_form(&app, &format!("{}/delete", book_url), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let remaining = state.book_repo.find_all(BookFilter::default()).await.unwrap();
    assert_eq!(remaining.total, 0);
}

#[tokio::test]
async fn test_login_ignores_unsafe_next() {
    let state = setup_test_state().await;
    state
        .user_repo
        .create(NewUser {
            username: "librarian".to_string(),
            password: "shelf_password".to_string(),
            role: None,
        })
        .await
        .unwrap();
    let app = web::web_router(state);

    for next in [
        "%2Fbooks%0Ax",
        "%2F%5Cevil.example.com",
        "%2F%2Fevil.example.com",
        "https%3A%2F%2Fevil.example.com",
    ] {
        let req = Request::builder()
            .uri("/login")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username=librarian&password=shelf_password&next={}",
                next
            )))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "next={}", next);
        assert_eq!(location(&response), "/", "next={}", next);
    }

    // The login page does not echo an unsafe target into its form either
    let req = Request::builder()
        .uri("/login?next=%2F%5Cevil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"name="next" value="/""#));
    assert!(!html.contains("evil.example.com"));
}

#[tokio::test]
async fn test_list_pages_past_the_end() {
    let state = setup_test_state().await;
    state
        .division_repo
        .create(DivisionInput {
            code: "01".to_string(),
            name: "Reference".to_string(),
        })
        .await
        .unwrap();
    let app = web::web_router(state);

    let response = get(&app, "/divisions?page=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No divisions yet."));

    for uri in [
        "/divisions?page=18446744073709551615",
        "/classifications?page=368934881474191033",
        "/books?page=18446744073709551615",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}
