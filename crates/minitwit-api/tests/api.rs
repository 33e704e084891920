//! End-to-end checks of the HTTP surface against an in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use minitwit_api::{AppStateInner, router};
use minitwit_core::{PER_PAGE, SessionGate};
use minitwit_db::Database;

fn app() -> Router {
    app_with_db().0
}

/// Router plus a handle on its store, for checking side effects.
fn app_with_db() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let state = Arc::new(AppStateInner {
        db: db.clone(),
        sessions: SessionGate::new("test secret", chrono::Duration::hours(1)),
        per_page: PER_PAGE,
    });
    (router(state), db)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let location = resp
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, location, json)
}

async fn register(app: &Router, name: &str) {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({
            "username": name,
            "email": format!("{name}@example.com"),
            "password": "pw",
            "password2": "pw",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["redirect"], "/login");
}

async fn login(app: &Router, name: &str) -> String {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": name, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["flash"], "You were logged in");
    body["token"].as_str().unwrap().to_string()
}

fn texts(body: &Value) -> Vec<String> {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn anonymous_home_redirects_to_public() {
    let app = app();
    let (status, location, _) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/public"));
}

#[tokio::test]
async fn follow_post_and_timelines() {
    let app = app();
    register(&app, "alice").await;
    register(&app, "bob").await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    let (status, _, body) = send(&app, Method::GET, "/bob/follow", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flash"], "You are now following \"bob\"");
    assert_eq!(body["redirect"], "/bob");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/add_message",
        Some(&bob),
        Some(json!({ "text": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, home) = send(&app, Method::GET, "/", Some(&alice), None).await;
    assert_eq!(texts(&home), vec!["hi"]);
    assert_eq!(home["messages"][0]["author_username"], "bob");

    let (_, _, profile) = send(&app, Method::GET, "/bob", Some(&alice), None).await;
    assert_eq!(profile["profile"]["followed"], true);

    send(&app, Method::GET, "/bob/unfollow", Some(&alice), None).await;
    let (_, _, home) = send(&app, Method::GET, "/", Some(&alice), None).await;
    assert!(texts(&home).is_empty());

    let (_, _, public) = send(&app, Method::GET, "/public", None, None).await;
    assert_eq!(texts(&public), vec!["hi"]);
}

#[tokio::test]
async fn protected_actions_require_login() {
    let app = app();
    register(&app, "bob").await;

    let (status, _, body) = send(&app, Method::GET, "/bob/follow", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "You have to be logged in");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/add_message",
        None,
        Some(json!({ "text": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_and_login_errors() {
    let app = app();
    register(&app, "alice").await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice", "email": "a@x.com", "password": "pw", "password2": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "The username is already taken");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "carol", "email": "nope", "password": "pw", "password2": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You have to enter a valid email address");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid password");
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = app();
    register(&app, "alice").await;
    let token = login(&app, "alice").await;

    let (status, _, body) = send(&app, Method::GET, "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/public");

    let (status, location, _) = send(&app, Method::GET, "/", Some(&token), None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/public"));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = app();
    let (status, _, _) = send(&app, Method::GET, "/ghost", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_message_is_a_bad_request() {
    let app = app();
    register(&app, "alice").await;
    let token = login(&app, "alice").await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/add_message",
        Some(&token),
        Some(json!({ "text": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You have to enter a message");
}

#[tokio::test]
async fn logged_in_register_and_login_redirect_home() {
    let (app, db) = app_with_db();
    register(&app, "alice").await;
    let token = login(&app, "alice").await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/register",
        Some(&token),
        Some(json!({ "username": "mallory", "email": "m@x.com", "password": "pw", "password2": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "redirect": "/" }));
    assert_eq!(db.user_count().unwrap(), 1);
    assert!(db.find_user_by_name("mallory").unwrap().is_none());

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(&token),
        Some(json!({ "username": "alice", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "redirect": "/" }));
}

#[tokio::test]
async fn timeline_limit_query_caps_results() {
    let app = app();
    register(&app, "alice").await;
    let token = login(&app, "alice").await;

    for text in ["one", "two", "three"] {
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/add_message",
            Some(&token),
            Some(json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _, body) = send(&app, Method::GET, "/public?limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&body).len(), 2);

    let (_, _, body) = send(&app, Method::GET, "/alice?limit=1", None, None).await;
    assert_eq!(texts(&body).len(), 1);

    let (_, _, body) = send(&app, Method::GET, "/public", None, None).await;
    assert_eq!(texts(&body).len(), 3);
}

#[tokio::test]
async fn route_names_are_not_registrable() {
    let (app, db) = app_with_db();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "public", "email": "p@x.com", "password": "pw", "password2": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "That username is reserved");
    assert_eq!(db.user_count().unwrap(), 0);
}
