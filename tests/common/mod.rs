#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use coursecraft::auth::{issue_token, JwtConfig, Role};
use coursecraft::models::User;
use coursecraft::routes;
use coursecraft::state::AppState;
use coursecraft::store::MemoryCourseStore;

pub const TEST_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

pub fn jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

/// Router over a fresh in-memory store, plus a handle on that store.
pub fn build_test_app() -> (Router, Arc<MemoryCourseStore>) {
    let store = Arc::new(MemoryCourseStore::new());
    let state = AppState::new(store.clone(), jwt_config());
    (routes::app(state, 1024 * 1024), store)
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Register a user in the store and mint a token for them.
pub fn user(store: &MemoryCourseStore, name: &str, role: Role) -> TestUser {
    let id = Uuid::new_v4();
    store.add_user(User {
        id,
        name: name.to_string(),
        email: format!("{}@test.com", name.to_lowercase()),
        role: format!("{role:?}").to_lowercase(),
    });
    let token = issue_token(id, role, &jwt_config()).expect("token issuance should succeed");
    TestUser { id, token }
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
