//! Shared helpers for the HTTP tests

#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::{TestResponse, TestServer};
use chirpy::{AppState, config::AppConfig, create_router, repositories::Repositories};
use serde_json::{Value, json};

pub const TOKEN_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234";

pub fn test_config(platform: &str) -> AppConfig {
    AppConfig {
        token_secret: TOKEN_SECRET.to_string(),
        polka_key: POLKA_KEY.to_string(),
        platform: platform.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/assets").to_string(),
        default_token_ttl_secs: 3600,
    }
}

/// Server over a fresh in-memory store
pub fn server_for(platform: &str) -> TestServer {
    let state = AppState::new(test_config(platform), Repositories::in_memory());
    TestServer::new(create_router(state)).unwrap()
}

pub fn server() -> TestServer {
    server_for("dev")
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

pub fn api_key(key: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("ApiKey {}", key)).unwrap(),
    )
}

pub async fn register(server: &TestServer, email: &str) -> Value {
    let response = server
        .post("/api/users")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn try_login(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/api/login")
        .json(&json!({ "email": email, "password": password }))
        .await
}

/// Log in and return the full user body including both tokens
pub async fn login(server: &TestServer, email: &str) -> Value {
    let response = try_login(server, email, PASSWORD).await;
    response.assert_status_ok();
    response.json::<Value>()
}

/// Register and log in; returns the login body
pub async fn signed_up(server: &TestServer, email: &str) -> Value {
    register(server, email).await;
    login(server, email).await
}

pub fn token(login: &Value) -> String {
    login["token"].as_str().unwrap().to_string()
}

pub fn refresh_token(login: &Value) -> String {
    login["refresh_token"].as_str().unwrap().to_string()
}

pub async fn post_chirp(server: &TestServer, token: &str, body: &str) -> TestResponse {
    let (name, value) = bearer(token);
    server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": body }))
        .await
}
