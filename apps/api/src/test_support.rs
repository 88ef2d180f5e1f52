use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::Request;
use axum::response::Response;
use custos_core::UserIdentity;
use serde_json::Value;
use tower::ServiceExt;

use crate::api_config::ApiConfig;
use crate::api_services::build_app_state;
use crate::dev_seed;
use crate::state::AppState;

pub const BOOTSTRAP_TOKEN: &str = "local-dev-token";
pub const FRONTEND_URL: &str = "http://localhost:3000";

/// In-memory state holding the dev seed directory.
pub async fn seeded_state() -> AppState {
    let config = ApiConfig::from_lookup(false, |name| match name {
        "ROLE_STORE" => Some("memory".to_owned()),
        "AUTH_BOOTSTRAP_TOKEN" => Some(BOOTSTRAP_TOKEN.to_owned()),
        _ => None,
    })
    .unwrap_or_else(|error| panic!("test configuration rejected: {error}"));

    let built = build_app_state(None, &config)
        .await
        .unwrap_or_else(|error| panic!("failed to build state: {error}"));
    let Some(store) = built.memory_store.as_deref() else {
        panic!("memory store expected for ROLE_STORE=memory");
    };
    dev_seed::run(store)
        .await
        .unwrap_or_else(|error| panic!("dev seed failed: {error}"));

    built.app_state
}

pub fn identity(subject: &str) -> UserIdentity {
    UserIdentity::new(subject, subject, None)
}

pub fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap_or_else(|error| panic!("invalid test request: {error}"))
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {})
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|error| panic!("failed to read response body: {error}"));
    String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn body_json(response: Response) -> Value {
    let text = body_text(response).await;
    serde_json::from_str(text.as_str())
        .unwrap_or_else(|error| panic!("response is not JSON ({error}): {text}"))
}
