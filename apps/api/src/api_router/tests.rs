use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use super::build_router;
use crate::api_services::build_memory_session_layer;
use crate::test_support::{
    BOOTSTRAP_TOKEN, FRONTEND_URL, body_json, request, seeded_state, send,
};

async fn router() -> Router {
    build_router(
        seeded_state().await,
        FRONTEND_URL,
        build_memory_session_layer(false),
    )
    .unwrap_or_else(|error| panic!("failed to build router: {error}"))
}

fn same_origin(mut request: Request<Body>) -> Request<Body> {
    request.headers_mut().insert(
        header::ORIGIN,
        FRONTEND_URL
            .parse()
            .unwrap_or_else(|error| panic!("invalid origin: {error}")),
    );
    request
}

fn json_request(method: &str, uri: &str, payload: serde_json::Value) -> Request<Body> {
    let mut request = same_origin(request(method, uri, Body::from(payload.to_string())));
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        "application/json"
            .parse()
            .unwrap_or_else(|error| panic!("invalid content type: {error}")),
    );
    request
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::COOKIE,
        cookie
            .parse()
            .unwrap_or_else(|error| panic!("invalid cookie: {error}")),
    );
    request
}

/// Opens a bootstrap session and returns its cookie.
async fn login(router: &Router, subject: &str) -> String {
    let response = send(
        router,
        json_request(
            "POST",
            "/auth/bootstrap",
            json!({ "subject": subject, "token": BOOTSTRAP_TOKEN }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
        .unwrap_or_else(|| panic!("bootstrap did not set a session cookie"))
}

async fn get_as(router: &Router, cookie: &str, uri: &str) -> axum::response::Response {
    send(router, with_cookie(request("GET", uri, Body::empty()), cookie)).await
}

#[tokio::test]
async fn health_is_public() {
    let router = router().await;

    let response = send(&router, request("GET", "/health", Body::empty())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let router = router().await;

    let response = send(
        &router,
        request("GET", "/api/authorization/me", Body::empty()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn bootstrap_rejects_a_wrong_token() {
    let router = router().await;

    let response = send(
        &router,
        json_request(
            "POST",
            "/auth/bootstrap",
            json!({ "subject": "mara", "token": "guess" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cross_origin_mutations_are_rejected() {
    let router = router().await;

    let mut request = request("POST", "/auth/logout", Body::empty());
    request.headers_mut().insert(
        header::ORIGIN,
        "https://evil.example"
            .parse()
            .unwrap_or_else(|error| panic!("invalid origin: {error}")),
    );

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_reports_assignment_roles_and_scope() {
    let router = router().await;
    let cookie = login(&router, "mara").await;

    let response = get_as(&router, &cookie, "/api/authorization/me").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["subject"], "mara");
    assert_eq!(body["source"], "role_assignments");
    assert_eq!(body["primary_role"], "manager");
    assert_eq!(body["organization_ids"], json!(["org-9"]));
    assert_eq!(body["is_super_admin"], false);
}

#[tokio::test]
async fn super_admin_scope_covers_every_organization() {
    let router = router().await;
    let cookie = login(&router, "root").await;

    let body = body_json(get_as(&router, &cookie, "/api/authorization/me").await).await;
    assert_eq!(body["primary_role"], "super_admin");
    assert_eq!(
        body["organization_ids"],
        json!(["org-1", "org-2", "org-3", "org-9"])
    );
}

#[tokio::test]
async fn permission_state_carries_field_restrictions() {
    let router = router().await;
    let cookie = login(&router, "mara").await;

    let response = get_as(&router, &cookie, "/api/authorization/permissions/medical").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["pending"], false);
    assert_eq!(body["field_restrictions"]["diagnosis"], "hidden");
    assert_eq!(body["fallback"], "visible");
    assert_eq!(
        body["actions"],
        json!([
            { "action": "create", "allowed": false },
            { "action": "read", "allowed": true },
            { "action": "update", "allowed": false },
            { "action": "delete", "allowed": false },
            { "action": "export", "allowed": false },
        ])
    );
}

#[tokio::test]
async fn snapshot_of_an_unloaded_principal_fails_closed() {
    let router = router().await;
    let cookie = login(&router, "dan").await;

    let response = get_as(
        &router,
        &cookie,
        "/api/authorization/permissions/employees?snapshot=true",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["pending"], true);
    assert_eq!(body["fallback"], "hidden");
    assert!(
        body["actions"]
            .as_array()
            .is_some_and(|actions| actions.iter().all(|action| action["allowed"] == false))
    );
}

#[tokio::test]
async fn unknown_resource_is_a_validation_error() {
    let router = router().await;
    let cookie = login(&router, "mara").await;

    let response = get_as(&router, &cookie, "/api/authorization/permissions/payroll").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn management_route_requires_consultant_or_tenant_admin() {
    let router = router().await;
    let cookie = login(&router, "mara").await;

    let access = get_as(&router, &cookie, "/api/organizations/org-9/access").await;
    assert_eq!(access.status(), StatusCode::OK);
    assert_eq!(body_json(access).await["primary_role"], "manager");

    let management = get_as(&router, &cookie, "/api/organizations/org-9/management").await;
    assert_eq!(management.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(management).await["code"], "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn reports_guard_checks_the_allow_list() {
    let router = router().await;

    let manager = login(&router, "mara").await;
    let response = get_as(&router, &manager, "/api/reports/access").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["roles"], json!(["manager"]));
    assert_eq!(body["can_export"], false);

    let employee = login(&router, "eva").await;
    let response = get_as(&router, &employee, "/api/reports/access").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn admin_routes_are_reserved_for_super_admins() {
    let router = router().await;

    let manager = login(&router, "mara").await;
    let response = get_as(&router, &manager, "/api/admin/roles").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "ADMIN_REQUIRED");

    let root = login(&router, "root").await;
    let response = get_as(&router, &root, "/api/admin/roles").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await[0]["role_key"], "super_admin");
}

#[tokio::test]
async fn saved_permissions_take_effect_on_the_next_check() {
    let router = router().await;
    let manager = login(&router, "mara").await;
    let root = login(&router, "root").await;
    let check = "/api/authorization/check?resource=employees&action=delete";

    let before = body_json(get_as(&router, &manager, check).await).await;
    assert_eq!(before["allowed"], false);

    let saved = send(
        &router,
        with_cookie(
            json_request(
                "PUT",
                "/api/admin/permissions",
                json!({
                    "role_key": "manager",
                    "resource": "employees",
                    "action": "delete",
                    "is_active": true,
                }),
            ),
            &root,
        ),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);

    let after = body_json(get_as(&router, &manager, check).await).await;
    assert_eq!(after["allowed"], true);
}

#[tokio::test]
async fn assignment_changes_are_visible_immediately() {
    let router = router().await;
    let employee = login(&router, "eva").await;
    let root = login(&router, "root").await;

    let before = body_json(get_as(&router, &employee, "/api/authorization/me").await).await;
    assert_eq!(before["primary_role"], "angajat");

    let assigned = send(
        &router,
        with_cookie(
            json_request(
                "POST",
                "/api/admin/role-assignments",
                json!({ "subject": "eva", "role_key": "manager", "organization_id": "org-9" }),
            ),
            &root,
        ),
    )
    .await;
    assert_eq!(assigned.status(), StatusCode::NO_CONTENT);

    let after = body_json(get_as(&router, &employee, "/api/authorization/me").await).await;
    assert_eq!(after["primary_role"], "manager");

    let revoked = send(
        &router,
        with_cookie(
            json_request(
                "POST",
                "/api/admin/role-revocations",
                json!({ "subject": "eva", "role_key": "manager", "organization_id": "org-9" }),
            ),
            &root,
        ),
    )
    .await;
    assert_eq!(revoked.status(), StatusCode::OK);
    assert_eq!(body_json(revoked).await["revoked"], 1);

    let restored = body_json(get_as(&router, &employee, "/api/authorization/me").await).await;
    assert_eq!(restored["primary_role"], "angajat");
}

#[tokio::test]
async fn invalidation_accepts_an_empty_body() {
    let router = router().await;
    let root = login(&router, "root").await;

    let mut request = same_origin(request(
        "POST",
        "/api/admin/authorization/invalidate",
        Body::empty(),
    ));
    request = with_cookie(request, &root);

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
