use std::collections::HashMap;

use axum::body::{Body, to_bytes};
use axum::extract::{FromRequestParts, Query, RawPathParams, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use custos_application::AccessGuard;
use custos_core::{AppError, OrganizationId, UserIdentity};
use custos_domain::RoleKey;
use serde_json::Value;
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;


/// Header carrying the target organization when the route has no path parameter.
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";
const ORGANIZATION_ID_FIELD: &str = "organization_id";
const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;

/// Roles accepted by a tenant-membership route group; empty accepts any role.
#[derive(Debug, Clone, Default)]
pub struct RequiredRoles(pub Vec<RoleKey>);

/// Allow-list of an RBAC route group.
#[derive(Debug, Clone)]
pub struct AllowedRoles(pub Vec<RoleKey>);

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;
    let identity = AccessGuard::authenticate(identity)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Tenant-membership check.
///
/// Attaches the resulting [`custos_application::OrganizationAccess`] to the
/// request for the handler.
pub async fn require_organization_access(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = authenticated(&request)?;
    let required = request
        .extensions()
        .get::<RequiredRoles>()
        .cloned()
        .unwrap_or_default();

    let (mut parts, body) = request.into_parts();
    let direct = first_present([
        path_organization_id(&mut parts, &state).await,
        query_organization_id(&parts),
        header_organization_id(&parts),
    ]);

    let (organization_id, body) = match direct {
        Some(organization_id) => (Some(organization_id), body),
        None if is_json(&parts) => {
            let bytes = to_bytes(body, MAX_BUFFERED_BODY_BYTES)
                .await
                .map_err(|error| {
                    AppError::Validation(format!("failed to read request body: {error}"))
                })?;
            (body_organization_id(&bytes), Body::from(bytes))
        }
        None => (None, body),
    };

    let organization_id = organization_id
        .ok_or_else(|| AppError::Validation("organization_id is required".to_owned()))
        .and_then(OrganizationId::new)?;

    let access = state
        .access_guard
        .require_organization_access(
            identity.subject(),
            &organization_id,
            Some(required.0.as_slice()),
        )
        .await?;

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(access);
    Ok(next.run(request).await)
}

pub async fn require_super_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = authenticated(&request)?;
    state
        .access_guard
        .require_super_admin(identity.subject())
        .await?;

    Ok(next.run(request).await)
}

/// RBAC role guard. Attaches the resolved role set to the request.
pub async fn require_roles(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = authenticated(&request)?;
    let allowed = request
        .extensions()
        .get::<AllowedRoles>()
        .cloned()
        .ok_or_else(|| AppError::Configuration("route group has no role allow-list".to_owned()))?;

    let roles = state
        .access_guard
        .require_any_role(identity.subject(), allowed.0.as_slice())
        .await?;

    request.extensions_mut().insert(roles);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::AuthRequired("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url.as_str();
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer == allowed_origin
            || referer
                .strip_prefix(allowed_origin)
                .is_some_and(|rest| rest.starts_with('/'));

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::AuthRequired("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn authenticated(request: &Request) -> ApiResult<UserIdentity> {
    Ok(AccessGuard::authenticate(
        request.extensions().get::<UserIdentity>().cloned(),
    )?)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Returns the first candidate holding a non-blank value.
fn first_present(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

async fn path_organization_id(parts: &mut Parts, state: &AppState) -> Option<String> {
    let params = RawPathParams::from_request_parts(parts, state).await.ok()?;
    params
        .iter()
        .find(|(name, _)| *name == ORGANIZATION_ID_FIELD)
        .map(|(_, value)| value.to_owned())
}

fn query_organization_id(parts: &Parts) -> Option<String> {
    let Query(mut query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).ok()?;
    query.remove(ORGANIZATION_ID_FIELD)
}

fn header_organization_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(ORGANIZATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn is_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn body_organization_id(bytes: &[u8]) -> Option<String> {
    let value = serde_json::from_slice::<Value>(bytes).ok()?;
    value
        .get(ORGANIZATION_ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned)
}
