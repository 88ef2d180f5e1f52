use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use custos_core::UserIdentity;
use custos_domain::{Action, Resource};
use serde::Deserialize;

use crate::dto::{AuthorityResponse, PermissionCheckResponse, PermissionStateResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PermissionStateQuery {
    /// Evaluate against the cached snapshot without waiting for a load.
    #[serde(default)]
    pub snapshot: bool,
}

#[derive(Debug, Deserialize)]
pub struct PermissionCheckQuery {
    pub resource: String,
    pub action: String,
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<AuthorityResponse>> {
    let authority = state
        .authorization_service
        .authority(user.subject())
        .await?;

    Ok(Json(AuthorityResponse::new(&user, authority)))
}

pub async fn permission_state_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(resource): Path<String>,
    Query(query): Query<PermissionStateQuery>,
) -> ApiResult<Json<PermissionStateResponse>> {
    let resource = Resource::from_str(resource.as_str())?;
    let permissions = if query.snapshot {
        state
            .authorization_service
            .permission_state(user.subject(), resource)
            .await?
    } else {
        state
            .authorization_service
            .permissions(user.subject(), resource)
            .await?
    };

    Ok(Json(permissions.into()))
}

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<PermissionCheckQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let resource = Resource::from_str(query.resource.as_str())?;
    let action = Action::from_str(query.action.as_str())?;
    let allowed = state
        .authorization_service
        .can_perform(user.subject(), resource, action)
        .await?;

    Ok(Json(PermissionCheckResponse {
        resource: resource.as_str().to_owned(),
        action: action.as_str().to_owned(),
        allowed,
    }))
}
