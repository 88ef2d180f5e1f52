use axum::Json;
use axum::extract::{Extension, State};
use custos_core::UserIdentity;
use custos_domain::{Action, ResolvedRoleSet, Resource};

use crate::dto::ReportsAccessResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn reports_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Extension(roles): Extension<ResolvedRoleSet>,
) -> ApiResult<Json<ReportsAccessResponse>> {
    let can_export = state
        .authorization_service
        .can_perform(user.subject(), Resource::Reports, Action::Export)
        .await?;

    Ok(Json(ReportsAccessResponse {
        subject: user.subject().to_owned(),
        primary_role: roles.primary_role().map(ToString::to_string),
        roles: roles
            .role_keys()
            .iter()
            .map(ToString::to_string)
            .collect(),
        can_export,
    }))
}
