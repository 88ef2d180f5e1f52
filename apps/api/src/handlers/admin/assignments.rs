use super::*;

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .assign_role(&user, AssignRoleInput::try_from(payload)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RevokeRoleRequest>,
) -> ApiResult<Json<RevocationResponse>> {
    let revoked = state
        .role_admin_service
        .revoke_assignment(&user, RevokeRoleInput::try_from(payload)?)
        .await?;

    Ok(Json(RevocationResponse { revoked }))
}
