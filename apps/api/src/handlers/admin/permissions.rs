use super::*;

pub async fn save_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SavePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let record = PermissionRecord::try_from(payload)?;
    state
        .role_admin_service
        .save_permission(&user, record.clone())
        .await?;

    if let Some(matrix) = &state.policy_matrix {
        matrix.apply(&record).await;
    }

    Ok(Json(record.into()))
}

pub async fn invalidate_authorization_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    payload: Option<Json<InvalidateAuthorizationRequest>>,
) -> ApiResult<StatusCode> {
    let Json(payload) = payload.unwrap_or_default();
    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|subject| !subject.is_empty());

    state.role_admin_service.invalidate(&user, subject).await?;
    Ok(StatusCode::NO_CONTENT)
}
