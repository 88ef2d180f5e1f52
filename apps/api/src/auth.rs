use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use custos_core::{AppError, UserIdentity};
use subtle::ConstantTimeEq;
use tower_sessions::Session;
use tracing::info;

use crate::dto::BootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;


pub const SESSION_USER_KEY: &str = "user_identity";

/// Writes a known subject into the session; local development only.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    let Some(expected_token) = state.bootstrap_token.as_deref() else {
        return Err(AppError::NotFound("bootstrap login is disabled".to_owned()).into());
    };

    if !tokens_match(expected_token, payload.token.as_str()) {
        return Err(AppError::AuthRequired("invalid bootstrap token".to_owned()).into());
    }

    let subject = payload.subject.trim();
    if subject.is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_owned()).into());
    }

    let display_name = payload
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(subject);
    let identity = UserIdentity::new(subject, display_name, payload.email);

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(subject = identity.subject(), "bootstrap session opened");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Constant-time comparison of the configured and provided tokens.
fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
