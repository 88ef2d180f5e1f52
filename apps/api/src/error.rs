use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use custos_core::AppError;
use serde::Serialize;
use tracing::warn;
use ts_rs::TS;

/// API error payload.
///
/// Clients branch on `code`; `message` is for humans only.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            AppError::OrgAccessDenied { .. }
            | AppError::InsufficientRole { .. }
            | AppError::AdminRequired(_)
            | AppError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            AppError::ResolutionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(code = self.0.code(), error = %self.0, "request failed");
        }

        let payload = Json(ErrorResponse {
            code: self.0.code().to_owned(),
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use custos_core::AppError;

    use super::ApiError;

    #[test]
    fn access_denials_and_degradation_map_to_distinct_statuses() {
        let cases = [
            (AppError::AuthRequired("no session".to_owned()), StatusCode::UNAUTHORIZED),
            (
                AppError::OrgAccessDenied {
                    organization_id: "org-1".to_owned(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::InsufficientRole {
                    organization_id: None,
                    required: vec!["firma_admin".to_owned()],
                    actual: Some("angajat".to_owned()),
                },
                StatusCode::FORBIDDEN,
            ),
            (AppError::AdminRequired("root only".to_owned()), StatusCode::FORBIDDEN),
            (
                AppError::ResolutionFailure("store offline".to_owned()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Configuration("missing role".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }
}
