use std::fmt::Display;

use custos_core::AppError;
use tracing::warn;

/// Re-tags a store error raised while evaluating authority.
///
/// Configuration and resolution failures keep their kind; anything else
/// becomes [`AppError::ResolutionFailure`] so callers can tell a denial
/// apart from a degraded authorization backend.
pub(crate) fn degraded(context: impl Display, error: AppError) -> AppError {
    warn!(code = error.code(), %error, "{context} failed");

    match error {
        AppError::Configuration(_) | AppError::ResolutionFailure(_) => error,
        other => AppError::ResolutionFailure(format!("{context} failed: {other}")),
    }
}
