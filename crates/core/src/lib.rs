//! Shared primitives for all Rust crates in Custos.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Custos crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Tenant (organization) identifier used to scope multi-tenant data access.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Creates a validated organization identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "organization id must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrganizationId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
///
/// Every variant maps to a stable machine-readable code, see [`AppError::code`].
/// Clients branch on the code and never on the message text.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request carries no authenticated principal.
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// The principal holds no membership in the target organization.
    #[error("access to organization '{organization_id}' denied")]
    OrgAccessDenied {
        /// Target organization.
        organization_id: String,
    },

    /// The principal holds a role, but not one of the required roles.
    #[error(
        "insufficient role: required one of [{}], actual '{}'",
        .required.join(", "),
        .actual.as_deref().unwrap_or("none")
    )]
    InsufficientRole {
        /// Organization the check ran against, if any.
        organization_id: Option<String>,
        /// Accepted role keys.
        required: Vec<String>,
        /// Role the principal actually holds.
        actual: Option<String>,
    },

    /// The operation is reserved for super-admins.
    #[error("super-admin role required: {0}")]
    AdminRequired(String),

    /// No resolved role grants the action on the resource.
    #[error("permission denied: '{action}' on '{resource}'")]
    PermissionDenied {
        /// Protected resource.
        resource: String,
        /// Attempted action.
        action: String,
    },

    /// Role resolution failed in the underlying store.
    #[error("authorization resolution failure: {0}")]
    ResolutionFailure(String),

    /// Persisted role or permission records are malformed.
    #[error("authorization configuration error: {0}")]
    Configuration(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::AuthRequired(_) => "AUTH_REQUIRED",
            Self::OrgAccessDenied { .. } => "ORG_ACCESS_DENIED",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::AdminRequired(_) => "ADMIN_REQUIRED",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::ResolutionFailure(_) => "RESOLUTION_FAILURE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether the error is an access decision rather than a system fault.
    #[must_use]
    pub fn is_access_denial(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired(_)
                | Self::OrgAccessDenied { .. }
                | Self::InsufficientRole { .. }
                | Self::AdminRequired(_)
                | Self::PermissionDenied { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, OrganizationId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn organization_id_is_trimmed_and_serialized_transparently() {
        let organization_id = OrganizationId::new(" org-1 ");
        assert!(organization_id.is_ok());

        let organization_id =
            organization_id.unwrap_or_else(|_| OrganizationId("unreachable".to_owned()));
        assert_eq!(organization_id.as_str(), "org-1");
        assert_eq!(
            serde_json::to_string(&organization_id).unwrap_or_default(),
            "\"org-1\""
        );
    }

    #[test]
    fn insufficient_role_message_carries_required_and_actual() {
        let error = AppError::InsufficientRole {
            organization_id: Some("org-1".to_owned()),
            required: vec!["firma_admin".to_owned(), "consultant_ssm".to_owned()],
            actual: Some("angajat".to_owned()),
        };

        assert_eq!(error.code(), "INSUFFICIENT_ROLE");
        assert_eq!(
            error.to_string(),
            "insufficient role: required one of [firma_admin, consultant_ssm], actual 'angajat'"
        );
        assert!(error.is_access_denial());
    }

    #[test]
    fn store_failures_are_not_access_denials() {
        let error = AppError::ResolutionFailure("connection reset".to_owned());
        assert_eq!(error.code(), "RESOLUTION_FAILURE");
        assert!(!error.is_access_denial());
    }
}
