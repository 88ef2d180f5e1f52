use custos_core::{AppError, AppResult, OrganizationId, UserIdentity};
use custos_domain::{ResolvedRole, ResolvedRoleSet, RoleKey, select_primary_role};
use tracing::debug;

use crate::AuthorizationService;

/// Outcome of a passed tenant-membership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationAccess {
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Tuples scoped to the organization; empty for global access.
    pub roles: Vec<ResolvedRole>,
    /// Primary role inside the organization, or `super_admin` for global access.
    pub primary_role: Option<RoleKey>,
    /// Whether access comes from the super-admin global scope.
    pub global: bool,
}

/// Composable request-boundary checks.
///
/// Each check either returns the resolved context or a rejection with a
/// stable error code; none of them downgrade a rejection.
#[derive(Clone)]
pub struct AccessGuard {
    authorization: AuthorizationService,
}

impl AccessGuard {
    /// Creates a guard over the authorization service.
    #[must_use]
    pub fn new(authorization: AuthorizationService) -> Self {
        Self { authorization }
    }

    /// Ensures a principal identity is present.
    pub fn authenticate(identity: Option<UserIdentity>) -> AppResult<UserIdentity> {
        identity.ok_or_else(|| rejected(None, AppError::AuthRequired("no active session".to_owned())))
    }

    /// Ensures the principal holds a role in the organization, optionally one
    /// of `required_roles`.
    ///
    /// Super-admins pass with global access. An empty required set means any
    /// role in the organization suffices.
    pub async fn require_organization_access(
        &self,
        subject: &str,
        organization_id: &OrganizationId,
        required_roles: Option<&[RoleKey]>,
    ) -> AppResult<OrganizationAccess> {
        let roles = self.authorization.resolve(subject).await?;

        if roles.is_super_admin() {
            return Ok(OrganizationAccess {
                organization_id: organization_id.clone(),
                roles: Vec::new(),
                primary_role: Some(RoleKey::super_admin()),
                global: true,
            });
        }

        let scoped: Vec<ResolvedRole> = roles.roles_in_organization(organization_id).cloned().collect();
        if scoped.is_empty() {
            return Err(rejected(
                Some(subject),
                AppError::OrgAccessDenied {
                    organization_id: organization_id.to_string(),
                },
            ));
        }

        let primary_role = select_primary_role(scoped.iter()).cloned();
        if let Some(required) = required_roles.filter(|required| !required.is_empty())
            && !scoped
                .iter()
                .any(|role| required.contains(&role.role_key))
        {
            return Err(rejected(
                Some(subject),
                AppError::InsufficientRole {
                    organization_id: Some(organization_id.to_string()),
                    required: role_names(required),
                    actual: primary_role.map(|role| role.to_string()),
                },
            ));
        }

        Ok(OrganizationAccess {
            organization_id: organization_id.clone(),
            roles: scoped,
            primary_role,
            global: false,
        })
    }

    /// Ensures the principal resolves to `super_admin`.
    pub async fn require_super_admin(&self, subject: &str) -> AppResult<ResolvedRoleSet> {
        let roles = self.authorization.resolve(subject).await?;
        if roles.is_super_admin() {
            return Ok(roles);
        }

        Err(rejected(
            Some(subject),
            AppError::AdminRequired(format!("subject '{subject}' is not a super administrator")),
        ))
    }

    /// Ensures the principal's role set intersects the allow-list.
    pub async fn require_any_role(
        &self,
        subject: &str,
        allowed: &[RoleKey],
    ) -> AppResult<ResolvedRoleSet> {
        let roles = self.authorization.resolve(subject).await?;
        if roles.intersects(allowed) {
            return Ok(roles);
        }

        Err(rejected(
            Some(subject),
            AppError::InsufficientRole {
                organization_id: None,
                required: role_names(allowed),
                actual: roles.primary_role().map(ToString::to_string),
            },
        ))
    }
}

fn role_names(roles: &[RoleKey]) -> Vec<String> {
    roles.iter().map(ToString::to_string).collect()
}

fn rejected(subject: Option<&str>, error: AppError) -> AppError {
    debug!(subject, code = error.code(), %error, "access guard rejected request");
    error
}
