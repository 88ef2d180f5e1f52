use async_trait::async_trait;
use custos_core::{AppResult, OrganizationId};
use custos_domain::{Action, MembershipRecord, PermissionGrant, Resource, RoleAssignmentRecord};

/// Read port over persisted roles, permissions and both assignment sources.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Lists active structured assignments of a principal joined to their role.
    ///
    /// Implementations filter inactive rows and past expiries; callers
    /// re-check both.
    async fn list_active_role_assignments(
        &self,
        subject: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>>;

    /// Lists active legacy memberships of a principal.
    async fn list_active_memberships(&self, subject: &str) -> AppResult<Vec<MembershipRecord>>;

    /// Lists active permissions for a resource, optionally narrowed to one action.
    ///
    /// Ordering is stable and defines the contribution order of field
    /// restrictions.
    async fn list_active_permissions(
        &self,
        resource: Resource,
        action: Option<Action>,
    ) -> AppResult<Vec<PermissionGrant>>;

    /// Lists every organization in the tenant directory.
    async fn list_all_organization_ids(&self) -> AppResult<Vec<OrganizationId>>;
}
