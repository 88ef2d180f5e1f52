use async_trait::async_trait;
use chrono::{DateTime, Utc};
use custos_core::{AppResult, OrganizationId};
use custos_domain::{PermissionRecord, Role, RoleKey};

/// Editable attributes of a non-system role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Human-readable name.
    pub role_name: String,
    /// Jurisdiction scope.
    pub country_code: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Informational rank.
    pub tier: i32,
}

/// Input payload for a structured role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// Principal receiving the role.
    pub subject: String,
    /// Assigned role.
    pub role_key: RoleKey,
    /// Tenant scope.
    pub company_id: Option<OrganizationId>,
    /// Sub-scope inside the tenant.
    pub location_id: Option<String>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input payload for revoking structured assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRoleInput {
    /// Principal losing the role.
    pub subject: String,
    /// Revoked role.
    pub role_key: RoleKey,
    /// Tenant scope of the assignment; `None` matches unscoped assignments.
    pub company_id: Option<OrganizationId>,
}

/// Write port for role, assignment and permission administration.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Lists every role ordered by tier.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds one role by key.
    async fn find_role(&self, role_key: &RoleKey) -> AppResult<Option<Role>>;

    /// Replaces the editable attributes of a role.
    async fn update_role(&self, role_key: &RoleKey, input: UpdateRoleInput) -> AppResult<Role>;

    /// Creates an active structured assignment.
    async fn assign_role(&self, input: AssignRoleInput) -> AppResult<()>;

    /// Deactivates matching assignments and returns how many changed.
    async fn revoke_role(&self, input: RevokeRoleInput) -> AppResult<u64>;

    /// Creates or replaces the permission record for its role, resource and action.
    ///
    /// Field restrictions cover the whole resource: the saved map replaces the
    /// restrictions of every other action the role holds on that resource.
    async fn save_permission(&self, record: PermissionRecord) -> AppResult<()>;
}
