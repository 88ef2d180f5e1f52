use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// API representation of a role definition.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_key: String,
    pub role_name: String,
    pub country_code: Option<String>,
    pub is_system: bool,
    pub is_active: bool,
    pub tier: i32,
}

/// Incoming payload for editing a custom role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub role_name: String,
    pub country_code: Option<String>,
    pub is_active: bool,
    pub tier: i32,
}

/// Incoming payload for a structured role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub subject: String,
    pub role_key: String,
    /// Omitted for a global assignment.
    pub organization_id: Option<String>,
    pub location_id: Option<String>,
    /// RFC 3339 timestamp.
    pub expires_at: Option<String>,
}

/// Incoming payload for revoking role assignments in one scope.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/revoke-role-request.ts"
)]
pub struct RevokeRoleRequest {
    pub subject: String,
    pub role_key: String,
    pub organization_id: Option<String>,
}

/// Number of deactivated assignments.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/revocation-response.ts"
)]
pub struct RevocationResponse {
    pub revoked: u64,
}

/// Incoming payload for upserting a permission record.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/save-permission-request.ts"
)]
pub struct SavePermissionRequest {
    pub role_key: String,
    pub resource: String,
    pub action: String,
    pub is_active: bool,
    /// Field name to `visible`, `masked` or `hidden`.
    #[serde(default)]
    pub field_restrictions: BTreeMap<String, String>,
}

/// API representation of a permission record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub role_key: String,
    pub resource: String,
    pub action: String,
    pub is_active: bool,
    pub field_restrictions: BTreeMap<String, String>,
}

/// Incoming payload for cache invalidation; no subject invalidates everyone.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/invalidate-authorization-request.ts"
)]
pub struct InvalidateAuthorizationRequest {
    pub subject: Option<String>,
}
