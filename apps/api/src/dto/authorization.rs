use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

mod conversions;

/// API representation of one resolved role tuple.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/resolved-role-response.ts"
)]
pub struct ResolvedRoleResponse {
    pub role_key: String,
    pub role_name: Option<String>,
    pub company_id: Option<String>,
    pub location_id: Option<String>,
    pub expires_at: Option<String>,
    pub country_code: Option<String>,
}

/// Resolved authority of the current principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/authority-response.ts"
)]
pub struct AuthorityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    /// Role source that produced the set, absent when no source matched.
    pub source: Option<String>,
    pub roles: Vec<ResolvedRoleResponse>,
    pub primary_role: Option<String>,
    pub is_super_admin: bool,
    pub organization_ids: Vec<String>,
}

/// One action evaluated for a resource.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/action-permission-response.ts"
)]
pub struct ActionPermissionResponse {
    pub action: String,
    pub allowed: bool,
}

/// Per-action booleans and field restrictions for a resource.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-state-response.ts"
)]
pub struct PermissionStateResponse {
    pub resource: String,
    /// The principal's authority was not settled; every action is denied.
    pub pending: bool,
    pub actions: Vec<ActionPermissionResponse>,
    pub field_restrictions: BTreeMap<String, String>,
    /// Level of fields absent from `field_restrictions`.
    pub fallback: String,
}

/// Outcome of a single permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub resource: String,
    pub action: String,
    pub allowed: bool,
}

/// Membership context of a passed tenant-membership check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/organization-access-response.ts"
)]
pub struct OrganizationAccessResponse {
    pub organization_id: String,
    pub global: bool,
    pub primary_role: Option<String>,
    pub roles: Vec<ResolvedRoleResponse>,
}

/// Report access context of a passed role guard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/reports-access-response.ts"
)]
pub struct ReportsAccessResponse {
    pub subject: String,
    pub primary_role: Option<String>,
    pub roles: Vec<String>,
    pub can_export: bool,
}
