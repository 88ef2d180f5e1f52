use chrono::{DateTime, Utc};
use custos_core::OrganizationId;
use serde::{Deserialize, Serialize};

use crate::RoleKey;

/// Structured role assignment joined to its role, as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentRecord {
    /// Assigned role key.
    pub role_key: RoleKey,
    /// Assigned role name.
    pub role_name: String,
    /// Tenant scope of the assignment.
    pub company_id: Option<OrganizationId>,
    /// Sub-scope inside the tenant.
    pub location_id: Option<String>,
    /// Assignment stops contributing after this instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Jurisdiction of the role.
    pub country_code: Option<String>,
    /// Active flag of the assignment row.
    pub is_active: bool,
    /// Active flag of the owning role.
    pub role_is_active: bool,
}

impl RoleAssignmentRecord {
    /// Returns whether the assignment contributes to resolution at `now`.
    ///
    /// Both the assignment and its role must be active, and an expiry, when
    /// set, must lie strictly in the future.
    #[must_use]
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.role_is_active
            && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Legacy organization membership used when no structured assignment exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Organization the principal belongs to.
    pub organization_id: OrganizationId,
    /// Legacy role value, e.g. `consultant` or `firma_admin`.
    pub role: String,
    /// Inactive memberships are ignored.
    pub is_active: bool,
}
