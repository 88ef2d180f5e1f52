use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Action, FieldVisibility, Resource, RoleKey};

/// Field name to visibility level mapping carried by one permission record.
pub type FieldRestrictionMap = BTreeMap<String, FieldVisibility>;

/// Persisted permission grant owned by exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Owning role.
    pub role_key: RoleKey,
    /// Protected resource.
    pub resource: Resource,
    /// Granted action.
    pub action: Action,
    /// Inactive records grant nothing.
    pub is_active: bool,
    /// Per-field visibility for the resource.
    pub field_restrictions: FieldRestrictionMap,
}

/// Active permission projection listed for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    /// Owning role.
    pub role_key: RoleKey,
    /// Granted action.
    pub action: Action,
    /// Per-field visibility for the resource.
    pub field_restrictions: FieldRestrictionMap,
}

impl From<&PermissionRecord> for PermissionGrant {
    fn from(value: &PermissionRecord) -> Self {
        Self {
            role_key: value.role_key.clone(),
            action: value.action,
            field_restrictions: value.field_restrictions.clone(),
        }
    }
}
