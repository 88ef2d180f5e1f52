use std::fmt::{Display, Formatter};

use custos_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Platform-wide administrator; bypasses every permission check.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";
/// Senior safety consultant serving several client organizations.
pub const CONSULTANT_ROLE: &str = "consultant_ssm";
/// Administrator of one client organization.
pub const TENANT_ADMIN_ROLE: &str = "firma_admin";
/// Line manager inside a client organization.
pub const MANAGER_ROLE: &str = "manager";
/// Base employee role.
pub const EMPLOYEE_ROLE: &str = "angajat";

/// Legacy membership role values that are renamed on translation.
const MEMBERSHIP_ROLE_TRANSLATIONS: &[(&str, &str)] = &[("consultant", CONSULTANT_ROLE)];

/// Globally unique symbolic role identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleKey(pub(crate) String);

impl RoleKey {
    /// Creates a validated role key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("role key must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the distinguished super-admin key.
    #[must_use]
    pub fn super_admin() -> Self {
        Self(SUPER_ADMIN_ROLE.to_owned())
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this is the super-admin key.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.0 == SUPER_ADMIN_ROLE
    }
}

impl Display for RoleKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl PartialEq<str> for RoleKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Maps a legacy membership role value onto a role key.
///
/// Values without a translation entry pass through unchanged.
pub fn translate_membership_role(value: &str) -> AppResult<RoleKey> {
    let value = value.trim();
    let translated = MEMBERSHIP_ROLE_TRANSLATIONS
        .iter()
        .find(|(legacy, _)| *legacy == value)
        .map_or(value, |(_, role_key)| *role_key);

    RoleKey::new(translated)
}

/// Persisted role definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique symbolic key.
    pub role_key: RoleKey,
    /// Human-readable name.
    pub role_name: String,
    /// Jurisdiction the role is scoped to, if any.
    pub country_code: Option<String>,
    /// Platform-defined roles are immutable.
    pub is_system: bool,
    /// Inactive roles contribute nothing to resolution.
    pub is_active: bool,
    /// Informational ordinal rank.
    pub tier: i32,
}

#[cfg(test)]
mod tests {
    use super::{CONSULTANT_ROLE, RoleKey, translate_membership_role};

    #[test]
    fn consultant_membership_is_translated() {
        let role_key = translate_membership_role("consultant");
        assert!(matches!(role_key, Ok(key) if key.as_str() == CONSULTANT_ROLE));
    }

    #[test]
    fn other_membership_values_pass_through() {
        for value in ["firma_admin", "angajat", "auditor_extern"] {
            let role_key = translate_membership_role(value);
            assert!(matches!(role_key, Ok(key) if key.as_str() == value));
        }
    }

    #[test]
    fn blank_role_key_is_rejected() {
        assert!(RoleKey::new("  ").is_err());
        assert!(translate_membership_role("").is_err());
    }

    #[test]
    fn super_admin_key_is_recognized() {
        assert!(RoleKey::super_admin().is_super_admin());
        assert!(
            !RoleKey::new("manager")
                .map(|key| key.is_super_admin())
                .unwrap_or(true)
        );
    }
}
