use std::fmt::{Display, Formatter};
use std::str::FromStr;

use custos_core::AppError;
use serde::{Deserialize, Serialize};

/// Protected data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Employee registry.
    Employees,
    /// Safety and fire-prevention trainings.
    Trainings,
    /// Occupational medicine records.
    Medical,
    /// Protective and fire equipment.
    Equipment,
    /// Uploaded compliance documents.
    Documents,
    /// Generated reports.
    Reports,
    /// Organization settings.
    Settings,
    /// Team and membership management.
    Team,
    /// Expiry and compliance alerts.
    Alerts,
    /// Audit trail.
    Audit,
}

impl Resource {
    /// Returns a stable storage value for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Trainings => "trainings",
            Self::Medical => "medical",
            Self::Equipment => "equipment",
            Self::Documents => "documents",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::Team => "team",
            Self::Alerts => "alerts",
            Self::Audit => "audit",
        }
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Employees,
            Resource::Trainings,
            Resource::Medical,
            Resource::Equipment,
            Resource::Documents,
            Resource::Reports,
            Resource::Settings,
            Resource::Team,
            Resource::Alerts,
            Resource::Audit,
        ];

        ALL
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource value '{value}'")))
    }
}

impl Display for Resource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Operations on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new records.
    Create,
    /// Read records.
    Read,
    /// Update records.
    Update,
    /// Delete records.
    Delete,
    /// Export records to files or reports.
    Export,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Export,
        ];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "export" => Ok(Self::Export),
            _ => Err(AppError::Validation(format!(
                "unknown action value '{value}'"
            ))),
        }
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Field-level exposure of a resource attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldVisibility {
    /// Value is shown as stored.
    Visible,
    /// Value is replaced by a placeholder.
    Masked,
    /// Field is removed entirely.
    Hidden,
}

impl FieldVisibility {
    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Masked => "masked",
            Self::Hidden => "hidden",
        }
    }
}

impl FromStr for FieldVisibility {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "visible" => Ok(Self::Visible),
            "masked" => Ok(Self::Masked),
            "hidden" => Ok(Self::Hidden),
            _ => Err(AppError::Validation(format!(
                "unknown field visibility value '{value}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by role administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role definition is edited.
    SecurityRoleUpdated,
    /// Emitted when a role is assigned to a principal.
    SecurityRoleAssigned,
    /// Emitted when a role assignment is revoked.
    SecurityRoleRevoked,
    /// Emitted when a permission record is created or replaced.
    SecurityPermissionSaved,
    /// Emitted when cached authority is invalidated by an operator.
    SecurityAuthorizationInvalidated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleUpdated => "security.role.updated",
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::SecurityRoleRevoked => "security.role.revoked",
            Self::SecurityPermissionSaved => "security.permission.saved",
            Self::SecurityAuthorizationInvalidated => "security.authorization.invalidated",
        }
    }
}
