//! Domain entities and invariants of the authorization engine.

#![forbid(unsafe_code)]

mod assignment;
mod field_restrictions;
mod permission;
pub mod policy_matrix;
mod resolved;
mod role;
mod security;

pub use assignment::{MembershipRecord, RoleAssignmentRecord};
pub use field_restrictions::{FieldRestrictions, MASKED_VALUE_PLACEHOLDER};
pub use permission::{FieldRestrictionMap, PermissionGrant, PermissionRecord};
pub use resolved::{PRIMARY_ROLE_PRIORITY, ResolvedRole, ResolvedRoleSet, select_primary_role};
pub use role::{
    CONSULTANT_ROLE, EMPLOYEE_ROLE, MANAGER_ROLE, Role, RoleKey, SUPER_ADMIN_ROLE,
    TENANT_ADMIN_ROLE, translate_membership_role,
};
pub use security::{Action, AuditAction, FieldVisibility, Resource};
