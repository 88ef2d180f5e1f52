//! Application services and ports of the authorization engine.

#![forbid(unsafe_code)]

mod access_guard;
mod authorization_cache;
mod authorization_failure;
mod authorization_ports;
mod authorization_service;
mod field_restriction_resolver;
mod organization_scope;
mod permission_evaluator;
mod role_admin_service;
mod role_resolver;

#[cfg(test)]
mod test_support;

pub use access_guard::{AccessGuard, OrganizationAccess};
pub use authorization_cache::{AuthorizationCache, RoleSnapshot};
pub use authorization_ports::{
    AssignRoleInput, AuditEvent, AuditRepository, PolicySource, RevokeRoleInput,
    RoleAdminRepository, RoleSetCache, RoleSource, RoleStore, UpdateRoleInput,
};
pub use authorization_service::{
    ActionPermission, AuthorizationService, PermissionState, PrincipalAuthority,
};
pub use field_restriction_resolver::FieldRestrictionResolver;
pub use organization_scope::OrganizationScopeResolver;
pub use permission_evaluator::{PermissionEvaluator, StorePolicySource};
pub use role_admin_service::RoleAdminService;
pub use role_resolver::{AssignmentRoleSource, MembershipRoleSource, RoleResolver};
