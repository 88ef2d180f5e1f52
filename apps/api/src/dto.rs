mod admin;
mod authorization;
mod common;

pub use admin::{
    AssignRoleRequest, InvalidateAuthorizationRequest, PermissionResponse, RevocationResponse,
    RevokeRoleRequest, RoleResponse, SavePermissionRequest, UpdateRoleRequest,
};
pub use authorization::{
    ActionPermissionResponse, AuthorityResponse, OrganizationAccessResponse,
    PermissionCheckResponse, PermissionStateResponse, ReportsAccessResponse, ResolvedRoleResponse,
};
pub use common::{BootstrapRequest, HealthResponse};
