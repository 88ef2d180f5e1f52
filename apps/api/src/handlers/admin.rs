use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use custos_application::{AssignRoleInput, RevokeRoleInput};
use custos_core::UserIdentity;
use custos_domain::{PermissionRecord, RoleKey};

use crate::dto::{
    AssignRoleRequest, InvalidateAuthorizationRequest, PermissionResponse, RevocationResponse,
    RevokeRoleRequest, RoleResponse, SavePermissionRequest, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod assignments;
mod permissions;
mod roles;

pub use assignments::{assign_role_handler, revoke_role_handler};
pub use permissions::{invalidate_authorization_handler, save_permission_handler};
pub use roles::{list_roles_handler, update_role_handler};
