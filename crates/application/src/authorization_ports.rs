mod audit;
mod cache;
mod policy_source;
mod role_admin;
mod role_source;
mod role_store;

pub use audit::{AuditEvent, AuditRepository};
pub use cache::RoleSetCache;
pub use policy_source::PolicySource;
pub use role_admin::{AssignRoleInput, RevokeRoleInput, RoleAdminRepository, UpdateRoleInput};
pub use role_source::RoleSource;
pub use role_store::RoleStore;
