//! Infrastructure adapters for the authorization ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_policy_matrix;
mod in_memory_role_set_cache;
mod in_memory_role_store;
mod postgres_audit_repository;
mod postgres_role_store;
mod redis_role_set_cache;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_policy_matrix::InMemoryPolicyMatrix;
pub use in_memory_role_set_cache::InMemoryRoleSetCache;
pub use in_memory_role_store::InMemoryRoleStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_role_store::PostgresRoleStore;
pub use redis_role_set_cache::RedisRoleSetCache;
