use std::sync::Arc;

use custos_core::AppResult;
use custos_domain::ResolvedRoleSet;
use tracing::debug;

use crate::authorization_failure::degraded;
use crate::{RoleSource, RoleStore};

mod sources;


pub use sources::{AssignmentRoleSource, MembershipRoleSource};

/// Computes the effective role set of a principal from ranked sources.
///
/// Sources are tried in order and the first non-empty result wins; later
/// sources are not consulted at all once an earlier one yields a tuple.
#[derive(Clone)]
pub struct RoleResolver {
    sources: Arc<[Arc<dyn RoleSource>]>,
}

impl RoleResolver {
    /// Creates a resolver over an explicit source ranking.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn RoleSource>>) -> Self {
        Self {
            sources: sources.into(),
        }
    }

    /// Creates the standard ranking: structured assignments, then legacy memberships.
    #[must_use]
    pub fn with_default_sources(store: Arc<dyn RoleStore>) -> Self {
        Self::new(vec![
            Arc::new(AssignmentRoleSource::new(store.clone())),
            Arc::new(MembershipRoleSource::new(store)),
        ])
    }

    /// Resolves the principal's roles.
    ///
    /// Store errors surface as [`custos_core::AppError::ResolutionFailure`] and are never
    /// downgraded to an empty set.
    pub async fn resolve(&self, subject: &str) -> AppResult<ResolvedRoleSet> {
        for source in self.sources.iter() {
            let roles = source
                .load_roles(subject)
                .await
                .map_err(|error| {
                    degraded(
                        format_args!("role source '{}' for subject '{subject}'", source.name()),
                        error,
                    )
                })?;

            if !roles.is_empty() {
                debug!(
                    subject,
                    source = source.name(),
                    role_count = roles.len(),
                    "resolved principal roles"
                );
                return Ok(ResolvedRoleSet::from_source(source.name(), roles));
            }
        }

        debug!(subject, "principal holds no roles");
        Ok(ResolvedRoleSet::empty())
    }
}
