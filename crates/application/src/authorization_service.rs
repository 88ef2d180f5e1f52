use std::collections::BTreeSet;
use std::sync::Arc;

use custos_core::{AppError, AppResult, OrganizationId};
use custos_domain::{Action, FieldRestrictions, ResolvedRoleSet, Resource, RoleKey};
use tracing::{debug, warn};

use crate::{
    AuthorizationCache, FieldRestrictionResolver, OrganizationScopeResolver, PermissionEvaluator,
    PolicySource, RoleResolver, RoleSnapshot, RoleStore,
};

#[cfg(test)]
mod tests;

/// Decision for one action on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPermission {
    /// Evaluated action.
    pub action: Action,
    /// Whether the principal may perform it.
    pub allowed: bool,
}

/// Per-resource permission view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionState {
    /// Evaluated resource.
    pub resource: Resource,
    /// True while authority is unsettled; every decision is then closed.
    pub pending: bool,
    /// One entry per action, in [`Action::all`] order.
    pub actions: Vec<ActionPermission>,
    /// Field visibility for the resource.
    pub field_restrictions: FieldRestrictions,
}

impl PermissionState {
    /// Denies every action and hides every field.
    #[must_use]
    pub fn fail_closed(resource: Resource) -> Self {
        Self {
            resource,
            pending: true,
            actions: Action::all()
                .iter()
                .map(|action| ActionPermission {
                    action: *action,
                    allowed: false,
                })
                .collect(),
            field_restrictions: FieldRestrictions::deny_all(),
        }
    }

    /// Returns whether the action is allowed.
    #[must_use]
    pub fn allows(&self, action: Action) -> bool {
        self.actions
            .iter()
            .any(|permission| permission.action == action && permission.allowed)
    }
}

/// Resolved authority of one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalAuthority {
    /// Resolved role tuples.
    pub roles: ResolvedRoleSet,
    /// Role used for routing and display.
    pub primary_role: Option<RoleKey>,
    /// Organizations the principal may operate within.
    pub organization_ids: BTreeSet<OrganizationId>,
}

/// Application service answering authorization questions per principal.
///
/// Every query resolves through the cache first; evaluators only ever see a
/// settled role set.
#[derive(Clone)]
pub struct AuthorizationService {
    resolver: RoleResolver,
    cache: AuthorizationCache,
    evaluator: PermissionEvaluator,
    field_resolver: FieldRestrictionResolver,
    scope_resolver: OrganizationScopeResolver,
}

impl AuthorizationService {
    /// Creates the service with the standard role-source ranking.
    #[must_use]
    pub fn new(
        store: Arc<dyn RoleStore>,
        policy: Arc<dyn PolicySource>,
        cache: AuthorizationCache,
    ) -> Self {
        Self {
            resolver: RoleResolver::with_default_sources(store.clone()),
            cache,
            evaluator: PermissionEvaluator::new(policy),
            field_resolver: FieldRestrictionResolver::new(store.clone()),
            scope_resolver: OrganizationScopeResolver::new(store),
        }
    }

    /// Replaces the role-source ranking.
    #[must_use]
    pub fn with_resolver(mut self, resolver: RoleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolves the principal's role set, from cache when possible.
    pub async fn resolve(&self, subject: &str) -> AppResult<ResolvedRoleSet> {
        self.cache.load(subject, &self.resolver).await
    }

    /// Returns the cached view without resolving.
    pub async fn snapshot(&self, subject: &str) -> AppResult<RoleSnapshot> {
        self.cache.snapshot(subject).await
    }

    /// Returns whether the principal may perform the action on the resource.
    ///
    /// Settles the role set first (cache hit or a fresh resolution), so this
    /// never answers from a pending load. Non-blocking presentation callers
    /// use [`Self::permission_state`], which fails closed while pending.
    pub async fn can_perform(
        &self,
        subject: &str,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        let roles = self.resolve(subject).await?;
        self.evaluator.can_perform(&roles, resource, action).await
    }

    /// Ensures the principal may perform the action on the resource.
    pub async fn require_permission(
        &self,
        subject: &str,
        resource: Resource,
        action: Action,
    ) -> AppResult<()> {
        if self.can_perform(subject, resource, action).await? {
            return Ok(());
        }

        let error = AppError::PermissionDenied {
            resource: resource.as_str().to_owned(),
            action: action.as_str().to_owned(),
        };
        debug!(subject, code = error.code(), %error, "permission check rejected");
        Err(error)
    }

    /// Returns the principal's merged field restrictions for the resource.
    ///
    /// Settles the role set first like [`Self::can_perform`]; the fail-closed
    /// pending view is [`Self::permission_state`].
    pub async fn field_restrictions(
        &self,
        subject: &str,
        resource: Resource,
    ) -> AppResult<FieldRestrictions> {
        let roles = self.resolve(subject).await?;
        self.field_resolver.restrictions(&roles, resource).await
    }

    /// Returns the organizations the principal may operate within.
    ///
    /// Settles the role set first; it never reports a pending state.
    pub async fn accessible_org_ids(&self, subject: &str) -> AppResult<BTreeSet<OrganizationId>> {
        let roles = self.resolve(subject).await?;
        self.scope_resolver.accessible_org_ids(&roles).await
    }

    /// Returns the principal's primary role.
    pub async fn primary_role(&self, subject: &str) -> AppResult<Option<RoleKey>> {
        let roles = self.resolve(subject).await?;
        Ok(roles.primary_role().cloned())
    }

    /// Resolves once and returns roles, primary role and organization scope.
    pub async fn authority(&self, subject: &str) -> AppResult<PrincipalAuthority> {
        let roles = self.resolve(subject).await?;
        let organization_ids = self.scope_resolver.accessible_org_ids(&roles).await?;

        Ok(PrincipalAuthority {
            primary_role: roles.primary_role().cloned(),
            organization_ids,
            roles,
        })
    }

    /// Resolves and evaluates every action plus field restrictions for the resource.
    pub async fn permissions(&self, subject: &str, resource: Resource) -> AppResult<PermissionState> {
        let roles = self.resolve(subject).await?;
        self.evaluate(&roles, resource).await
    }

    /// Non-blocking variant of [`Self::permissions`].
    ///
    /// While the principal's authority is pending or not yet loaded the state
    /// is fail-closed. An unloaded principal gets a background load so a
    /// later call can settle.
    pub async fn permission_state(
        &self,
        subject: &str,
        resource: Resource,
    ) -> AppResult<PermissionState> {
        match self.cache.snapshot(subject).await? {
            RoleSnapshot::Ready(roles) => self.evaluate(&roles, resource).await,
            RoleSnapshot::Pending => Ok(PermissionState::fail_closed(resource)),
            RoleSnapshot::Unloaded => {
                self.spawn_refresh(subject);
                Ok(PermissionState::fail_closed(resource))
            }
        }
    }

    /// Drops the principal's cached authority.
    pub async fn invalidate_principal(&self, subject: &str) -> AppResult<()> {
        self.cache.invalidate(subject).await
    }

    /// Drops every principal's cached authority.
    pub async fn invalidate_all(&self) -> AppResult<()> {
        self.cache.invalidate_all().await
    }

    async fn evaluate(&self, roles: &ResolvedRoleSet, resource: Resource) -> AppResult<PermissionState> {
        let mut actions = Vec::with_capacity(Action::all().len());
        for action in Action::all() {
            actions.push(ActionPermission {
                action: *action,
                allowed: self.evaluator.can_perform(roles, resource, *action).await?,
            });
        }

        Ok(PermissionState {
            resource,
            pending: false,
            actions,
            field_restrictions: self.field_resolver.restrictions(roles, resource).await?,
        })
    }

    fn spawn_refresh(&self, subject: &str) {
        if self.cache.ttl_seconds() == 0 {
            return;
        }

        let service = self.clone();
        let subject = subject.to_owned();
        tokio::spawn(async move {
            if let Err(error) = service.resolve(subject.as_str()).await {
                warn!(
                    subject = subject.as_str(),
                    code = error.code(),
                    %error,
                    "background role load failed"
                );
            }
        });
    }
}
