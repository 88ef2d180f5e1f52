use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use custos_core::AppResult;
use custos_domain::ResolvedRoleSet;
use tracing::debug;

use crate::authorization_failure::degraded;
use crate::{RoleResolver, RoleSetCache};


/// Non-blocking view of a principal's cached authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSnapshot {
    /// A load is in flight. Dependent queries fail closed.
    Pending,
    /// Nothing is cached. Dependent queries fail closed.
    Unloaded,
    /// Settled role set.
    Ready(ResolvedRoleSet),
}

impl RoleSnapshot {
    /// Returns the settled set, if any.
    #[must_use]
    pub fn roles(&self) -> Option<&ResolvedRoleSet> {
        match self {
            Self::Ready(roles) => Some(roles),
            Self::Pending | Self::Unloaded => None,
        }
    }

    /// Returns a stable status label.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Unloaded => "unloaded",
            Self::Ready(_) => "ready",
        }
    }
}

/// Time-bounded per-principal cache of resolved role sets.
///
/// Every invalidation bumps a generation counter; a load stores its result
/// only when no invalidation touched the principal while it was in flight.
#[derive(Clone)]
pub struct AuthorizationCache {
    cache: Arc<dyn RoleSetCache>,
    ttl_seconds: u32,
    tracker: Arc<Mutex<LoadTracker>>,
}

#[derive(Default)]
struct LoadTracker {
    epoch: u64,
    generations: HashMap<String, u64>,
    in_flight: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadToken {
    epoch: u64,
    generation: u64,
}

impl LoadTracker {
    fn token(&self, subject: &str) -> LoadToken {
        LoadToken {
            epoch: self.epoch,
            generation: self.generations.get(subject).copied().unwrap_or_default(),
        }
    }
}

fn lock(tracker: &Mutex<LoadTracker>) -> MutexGuard<'_, LoadTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a load in flight until dropped, including when the caller abandons it.
struct InFlightLoad {
    tracker: Arc<Mutex<LoadTracker>>,
    subject: String,
    token: LoadToken,
}

impl InFlightLoad {
    fn is_current(&self) -> bool {
        lock(&self.tracker).token(self.subject.as_str()) == self.token
    }
}

impl Drop for InFlightLoad {
    fn drop(&mut self) {
        let mut tracker = lock(&self.tracker);
        if let Some(count) = tracker.in_flight.get_mut(self.subject.as_str()) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                tracker.in_flight.remove(self.subject.as_str());
                tracker.generations.remove(self.subject.as_str());
            }
        }
    }
}

impl AuthorizationCache {
    /// Creates a cache over a storage backend. A ttl of zero disables storage.
    #[must_use]
    pub fn new(cache: Arc<dyn RoleSetCache>, ttl_seconds: u32) -> Self {
        Self {
            cache,
            ttl_seconds,
            tracker: Arc::new(Mutex::new(LoadTracker::default())),
        }
    }

    /// Returns the configured entry ttl.
    #[must_use]
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }

    /// Returns the current view without resolving.
    pub async fn snapshot(&self, subject: &str) -> AppResult<RoleSnapshot> {
        if lock(&self.tracker).in_flight.contains_key(subject) {
            return Ok(RoleSnapshot::Pending);
        }

        if self.ttl_seconds == 0 {
            return Ok(RoleSnapshot::Unloaded);
        }

        Ok(self
            .read(subject)
            .await?
            .map_or(RoleSnapshot::Unloaded, RoleSnapshot::Ready))
    }

    /// Returns the cached set or resolves and stores a fresh one.
    ///
    /// A result loaded across an invalidation is returned to this caller but
    /// not stored.
    pub async fn load(&self, subject: &str, resolver: &RoleResolver) -> AppResult<ResolvedRoleSet> {
        if self.ttl_seconds > 0
            && let Some(cached) = self.read(subject).await?
        {
            return Ok(cached);
        }

        let load = self.begin_load(subject);
        let roles = resolver.resolve(subject).await?;

        if self.ttl_seconds == 0 {
            return Ok(roles);
        }

        if !load.is_current() {
            debug!(subject, "discarding role set loaded across an invalidation");
            return Ok(roles);
        }

        self.cache
            .set_role_set(subject, &roles, self.ttl_seconds)
            .await
            .map_err(|error| degraded("role cache write", error))?;

        if !load.is_current() {
            self.cache
                .remove_role_set(subject)
                .await
                .map_err(|error| degraded("role cache eviction", error))?;
        }

        Ok(roles)
    }

    /// Drops one principal's entry and voids its in-flight loads.
    pub async fn invalidate(&self, subject: &str) -> AppResult<()> {
        {
            // Generations only matter to loads that are still in flight.
            let mut tracker = lock(&self.tracker);
            if tracker.in_flight.contains_key(subject) {
                let generation = tracker.generations.entry(subject.to_owned()).or_default();
                *generation = generation.wrapping_add(1);
            }
        }

        debug!(subject, "invalidating cached role set");
        self.cache
            .remove_role_set(subject)
            .await
            .map_err(|error| degraded("role cache eviction", error))
    }

    /// Drops every entry and voids all in-flight loads.
    pub async fn invalidate_all(&self) -> AppResult<()> {
        {
            let mut tracker = lock(&self.tracker);
            tracker.epoch = tracker.epoch.wrapping_add(1);
            let LoadTracker {
                generations,
                in_flight,
                ..
            } = &mut *tracker;
            generations.retain(|subject, _| in_flight.contains_key(subject));
        }

        debug!("invalidating every cached role set");
        self.cache
            .clear()
            .await
            .map_err(|error| degraded("role cache clear", error))
    }

    #[cfg(test)]
    fn tracked_subjects(&self) -> usize {
        let tracker = lock(&self.tracker);
        tracker.generations.len() + tracker.in_flight.len()
    }

    async fn read(&self, subject: &str) -> AppResult<Option<ResolvedRoleSet>> {
        self.cache
            .get_role_set(subject)
            .await
            .map_err(|error| degraded("role cache read", error))
    }

    fn begin_load(&self, subject: &str) -> InFlightLoad {
        let mut tracker = lock(&self.tracker);
        *tracker.in_flight.entry(subject.to_owned()).or_default() += 1;

        InFlightLoad {
            tracker: self.tracker.clone(),
            subject: subject.to_owned(),
            token: tracker.token(subject),
        }
    }
}
