use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use custos_application::RoleSetCache;
use custos_core::AppResult;
use custos_domain::ResolvedRoleSet;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct RoleSetCacheEntry {
    roles: ResolvedRoleSet,
    expires_at: Instant,
}

/// In-memory cache adapter for resolved role sets.
#[derive(Debug, Default)]
pub struct InMemoryRoleSetCache {
    entries: RwLock<HashMap<String, RoleSetCacheEntry>>,
}

impl InMemoryRoleSetCache {
    /// Creates an empty in-memory role set cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleSetCache for InMemoryRoleSetCache {
    async fn get_role_set(&self, subject: &str) -> AppResult<Option<ResolvedRoleSet>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(subject) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.roles.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(subject)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(subject);
        }

        Ok(None)
    }

    async fn set_role_set(
        &self,
        subject: &str,
        roles: &ResolvedRoleSet,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            subject.to_owned(),
            RoleSetCacheEntry {
                roles: roles.clone(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn remove_role_set(&self, subject: &str) -> AppResult<()> {
        self.entries.write().await.remove(subject);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
