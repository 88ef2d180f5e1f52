use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use custos_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Backing store for roles, assignments and permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStoreConfig {
    Postgres,
    Memory,
}

/// Backing store for cached role sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCacheConfig {
    Memory,
    Redis,
}

/// Source of role × resource × action grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySourceConfig {
    Store,
    Matrix,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub role_store: RoleStoreConfig,
    pub database_url: Option<String>,
    pub role_cache: RoleCacheConfig,
    pub redis_url: Option<String>,
    pub role_cache_key_prefix: String,
    pub role_cache_ttl_seconds: u32,
    pub policy_source: PolicySourceConfig,
    pub cookie_secure: bool,
    pub bootstrap_token: Option<String>,
    pub dev_seed: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match optional("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let frontend_url = validated_origin(frontend_url.as_str())?;

        let role_store = match optional("ROLE_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => RoleStoreConfig::Postgres,
            "memory" => RoleStoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_STORE must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };
        let database_url = optional("DATABASE_URL");
        if (role_store == RoleStoreConfig::Postgres || migrate_only) && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required when ROLE_STORE=postgres".to_owned(),
            ));
        }

        let role_cache = match optional("ROLE_CACHE").as_deref().unwrap_or("memory") {
            "memory" => RoleCacheConfig::Memory,
            "redis" => RoleCacheConfig::Redis,
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_CACHE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };
        let redis_url = optional("REDIS_URL");
        if role_cache == RoleCacheConfig::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when ROLE_CACHE=redis".to_owned(),
            ));
        }

        let role_cache_key_prefix =
            optional("ROLE_CACHE_KEY_PREFIX").unwrap_or_else(|| "custos:roles".to_owned());
        let role_cache_ttl_seconds = match optional("ROLE_CACHE_TTL_SECONDS") {
            Some(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid ROLE_CACHE_TTL_SECONDS: {error}"))
            })?,
            None => 300,
        };

        let policy_source = match optional("POLICY_SOURCE").as_deref().unwrap_or("store") {
            "store" => PolicySourceConfig::Store,
            "matrix" => PolicySourceConfig::Matrix,
            other => {
                return Err(AppError::Validation(format!(
                    "POLICY_SOURCE must be either 'store' or 'matrix', got '{other}'"
                )));
            }
        };

        let cookie_secure = optional_flag(optional("SESSION_COOKIE_SECURE"), "SESSION_COOKIE_SECURE")?;
        let dev_seed = optional_flag(optional("DEV_SEED"), "DEV_SEED")?;
        if dev_seed && role_store != RoleStoreConfig::Memory {
            return Err(AppError::Validation(
                "DEV_SEED requires ROLE_STORE=memory".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            role_store,
            database_url,
            role_cache,
            redis_url,
            role_cache_key_prefix,
            role_cache_ttl_seconds,
            policy_source,
            cookie_secure,
            bootstrap_token: optional("AUTH_BOOTSTRAP_TOKEN"),
            dev_seed,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Normalizes a URL to its origin, as sent in the `Origin` header.
fn validated_origin(value: &str) -> Result<String, AppError> {
    let url = Url::parse(value)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::Validation(format!(
            "FRONTEND_URL must be an http(s) origin, got '{value}'"
        )));
    }

    Ok(url.origin().ascii_serialization())
}

fn optional_flag(value: Option<String>, name: &str) -> Result<bool, AppError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use custos_core::AppError;

    use super::{ApiConfig, PolicySourceConfig, RoleCacheConfig, RoleStoreConfig};

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(false, |name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_for_the_memory_store() {
        let config = load(&[("ROLE_STORE", "memory")]);
        assert!(matches!(
            config,
            Ok(ref value) if value.api_port == 3001
                && value.frontend_url == "http://localhost:3000"
                && value.role_store == RoleStoreConfig::Memory
                && value.role_cache == RoleCacheConfig::Memory
                && value.role_cache_ttl_seconds == 300
                && value.policy_source == PolicySourceConfig::Store
                && value.bootstrap_token.is_none()
                && !value.dev_seed
        ));
    }

    #[test]
    fn postgres_store_requires_database_url() {
        assert!(matches!(load(&[]), Err(AppError::Validation(_))));
        assert!(load(&[("DATABASE_URL", "postgres://localhost/custos")]).is_ok());
    }

    #[test]
    fn redis_cache_requires_redis_url() {
        let missing = load(&[("ROLE_STORE", "memory"), ("ROLE_CACHE", "redis")]);
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let present = load(&[
            ("ROLE_STORE", "memory"),
            ("ROLE_CACHE", "redis"),
            ("REDIS_URL", "redis://127.0.0.1/"),
        ]);
        assert!(matches!(present, Ok(ref value) if value.role_cache == RoleCacheConfig::Redis));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for pairs in [
            vec![("ROLE_STORE", "sqlite")],
            vec![("ROLE_STORE", "memory"), ("API_PORT", "http")],
            vec![("ROLE_STORE", "memory"), ("ROLE_CACHE_TTL_SECONDS", "-1")],
            vec![("ROLE_STORE", "memory"), ("POLICY_SOURCE", "yaml")],
            vec![("ROLE_STORE", "memory"), ("FRONTEND_URL", "localhost")],
            vec![("ROLE_STORE", "memory"), ("DEV_SEED", "maybe")],
            vec![("DATABASE_URL", "postgres://localhost/custos"), ("DEV_SEED", "true")],
        ] {
            assert!(matches!(load(pairs.as_slice()), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn frontend_url_is_normalized_to_its_origin() {
        let config = load(&[
            ("ROLE_STORE", "memory"),
            ("FRONTEND_URL", "https://app.custos.ro/dashboard"),
        ]);
        assert!(matches!(config, Ok(ref value) if value.frontend_url == "https://app.custos.ro"));
    }
}
