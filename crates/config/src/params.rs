//! Connection parameters for an authority connection.

use authgate_core::constants::{
    DEFAULT_CACHE_LIFETIME, DEFAULT_CACHE_LRU_SIZE, DEFAULT_MAPPING_PATTERN,
    DEFAULT_MAPPING_TEMPLATE, DEFAULT_SERVER_NAME, DEFAULT_SERVER_PORT,
};
use authgate_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One identity mapping rule: a match pattern plus a replacement template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub pattern: String,
    pub replacement: String,
}

impl MappingRule {
    /// The built-in rule mapping `user@DOMAIN.suffix` to `domain\user`.
    pub fn standard() -> Self {
        Self {
            pattern: DEFAULT_MAPPING_PATTERN.to_string(),
            replacement: DEFAULT_MAPPING_TEMPLATE.to_string(),
        }
    }
}

/// Configured parameters for one authority connection.
///
/// `cache_lifetime` (minutes) and `cache_lru_size` stay as strings until
/// [`AuthorityParams::cache_settings`] parses them; validation is a
/// connect-time concern, not a resolution-time one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityParams {
    pub server_name: String,
    pub server_port: u16,
    pub server_username: String,
    pub server_password: String,
    pub user_name_mapping: Vec<MappingRule>,
    pub cache_lifetime: String,
    pub cache_lru_size: String,
}

impl Default for AuthorityParams {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            server_username: String::new(),
            server_password: String::new(),
            user_name_mapping: vec![MappingRule::standard()],
            cache_lifetime: DEFAULT_CACHE_LIFETIME.to_string(),
            cache_lru_size: DEFAULT_CACHE_LRU_SIZE.to_string(),
        }
    }
}

/// Validated cache tuning derived from [`AuthorityParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// How long a cached response stays live. Zero means every call
    /// recomputes (still single-flighted).
    pub response_lifetime: Duration,
    /// Maximum number of cached responses before LRU eviction.
    pub lru_size: usize,
}

impl AuthorityParams {
    /// Parse and validate the cache tuning strings.
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        let minutes: u64 = self.cache_lifetime.trim().parse().map_err(|_| {
            Error::configuration(format!(
                "cache lifetime must be an integer, got '{}'",
                self.cache_lifetime
            ))
        })?;
        let lru_size: usize = self.cache_lru_size.trim().parse().map_err(|_| {
            Error::configuration(format!(
                "cache LRU size must be an integer, got '{}'",
                self.cache_lru_size
            ))
        })?;
        if lru_size == 0 {
            return Err(Error::configuration("cache LRU size must be at least 1"));
        }
        Ok(CacheSettings {
            response_lifetime: Duration::from_secs(minutes * 60),
            lru_size,
        })
    }
}
