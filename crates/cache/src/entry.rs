//! Cache entry bookkeeping.

use authgate_core::AuthorizationResponse;
use std::time::{Duration, Instant};

/// One cached response plus its absolute expiration.
///
/// Entries are owned exclusively by the cache; callers only ever receive
/// cloned responses. The expiration is fixed at store time relative to the
/// completion of the computation, never refreshed on read.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub response: AuthorizationResponse,
    expires_at: Instant,
}

impl CacheEntry {
    pub fn new(response: AuthorizationResponse, lifetime: Duration) -> Self {
        Self {
            response,
            expires_at: Instant::now() + lifetime,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
