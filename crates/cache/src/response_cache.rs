//! The single-flight response cache.

use crate::entry::CacheEntry;
use crate::key::ResponseKey;
use authgate_core::{AuthorizationResponse, Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

type FlightResult = Result<AuthorizationResponse>;
type FlightMap = DashMap<ResponseKey, watch::Receiver<Option<FlightResult>>>;

/// Single-flight, TTL-expiring, LRU-bounded cache of authorization
/// responses.
///
/// `get_or_resolve` never fails of its own accord; it only surfaces the
/// compute function's failure. Failures are never stored: the next call
/// for the same key computes from scratch.
pub struct ResponseCache {
    lifetime: Duration,
    entries: Mutex<LruCache<ResponseKey, CacheEntry>>,
    in_flight: FlightMap,
    open: AtomicBool,
}

/// Role a caller takes for one pass through the flight table.
enum Role {
    /// This caller runs the computation and publishes the result.
    Leader(watch::Sender<Option<FlightResult>>),
    /// Another caller's computation is in flight; await its broadcast.
    Waiter(watch::Receiver<Option<FlightResult>>),
}

/// Removes the in-flight marker on every exit path, including
/// cancellation of the computing caller, so waiters are never parked on a
/// dead flight.
struct FlightGuard<'a> {
    flights: &'a FlightMap,
    key: &'a ResponseKey,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flights.remove(self.key);
    }
}

impl ResponseCache {
    /// Create a cache with the given entry lifetime and capacity.
    pub fn new(lifetime: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            lifetime,
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: DashMap::new(),
            open: AtomicBool::new(true),
        }
    }

    /// Return the cached response for `key`, or compute it.
    ///
    /// For a fixed key at most one computation is ever in flight: the
    /// first caller to miss runs `compute`, every concurrent caller for
    /// the same key awaits that one result, success or failure. A live
    /// cached entry is returned immediately and promoted to
    /// most-recently-used.
    pub async fn get_or_resolve<F, Fut>(
        &self,
        key: &ResponseKey,
        compute: F,
    ) -> Result<AuthorizationResponse>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<AuthorizationResponse>>,
    {
        loop {
            if let Some(response) = self.lookup(key) {
                return Ok(response);
            }

            // Either become the leader for this key or subscribe to the
            // flight already in progress. The map guard is dropped before
            // any await point.
            let role = match self.in_flight.entry(key.clone()) {
                Entry::Occupied(slot) => Role::Waiter(slot.get().clone()),
                Entry::Vacant(slot) => {
                    let (tx, rx) = watch::channel(None);
                    slot.insert(rx);
                    Role::Leader(tx)
                }
            };

            match role {
                Role::Leader(tx) => {
                    let guard = FlightGuard {
                        flights: &self.in_flight,
                        key,
                    };
                    let result = compute().await;
                    if let Ok(response) = &result {
                        self.store(key, response.clone());
                    }
                    // Unregister the flight before publishing so that a
                    // caller arriving after the broadcast sees the stored
                    // entry instead of a dead channel.
                    drop(guard);
                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
                Role::Waiter(mut rx) => loop {
                    let published = rx.borrow_and_update().clone();
                    if let Some(result) = published {
                        return result;
                    }
                    if rx.changed().await.is_err() {
                        // The leader was cancelled without publishing;
                        // start over from the cache.
                        break;
                    }
                },
            }
        }
    }

    /// Release all entries and flight state. In-flight computations are
    /// allowed to finish but their results are no longer stored.
    pub fn shutdown(&self) {
        self.open.store(false, Ordering::Release);
        self.entries.lock().clear();
        self.in_flight.clear();
    }

    /// Number of stored entries (expired entries are counted until they
    /// are observed and dropped).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &ResponseKey) -> Option<AuthorizationResponse> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                return Some(entry.response.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn store(&self, key: &ResponseKey, response: AuthorizationResponse) {
        if !self.open.load(Ordering::Acquire) {
            return;
        }
        let entry = CacheEntry::new(response, self.lifetime);
        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != *key {
                debug!(user = %evicted.user_name, "evicted least-recently-used response");
            }
        }
    }
}
