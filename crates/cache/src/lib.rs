//! Single-flight, TTL-expiring, LRU-bounded cache for authorization
//! responses.
//!
//! The cache shields the remote authority from three kinds of load:
//! concurrent request bursts for the same identity collapse into one
//! upstream computation (single flight), repeated requests within the
//! configured lifetime are served from memory (TTL), and total memory is
//! bounded under high identity cardinality (LRU eviction).

mod entry;
mod key;
mod response_cache;

pub use key::ResponseKey;
pub use response_cache::ResponseCache;
