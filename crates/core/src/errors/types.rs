//! Core error type definitions

use std::time::SystemTime;

/// Result type alias for authgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for authgate operations using thiserror.
///
/// The enum is `Clone` on purpose: a failed single-flight computation is
/// fanned out to every caller waiting on the same cache key.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid connection parameters: malformed cache lifetime or LRU
    /// size, a mapping rule that does not compile, or a hostname that
    /// cannot be resolved. Never retried.
    Configuration { message: String },

    /// Authority API contract violation or security-provider failure
    /// reported by the client library. Surfaced immediately.
    Protocol { message: String },

    /// Client-internal inconsistency that typically clears on immediate
    /// reattempt. Escalated to `Protocol` once the retry budget is spent.
    Transient { message: String },

    /// The remote authority is temporarily unreachable. Carries the
    /// suggested retry window.
    Interrupted {
        message: String,
        retry_at: SystemTime,
        give_up_at: SystemTime,
    },

    /// A fault the classifier does not recognize, surfaced unchanged
    /// rather than silently swallowed.
    Upstream { message: String },
}
