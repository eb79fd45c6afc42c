//! Constants shared across the authgate workspace.

use std::time::Duration;

// Sentinel tokens.
//
// The directory authority has no "deny" permission, and real tokens are
// numeric identifiers or the GUEST/SYSTEM keywords, so a reserved deny
// token can never collide with a genuine grant. It is attached to every
// non-OK response so that naive token-union logic cannot accidentally
// grant access on failure.
pub const DENY_TOKEN: &str = "DEAD_AUTHORITY";
pub const GUEST_TOKEN: &str = "GUEST";
pub const SYSTEM_TOKEN: &str = "SYSTEM";

// Upstream status codes.
pub const STATUS_OK: i32 = 0;
/// Status codes the authority uses to report an unknown identity.
pub const USER_NOT_FOUND_CODES: [i32; 2] = [103_101, 401_203];

// Privilege bits carried on a user record.
pub const PRIV_PERM_WORLD: u32 = 0x0800;
pub const PRIV_PERM_BYPASS: u32 = 0x1000;

// Retry behavior. Some client faults are noise that clears on immediate
// reattempt, so a handful of short retries is performed before giving up.
pub const FAILURE_RETRY_COUNT: u32 = 5;
pub const SHORT_RETRY_DELAY: Duration = Duration::from_secs(1);

// Service interruption window suggested to callers when the remote host
// is unreachable.
pub const INTERRUPTION_RETRY_AFTER: Duration = Duration::from_secs(5 * 60);
pub const INTERRUPTION_GIVE_UP_AFTER: Duration = Duration::from_secs(12 * 60 * 60);

// Connection parameter defaults.
pub const DEFAULT_SERVER_NAME: &str = "localhost";
pub const DEFAULT_SERVER_PORT: u16 = 2099;
pub const DEFAULT_CACHE_LIFETIME: &str = "1";
pub const DEFAULT_CACHE_LRU_SIZE: &str = "1000";

// Default identity mapping: turn a directory-style `user@DOMAIN.suffix`
// name into the `domain\user` form the authority expects, lowercasing the
// user part because the upstream identity source is case-insensitive while
// the authority is not.
pub const DEFAULT_MAPPING_PATTERN: &str = r"^(.*)@([A-Za-z0-9_-]*)\.(.*)$";
pub const DEFAULT_MAPPING_TEMPLATE: &str = r"$(2)\$(1l)";
