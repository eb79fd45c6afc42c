//! Connection parameter model and loader for authgate.
//!
//! Parameters mirror what an operator configures for an authority
//! connection: server endpoint, service account, identity mapping rules,
//! and cache tuning. The cache lifetime and LRU size are kept as the raw
//! strings they arrive as (they originate from a configuration form) and
//! are validated into [`CacheSettings`] at connect time, so a malformed
//! value surfaces as a configuration error before any resolution happens.

mod loader;
mod params;

pub use loader::load_params;
pub use params::{AuthorityParams, CacheSettings, MappingRule};
