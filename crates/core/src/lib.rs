//! Core domain types, errors, and constants for the `authgate` workspace.
//!
//! This crate establishes the foundational building blocks used by every
//! other crate in the workspace:
//!
//! - **`errors`**: the primary `Error` enum and `Result` type alias,
//!   centralizing the failure taxonomy (configuration, protocol, transient,
//!   interruption, unclassified upstream) so callers can distinguish faults
//!   that must be fixed from faults that merely need waiting out.
//! - **`types`**: the `AuthorizationResponse` value returned to every
//!   caller, and its three-way `ResponseStatus`.
//! - **`constants`**: sentinel tokens, upstream status codes, privilege
//!   bits, and the retry/cache defaults shared across the workspace.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::{AuthorizationResponse, ResponseStatus},
};
