//! Domain types for authorization responses.

use crate::constants::DENY_TOKEN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of resolving an identity against the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The identity was found and its token set enumerated.
    Ok,
    /// The authority does not know the identity (or the identity record
    /// is marked deleted, which is terminal and treated identically).
    UserNotFound,
    /// The authority could not be consulted.
    Unreachable,
}

/// The set of access-control tokens granted to an identity, plus the
/// resolution status.
///
/// Tokens are an ordered set: duplicates are impossible by construction.
/// Every non-OK response carries exactly the sentinel deny token so that
/// callers who union token sets can never grant access on failure. An OK
/// response with zero tokens is valid: it means the authority genuinely
/// reports no memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    tokens: BTreeSet<String>,
    status: ResponseStatus,
}

impl AuthorizationResponse {
    /// Successful resolution with the given token set.
    pub fn ok<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            status: ResponseStatus::Ok,
        }
    }

    /// The identity is unknown to the authority.
    pub fn user_not_found() -> Self {
        Self {
            tokens: BTreeSet::from([DENY_TOKEN.to_string()]),
            status: ResponseStatus::UserNotFound,
        }
    }

    /// The authority could not be consulted.
    pub fn unreachable() -> Self {
        Self {
            tokens: BTreeSet::from([DENY_TOKEN.to_string()]),
            status: ResponseStatus::Unreachable,
        }
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
