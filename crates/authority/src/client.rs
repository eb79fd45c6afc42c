//! Client-side interface to the remote directory authority.
//!
//! The wire protocol is out of scope; implementations wrap whatever
//! transport the deployment uses. Failures cross this boundary as
//! [`AuthorityFault`] categories rather than a growing list of concrete
//! error types, so the classifier's mapping from fault to retry action
//! stays a finite, explicit table.

use async_trait::async_trait;
use authgate_config::AuthorityParams;
use std::fmt;

/// Fault categories an authority client may report.
#[derive(Debug, Clone)]
pub enum AuthorityFault {
    /// Malformed request or API contract violation.
    Contract { message: String },
    /// Security-provider failure inside the client library.
    Security { message: String },
    /// Client-internal inconsistency that typically clears on immediate
    /// reattempt.
    IllegalState { message: String },
    /// Connectivity failure: the remote host may be transiently
    /// unreachable.
    Network { message: String },
    /// Anything the taxonomy does not cover.
    Unrecognized { message: String },
}

impl AuthorityFault {
    pub fn message(&self) -> &str {
        match self {
            AuthorityFault::Contract { message }
            | AuthorityFault::Security { message }
            | AuthorityFault::IllegalState { message }
            | AuthorityFault::Network { message }
            | AuthorityFault::Unrecognized { message } => message,
        }
    }
}

impl fmt::Display for AuthorityFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorityFault::Contract { message } => write!(f, "API contract fault: {message}"),
            AuthorityFault::Security { message } => {
                write!(f, "security provider fault: {message}")
            }
            AuthorityFault::IllegalState { message } => {
                write!(f, "client illegal state: {message}")
            }
            AuthorityFault::Network { message } => write!(f, "network fault: {message}"),
            AuthorityFault::Unrecognized { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for AuthorityFault {}

/// Record describing one identity known to the authority.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// The identity record is marked deleted. Deletion is terminal.
    pub deleted: bool,
    /// Privilege bit flags; see `PRIV_PERM_WORLD` / `PRIV_PERM_BYPASS`.
    pub privileges: u32,
}

/// Reply to an identity lookup: upstream status code plus the record when
/// one was found.
#[derive(Debug, Clone)]
pub struct UserLookup {
    pub status: i32,
    pub record: Option<UserRecord>,
}

/// Reply to a rights enumeration.
#[derive(Debug, Clone)]
pub struct RightsLookup {
    pub status: i32,
    pub rights: Vec<i64>,
}

/// One live client session against the authority.
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Look up an identity by its canonical (already translated) name.
    async fn lookup_identity(
        &self,
        identity: &str,
    ) -> std::result::Result<UserLookup, AuthorityFault>;

    /// Enumerate the rights identifiers granted to an identity.
    async fn list_rights(
        &self,
        identity: &str,
    ) -> std::result::Result<RightsLookup, AuthorityFault>;
}

/// Opens client sessions for configured connection parameters.
///
/// Session construction can fail with the same fault categories as the
/// calls themselves and is retried under the same policy.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    type Client: AuthorityClient;

    async fn open(
        &self,
        params: &AuthorityParams,
    ) -> std::result::Result<Self::Client, AuthorityFault>;
}
