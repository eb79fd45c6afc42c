//! Resolution of external identities into access-control token sets.
//!
//! The pipeline is: translate the incoming identity with the configured
//! mapping rules ([`mapper`]), look it up against the remote authority
//! through the retry driver ([`retry`]) which consults the fault
//! classifier ([`fault`]), and interpret the result codes into an
//! [`authgate_core::AuthorizationResponse`]. The whole computation runs
//! behind the single-flight cache in `authgate-cache`, keyed by identity
//! plus connection parameters.
//!
//! The wire client is out of scope: it is abstracted behind the
//! [`client::AuthorityClient`] trait and reports faults as categories,
//! not exception types.

pub mod client;
pub mod connector;
pub mod fault;
pub mod mapper;
pub mod retry;

pub use client::{AuthorityClient, AuthorityFault, ClientFactory, RightsLookup, UserLookup, UserRecord};
pub use connector::{AuthorityConnector, AuthoritySession, DirectoryConnector, Health};
pub use fault::{FaultClassifier, FaultDisposition, HostProber};
pub use mapper::IdentityMapper;
pub use retry::{RetryDriver, RetryPolicy};
