//! Classification of upstream faults into retry actions.

use crate::client::AuthorityFault;
use authgate_core::{Error, INTERRUPTION_GIVE_UP_AFTER, INTERRUPTION_RETRY_AFTER};
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::warn;

/// What the retry driver should do with a classified fault.
#[derive(Debug, Clone)]
pub enum FaultDisposition {
    /// Configuration or integration bug; waiting never helps.
    Fatal(Error),
    /// Reattempt after a short fixed delay, within the budget. Carries
    /// the error to raise if the budget runs out.
    ShortRetry(Error),
    /// The remote host is temporarily unreachable; stop immediately and
    /// surface the retry window.
    Interruption(Error),
    /// Not recognized by the taxonomy; surfaced unchanged.
    Propagate(Error),
}

/// Checks whether the configured hostname resolves at all.
///
/// Injected so classification stays deterministic under test; the default
/// implementation asks the system resolver.
pub trait HostProber: Send + Sync {
    fn resolves(&self, host: &str, port: u16) -> bool;
}

struct SystemProber;

impl HostProber for SystemProber {
    fn resolves(&self, host: &str, port: u16) -> bool {
        (host, port)
            .to_socket_addrs()
            .map(|mut addrs| addrs.next().is_some())
            .unwrap_or(false)
    }
}

/// Maps client fault categories to retry actions.
///
/// Network faults are normally a service interruption, but when the
/// configured hostname does not resolve at all the problem is
/// definitional, not transient, so it is reclassified as fatal.
#[derive(Clone)]
pub struct FaultClassifier {
    server_name: String,
    server_port: u16,
    prober: Arc<dyn HostProber>,
}

impl FaultClassifier {
    pub fn new(server_name: impl Into<String>, server_port: u16) -> Self {
        Self::with_prober(server_name, server_port, Arc::new(SystemProber))
    }

    pub fn with_prober(
        server_name: impl Into<String>,
        server_port: u16,
        prober: Arc<dyn HostProber>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            server_port,
            prober,
        }
    }

    pub fn classify(&self, fault: &AuthorityFault) -> FaultDisposition {
        match fault {
            AuthorityFault::Contract { message } => {
                FaultDisposition::Fatal(Error::protocol(message.clone()))
            }
            AuthorityFault::Security { message } => FaultDisposition::Fatal(Error::protocol(
                format!("security provider failure: {message}"),
            )),
            AuthorityFault::IllegalState { message } => {
                FaultDisposition::ShortRetry(Error::transient(message.clone()))
            }
            AuthorityFault::Network { message } => {
                if !self.prober.resolves(&self.server_name, self.server_port) {
                    return FaultDisposition::Fatal(Error::configuration(format!(
                        "server name '{}' cannot be resolved",
                        self.server_name
                    )));
                }
                warn!(server = %self.server_name, "authority unreachable: {message}");
                let now = SystemTime::now();
                FaultDisposition::Interruption(Error::Interrupted {
                    message: message.clone(),
                    retry_at: now + INTERRUPTION_RETRY_AFTER,
                    give_up_at: now + INTERRUPTION_GIVE_UP_AFTER,
                })
            }
            AuthorityFault::Unrecognized { message } => {
                FaultDisposition::Propagate(Error::upstream(message.clone()))
            }
        }
    }
}
