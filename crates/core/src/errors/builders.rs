//! Convenience constructors for error types

use super::types::Error;
use crate::constants::{INTERRUPTION_GIVE_UP_AFTER, INTERRUPTION_RETRY_AFTER};
use std::time::SystemTime;

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    /// Create a transient error
    pub fn transient(message: impl Into<String>) -> Self {
        Error::Transient {
            message: message.into(),
        }
    }

    /// Create a service interruption with the standard retry window
    /// anchored at the current time.
    pub fn interrupted(message: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Error::Interrupted {
            message: message.into(),
            retry_at: now + INTERRUPTION_RETRY_AFTER,
            give_up_at: now + INTERRUPTION_GIVE_UP_AFTER,
        }
    }

    /// Create an unclassified upstream fault
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
        }
    }
}
