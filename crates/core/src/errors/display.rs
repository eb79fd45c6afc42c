//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Protocol { message } => {
                write!(f, "authority API error: {message}")
            }
            Error::Transient { message } => {
                write!(f, "transient authority error: {message}")
            }
            Error::Interrupted { message, .. } => {
                write!(f, "service interruption: {message}")
            }
            Error::Upstream { message } => {
                write!(f, "unclassified authority fault: {message}")
            }
        }
    }
}
