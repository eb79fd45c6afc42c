//! Error types and builders for authgate operations

mod builders;
mod display;
mod types;

pub use types::{Error, Result};
