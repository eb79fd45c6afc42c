//! JSON loader for authority connection parameters.

use crate::AuthorityParams;
use authgate_core::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Load connection parameters from a JSON file.
///
/// Missing fields take their defaults; unknown fields are rejected so a
/// typo in a parameter name fails loudly instead of silently applying a
/// default.
pub fn load_params(path: &Path) -> Result<AuthorityParams> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::configuration(format!(
            "cannot read connection parameters '{}': {e}",
            path.display()
        ))
    })?;
    let params: AuthorityParams = serde_json::from_str(&raw).map_err(|e| {
        Error::configuration(format!(
            "invalid connection parameters '{}': {e}",
            path.display()
        ))
    })?;
    debug!(
        server = %params.server_name,
        port = params.server_port,
        "loaded connection parameters"
    );
    Ok(params)
}
