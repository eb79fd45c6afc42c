//! Cache key for authorization responses.

/// Identifies one cached authorization response.
///
/// The key is structural over the identity *and* every connection
/// parameter, credential included: two connections configured against the
/// same host with different accounts or passwords must never observe each
/// other's cached responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub user_name: String,
    pub server_name: String,
    pub server_port: u16,
    pub server_username: String,
    pub server_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(user: &str, password: &str) -> ResponseKey {
        ResponseKey {
            user_name: user.to_string(),
            server_name: "directory.internal".to_string(),
            server_port: 2099,
            server_username: "svc".to_string(),
            server_password: password.to_string(),
        }
    }

    #[test]
    fn equality_is_structural_over_all_fields() {
        assert_eq!(key("alice", "s3cret"), key("alice", "s3cret"));
        assert_ne!(key("alice", "s3cret"), key("bob", "s3cret"));
        // Credential participates so entries never leak across connections.
        assert_ne!(key("alice", "s3cret"), key("alice", "other"));
    }
}
