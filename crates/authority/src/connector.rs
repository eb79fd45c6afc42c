//! Connector lifecycle and the authorization resolver.
//!
//! A connector is configured once with connection parameters and then
//! produces an owned [`AuthoritySession`] via `connect`. All per-session
//! state (the client handle, compiled mapping rules, the response cache)
//! lives on the session and dies with `disconnect`; nothing is ambient.

use crate::client::{AuthorityClient, AuthorityFault, ClientFactory};
use crate::fault::{FaultClassifier, HostProber};
use crate::mapper::IdentityMapper;
use crate::retry::{RetryDriver, RetryPolicy};
use async_trait::async_trait;
use authgate_cache::{ResponseCache, ResponseKey};
use authgate_config::AuthorityParams;
use authgate_core::{
    AuthorizationResponse, Error, Result, GUEST_TOKEN, PRIV_PERM_BYPASS, PRIV_PERM_WORLD,
    STATUS_OK, SYSTEM_TOKEN, USER_NOT_FOUND_CODES,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a connection health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    /// The connection or the service account is misconfigured.
    ConnectionFailed(String),
    /// The authority is temporarily unreachable.
    Interrupted(String),
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Healthy => write!(f, "Connection working"),
            Health::ConnectionFailed(message) => write!(f, "Connection failed: {message}"),
            Health::Interrupted(message) => {
                write!(f, "Temporary service interruption: {message}")
            }
        }
    }
}

/// Lifecycle of an authority connection.
///
/// Different upstream authorities implement this same interface; the
/// session is an explicit owned handle rather than mutable connector
/// state, so lifetime and thread-safety boundaries stay visible.
#[async_trait]
pub trait AuthorityConnector: Send + Sync {
    type Session: Send + Sync;

    /// Validate configuration and open a session. Configuration problems
    /// (malformed cache settings, bad mapping rules, unresolvable host)
    /// surface here, not at resolution time.
    async fn connect(&self) -> Result<Self::Session>;

    /// Probe the connection with the configured service account.
    async fn check_health(&self, session: &Self::Session) -> Health;

    /// Resolve a raw identity into its access token set. Never fails for
    /// authority-side problems, only for configuration or contract
    /// errors.
    async fn resolve(
        &self,
        session: &Self::Session,
        raw_identity: &str,
    ) -> Result<AuthorizationResponse>;

    /// Tear the session down. In-flight resolutions finish but are no
    /// longer cached.
    async fn disconnect(&self, session: Self::Session) -> Result<()>;

    /// Response handed to callers when `connect` itself fails.
    fn default_response(&self) -> AuthorizationResponse {
        AuthorizationResponse::unreachable()
    }
}

/// Owned per-connection state produced by a successful `connect`.
pub struct AuthoritySession<C> {
    client: C,
    mapper: IdentityMapper,
    cache: ResponseCache,
    classifier: FaultClassifier,
    policy: RetryPolicy,
}

impl<C> AuthoritySession<C> {
    /// Number of responses currently cached for this session.
    pub fn cached_responses(&self) -> usize {
        self.cache.len()
    }
}

impl<C> fmt::Debug for AuthoritySession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthoritySession").finish_non_exhaustive()
    }
}

/// The directory-backed authority connector.
pub struct DirectoryConnector<F> {
    params: AuthorityParams,
    factory: F,
    policy: RetryPolicy,
    prober: Option<Arc<dyn HostProber>>,
}

impl<F: ClientFactory> DirectoryConnector<F> {
    pub fn new(params: AuthorityParams, factory: F) -> Self {
        Self {
            params,
            factory,
            policy: RetryPolicy::default(),
            prober: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override hostname resolution probing (used by tests).
    pub fn with_prober(mut self, prober: Arc<dyn HostProber>) -> Self {
        self.prober = Some(prober);
        self
    }

    fn response_key(&self, raw_identity: &str) -> ResponseKey {
        ResponseKey {
            user_name: raw_identity.to_string(),
            server_name: self.params.server_name.clone(),
            server_port: self.params.server_port,
            server_username: self.params.server_username.clone(),
            server_password: self.params.server_password.clone(),
        }
    }

    fn classifier(&self) -> FaultClassifier {
        match &self.prober {
            Some(prober) => FaultClassifier::with_prober(
                self.params.server_name.clone(),
                self.params.server_port,
                prober.clone(),
            ),
            None => FaultClassifier::new(self.params.server_name.clone(), self.params.server_port),
        }
    }
}

#[async_trait]
impl<F: ClientFactory> AuthorityConnector for DirectoryConnector<F> {
    type Session = AuthoritySession<F::Client>;

    async fn connect(&self) -> Result<Self::Session> {
        let settings = self.params.cache_settings()?;
        let mapper = IdentityMapper::new(&self.params.user_name_mapping)?;
        let classifier = self.classifier();

        debug!(
            server = %self.params.server_name,
            port = self.params.server_port,
            user = %self.params.server_username,
            password = if self.params.server_password.is_empty() { "unset" } else { "set" },
            "connecting to authority"
        );

        // Session construction goes through the same fault machinery as
        // the lookups themselves.
        let driver = RetryDriver::new(&self.policy, &classifier);
        let client = driver.run(|| self.factory.open(&self.params)).await?;
        debug!("authority session created");

        Ok(AuthoritySession {
            client,
            mapper,
            cache: ResponseCache::new(settings.response_lifetime, settings.lru_size),
            classifier,
            policy: self.policy.clone(),
        })
    }

    async fn check_health(&self, session: &Self::Session) -> Health {
        let driver = RetryDriver::new(&session.policy, &session.classifier);
        let probe = driver
            .run(|| session.client.lookup_identity(&self.params.server_username))
            .await;
        match probe {
            Ok(lookup) if lookup.status == STATUS_OK => Health::Healthy,
            Ok(_) => Health::ConnectionFailed("user authentication failed".to_string()),
            Err(Error::Interrupted { message, .. }) => Health::Interrupted(message),
            Err(error) => Health::ConnectionFailed(error.to_string()),
        }
    }

    async fn resolve(
        &self,
        session: &Self::Session,
        raw_identity: &str,
    ) -> Result<AuthorizationResponse> {
        let key = self.response_key(raw_identity);
        session
            .cache
            .get_or_resolve(&key, || resolve_uncached(session, raw_identity))
            .await
    }

    async fn disconnect(&self, session: Self::Session) -> Result<()> {
        session.cache.shutdown();
        drop(session);
        Ok(())
    }
}

/// Resolve an identity without consulting the cache.
async fn resolve_uncached<C: AuthorityClient>(
    session: &AuthoritySession<C>,
    raw_identity: &str,
) -> Result<AuthorizationResponse> {
    let identity = session.mapper.translate(raw_identity);
    debug!(raw = raw_identity, canonical = %identity, "resolving identity");

    let driver = RetryDriver::new(&session.policy, &session.classifier);
    let outcome = driver
        .run(|| lookup_tokens(&session.client, &identity))
        .await;

    match outcome {
        Ok(response) => Ok(response),
        // Authority-side problems become an unreachable response; the
        // resolver only ever fails for configuration or contract errors.
        Err(Error::Interrupted { message, .. }) => {
            warn!(identity = %identity, "authority seems to be down: {message}");
            Ok(AuthorizationResponse::unreachable())
        }
        Err(Error::Upstream { message }) => {
            warn!(identity = %identity, "unclassified authority fault: {message}");
            Ok(AuthorizationResponse::unreachable())
        }
        Err(error) => Err(error),
    }
}

/// One attempt at the full lookup sequence: user record, privilege bits,
/// rights enumeration.
async fn lookup_tokens<C: AuthorityClient>(
    client: &C,
    identity: &str,
) -> std::result::Result<AuthorizationResponse, AuthorityFault> {
    let lookup = client.lookup_identity(identity).await?;
    if USER_NOT_FOUND_CODES.contains(&lookup.status) {
        debug!(identity, "identity does not exist");
        return Ok(AuthorizationResponse::user_not_found());
    }
    if lookup.status != STATUS_OK {
        warn!(
            identity,
            status = lookup.status,
            "identity lookup failed; treating authority as unreachable"
        );
        return Ok(AuthorizationResponse::unreachable());
    }
    let Some(record) = lookup.record else {
        warn!(identity, "authority reported success without a record");
        return Ok(AuthorizationResponse::unreachable());
    };
    if record.deleted {
        // A deleted identity cannot become undeleted, so this is the
        // same as the identity never having existed.
        debug!(identity, "identity is marked deleted");
        return Ok(AuthorizationResponse::user_not_found());
    }

    let mut tokens: Vec<String> = Vec::new();
    if record.privileges & PRIV_PERM_WORLD == PRIV_PERM_WORLD {
        tokens.push(GUEST_TOKEN.to_string());
    }
    if record.privileges & PRIV_PERM_BYPASS == PRIV_PERM_BYPASS {
        tokens.push(SYSTEM_TOKEN.to_string());
    }

    let rights = client.list_rights(identity).await?;
    if USER_NOT_FOUND_CODES.contains(&rights.status) {
        debug!(identity, "identity vanished during rights enumeration");
        return Ok(AuthorizationResponse::user_not_found());
    }
    if rights.status != STATUS_OK {
        warn!(
            identity,
            status = rights.status,
            "rights enumeration failed; treating authority as unreachable"
        );
        return Ok(AuthorizationResponse::unreachable());
    }
    tokens.extend(rights.rights.iter().map(|id| id.to_string()));

    Ok(AuthorizationResponse::ok(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_display_distinguishes_failure_modes() {
        assert_eq!(Health::Healthy.to_string(), "Connection working");
        assert_eq!(
            Health::ConnectionFailed("user authentication failed".into()).to_string(),
            "Connection failed: user authentication failed"
        );
        assert_eq!(
            Health::Interrupted("host unreachable".into()).to_string(),
            "Temporary service interruption: host unreachable"
        );
    }
}
