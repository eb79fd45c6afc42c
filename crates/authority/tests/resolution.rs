//! End-to-end resolution through a scripted in-memory directory.

use async_trait::async_trait;
use authgate_authority::{
    AuthorityClient, AuthorityConnector, AuthorityFault, ClientFactory, DirectoryConnector,
    Health, HostProber, RetryPolicy, RightsLookup, UserLookup, UserRecord,
};
use authgate_config::{AuthorityParams, MappingRule};
use authgate_core::{
    Error, ResponseStatus, DENY_TOKEN, GUEST_TOKEN, PRIV_PERM_BYPASS, PRIV_PERM_WORLD,
    SYSTEM_TOKEN,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NOT_FOUND_STATUS: i32 = 103_101;

/// Scripted directory backing the mock client.
#[derive(Default)]
struct MockDirectory {
    users: HashMap<String, UserLookup>,
    rights: HashMap<String, RightsLookup>,
    /// Every identity lookup fails with this fault.
    lookup_fault: Option<AuthorityFault>,
    /// The first N identity lookups fail with an illegal-state fault.
    transient_failures: AtomicUsize,
    /// Artificial latency per identity lookup.
    lookup_delay: Duration,
    lookup_calls: AtomicUsize,
}

impl MockDirectory {
    fn with_user(mut self, identity: &str, record: UserRecord, rights: Vec<i64>) -> Self {
        self.users.insert(
            identity.to_string(),
            UserLookup {
                status: 0,
                record: Some(record),
            },
        );
        self.rights
            .insert(identity.to_string(), RightsLookup { status: 0, rights });
        self
    }

    fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

fn plain_user() -> UserRecord {
    UserRecord {
        deleted: false,
        privileges: 0,
    }
}

struct MockClient(Arc<MockDirectory>);

#[async_trait]
impl AuthorityClient for MockClient {
    async fn lookup_identity(
        &self,
        identity: &str,
    ) -> std::result::Result<UserLookup, AuthorityFault> {
        self.0.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.lookup_delay > Duration::ZERO {
            tokio::time::sleep(self.0.lookup_delay).await;
        }
        if let Some(fault) = &self.0.lookup_fault {
            return Err(fault.clone());
        }
        let transient = self
            .0
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if transient.is_ok() {
            return Err(AuthorityFault::IllegalState {
                message: "client session confused".into(),
            });
        }
        Ok(self.0.users.get(identity).cloned().unwrap_or(UserLookup {
            status: NOT_FOUND_STATUS,
            record: None,
        }))
    }

    async fn list_rights(
        &self,
        identity: &str,
    ) -> std::result::Result<RightsLookup, AuthorityFault> {
        Ok(self.0.rights.get(identity).cloned().unwrap_or(RightsLookup {
            status: NOT_FOUND_STATUS,
            rights: Vec::new(),
        }))
    }
}

struct MockFactory {
    directory: Arc<MockDirectory>,
    open_fault: Option<AuthorityFault>,
}

impl MockFactory {
    fn new(directory: Arc<MockDirectory>) -> Self {
        Self {
            directory,
            open_fault: None,
        }
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    type Client = MockClient;

    async fn open(
        &self,
        _params: &AuthorityParams,
    ) -> std::result::Result<MockClient, AuthorityFault> {
        if let Some(fault) = &self.open_fault {
            return Err(fault.clone());
        }
        Ok(MockClient(self.directory.clone()))
    }
}

struct Resolvable(bool);

impl HostProber for Resolvable {
    fn resolves(&self, _host: &str, _port: u16) -> bool {
        self.0
    }
}

fn params() -> AuthorityParams {
    AuthorityParams {
        server_name: "directory.internal".to_string(),
        server_username: "svc".to_string(),
        server_password: "s3cret".to_string(),
        ..AuthorityParams::default()
    }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        budget: 5,
        delay: Duration::from_millis(1),
    }
}

fn connector(
    directory: Arc<MockDirectory>,
    params: AuthorityParams,
) -> DirectoryConnector<MockFactory> {
    DirectoryConnector::new(params, MockFactory::new(directory))
        .with_policy(fast_policy())
        .with_prober(Arc::new(Resolvable(true)))
}

#[tokio::test]
async fn known_identity_gets_privilege_and_rights_tokens() {
    let directory = Arc::new(MockDirectory::default().with_user(
        r"CORP\alice",
        UserRecord {
            deleted: false,
            privileges: PRIV_PERM_WORLD,
        },
        vec![101, 205],
    ));
    let connector = connector(directory, params());
    let session = connector.connect().await.unwrap();

    // The raw identity goes through the standard mapping rule first.
    let response = connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap();

    assert_eq!(response.status(), ResponseStatus::Ok);
    assert!(response.contains(GUEST_TOKEN));
    assert!(response.contains("101"));
    assert!(response.contains("205"));
    assert_eq!(response.len(), 3);
}

#[tokio::test]
async fn bypass_privilege_grants_the_system_token() {
    let directory = Arc::new(MockDirectory::default().with_user(
        r"CORP\admin",
        UserRecord {
            deleted: false,
            privileges: PRIV_PERM_BYPASS,
        },
        vec![],
    ));
    let connector = connector(directory, params());
    let session = connector.connect().await.unwrap();

    let response = connector
        .resolve(&session, "Admin@CORP.example.org")
        .await
        .unwrap();

    assert!(response.contains(SYSTEM_TOKEN));
    assert!(!response.contains(GUEST_TOKEN));
}

#[tokio::test]
async fn unknown_identity_reports_user_not_found() {
    let directory = Arc::new(MockDirectory::default());
    let connector = connector(directory.clone(), params());
    let session = connector.connect().await.unwrap();

    let response = connector
        .resolve(&session, "Bob@CORP.example.org")
        .await
        .unwrap();

    assert_eq!(response.status(), ResponseStatus::UserNotFound);
    assert!(response.contains(DENY_TOKEN));
    assert_eq!(response.len(), 1);

    // Not-found is a normal, cacheable outcome.
    connector
        .resolve(&session, "Bob@CORP.example.org")
        .await
        .unwrap();
    assert_eq!(directory.lookup_calls(), 1);
}

#[tokio::test]
async fn deleted_identity_reports_user_not_found() {
    let directory = Arc::new(MockDirectory::default().with_user(
        r"CORP\ghost",
        UserRecord {
            deleted: true,
            privileges: PRIV_PERM_WORLD,
        },
        vec![101],
    ));
    let connector = connector(directory, params());
    let session = connector.connect().await.unwrap();

    let response = connector
        .resolve(&session, "Ghost@CORP.example.org")
        .await
        .unwrap();

    assert_eq!(response.status(), ResponseStatus::UserNotFound);
    assert!(response.contains(DENY_TOKEN), "deleted users must be denied");
}

#[tokio::test]
async fn repeat_resolution_is_served_from_cache() {
    let directory = Arc::new(MockDirectory::default().with_user(
        r"CORP\alice",
        plain_user(),
        vec![101],
    ));
    let connector = connector(directory.clone(), params());
    let session = connector.connect().await.unwrap();

    let first = connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap();
    let second = connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(directory.lookup_calls(), 1);
    assert_eq!(session.cached_responses(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_share_one_upstream_call() {
    let mut directory =
        MockDirectory::default().with_user(r"CORP\alice", plain_user(), vec![101]);
    directory.lookup_delay = Duration::from_millis(200);
    let directory = Arc::new(directory);

    let connector = Arc::new(connector(directory.clone(), params()));
    let session = Arc::new(connector.connect().await.unwrap());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let connector = connector.clone();
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            connector
                .resolve(&session, "Alice@CORP.example.org")
                .await
                .unwrap()
        }));
    }

    let mut responses = Vec::new();
    for handle in handles {
        responses.push(handle.await.unwrap());
    }

    assert_eq!(directory.lookup_calls(), 1);
    for response in &responses {
        assert_eq!(response, &responses[0]);
    }
}

#[tokio::test]
async fn transient_faults_clear_within_the_retry_budget() {
    let mut directory =
        MockDirectory::default().with_user(r"CORP\alice", plain_user(), vec![101]);
    directory.transient_failures = AtomicUsize::new(2);
    let directory = Arc::new(directory);

    let connector = connector(directory.clone(), params());
    let session = connector.connect().await.unwrap();

    let response = connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap();

    assert_eq!(response.status(), ResponseStatus::Ok);
    assert_eq!(directory.lookup_calls(), 3, "two failures plus the success");
}

#[tokio::test]
async fn connectivity_failure_resolves_to_unreachable_without_failing() {
    let mut directory = MockDirectory::default();
    directory.lookup_fault = Some(AuthorityFault::Network {
        message: "connection refused".into(),
    });
    let directory = Arc::new(directory);

    let connector = connector(directory.clone(), params());
    let session = connector.connect().await.unwrap();

    let response = connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap();

    assert_eq!(response.status(), ResponseStatus::Unreachable);
    assert!(response.contains(DENY_TOKEN));
    assert_eq!(directory.lookup_calls(), 1, "interruptions are not retried");
}

#[tokio::test]
async fn unresolvable_host_turns_connectivity_failure_into_configuration_error() {
    let mut directory = MockDirectory::default();
    directory.lookup_fault = Some(AuthorityFault::Network {
        message: "connection refused".into(),
    });
    let connector = DirectoryConnector::new(params(), MockFactory::new(Arc::new(directory)))
        .with_policy(fast_policy())
        .with_prober(Arc::new(Resolvable(false)));
    let session = connector.connect().await.unwrap();

    let err = connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }), "{err}");
}

#[tokio::test]
async fn connect_fails_on_malformed_cache_lifetime() {
    let connector = connector(
        Arc::new(MockDirectory::default()),
        AuthorityParams {
            cache_lifetime: "soon".to_string(),
            ..params()
        },
    );
    let err = connector.connect().await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }), "{err}");
}

#[tokio::test]
async fn connect_fails_on_invalid_mapping_pattern() {
    let connector = connector(
        Arc::new(MockDirectory::default()),
        AuthorityParams {
            user_name_mapping: vec![MappingRule {
                pattern: "([unclosed".to_string(),
                replacement: "$(1)".to_string(),
            }],
            ..params()
        },
    );
    let err = connector.connect().await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }), "{err}");
}

#[tokio::test]
async fn connect_surfaces_session_open_interruptions() {
    let mut factory = MockFactory::new(Arc::new(MockDirectory::default()));
    factory.open_fault = Some(AuthorityFault::Network {
        message: "connection refused".into(),
    });
    let connector = DirectoryConnector::new(params(), factory)
        .with_policy(fast_policy())
        .with_prober(Arc::new(Resolvable(true)));

    let err = connector.connect().await.unwrap_err();
    assert!(matches!(err, Error::Interrupted { .. }), "{err}");

    // Callers fall back to the default response while disconnected.
    assert_eq!(
        connector.default_response().status(),
        ResponseStatus::Unreachable
    );
}

#[tokio::test]
async fn health_check_reports_the_connection_state() {
    let directory = Arc::new(MockDirectory::default().with_user("svc", plain_user(), vec![]));
    let connector = connector(directory, params());
    let session = connector.connect().await.unwrap();
    assert_eq!(connector.check_health(&session).await, Health::Healthy);

    let mut down = MockDirectory::default();
    down.lookup_fault = Some(AuthorityFault::Network {
        message: "connection refused".into(),
    });
    let connector = connector_from(Arc::new(down));
    let session = connector.connect().await.unwrap();
    assert!(matches!(
        connector.check_health(&session).await,
        Health::Interrupted(_)
    ));
}

fn connector_from(directory: Arc<MockDirectory>) -> DirectoryConnector<MockFactory> {
    connector(directory, params())
}

#[tokio::test]
async fn disconnect_releases_the_cache() {
    let directory = Arc::new(MockDirectory::default().with_user(
        r"CORP\alice",
        plain_user(),
        vec![101],
    ));
    let connector = connector(directory, params());
    let session = connector.connect().await.unwrap();

    connector
        .resolve(&session, "Alice@CORP.example.org")
        .await
        .unwrap();
    assert_eq!(session.cached_responses(), 1);

    connector.disconnect(session).await.unwrap();
}
