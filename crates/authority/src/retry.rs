//! Bounded retry loop over authority operations.

use crate::client::AuthorityFault;
use crate::fault::{FaultClassifier, FaultDisposition};
use authgate_core::{Error, Result, FAILURE_RETRY_COUNT, SHORT_RETRY_DELAY};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Tuning for the short-retry loop.
///
/// The budget exists to install some measure of sanity into situations
/// where the client library gets confused talking to the server: those
/// faults usually clear on an almost immediate reattempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// How many short retries one operation may consume.
    pub budget: u32,
    /// Fixed delay between short retries.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            budget: FAILURE_RETRY_COUNT,
            delay: SHORT_RETRY_DELAY,
        }
    }
}

/// Drives one operation through classification and bounded retry.
///
/// Fatal and interruption classifications terminate immediately, with no
/// sleep. Short-retry classifications sleep the fixed delay and reattempt
/// until the budget is spent, at which point the fault escalates to
/// fatal.
pub struct RetryDriver<'a> {
    policy: &'a RetryPolicy,
    classifier: &'a FaultClassifier,
}

impl<'a> RetryDriver<'a> {
    pub fn new(policy: &'a RetryPolicy, classifier: &'a FaultClassifier) -> Self {
        Self { policy, classifier }
    }

    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, AuthorityFault>>,
    {
        let mut budget = self.policy.budget;
        loop {
            let fault = match operation().await {
                Ok(value) => return Ok(value),
                Err(fault) => fault,
            };
            match self.classifier.classify(&fault) {
                FaultDisposition::Fatal(error)
                | FaultDisposition::Interruption(error)
                | FaultDisposition::Propagate(error) => return Err(error),
                FaultDisposition::ShortRetry(error) => {
                    if budget == 0 {
                        // Budget spent: the "transient" fault was not.
                        return Err(escalate(error));
                    }
                    budget -= 1;
                    warn!(
                        remaining = budget,
                        "retryable authority fault, reattempting: {fault}"
                    );
                    sleep(self.policy.delay).await;
                }
            }
        }
    }
}

fn escalate(error: Error) -> Error {
    match error {
        Error::Transient { message } => Error::Protocol { message },
        other => other,
    }
}
