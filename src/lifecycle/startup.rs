//! Startup orchestration.
//!
//! # Responsibilities
//! - Provision the backing store before any listener binds
//! - Classify provisioning failures as retryable or fatal
//! - Retry retryable failures with backoff, up to the configured attempts
//!
//! # Design Decisions
//! - Provisioning never exits the process itself; `main` decides
//! - Listeners start last (traffic only when ready)

use crate::config::{DatabaseConfig, ProvisioningConfig};
use crate::lifecycle::backoff::provisioning_delay;
use crate::store::{provision, ProvisionError, SqlProductStore};

/// Result of one provisioning attempt.
#[derive(Debug)]
pub enum StartupOutcome<T> {
    Ready(T),
    Retryable(ProvisionError),
    Fatal(ProvisionError),
}

impl<T> StartupOutcome<T> {
    pub fn classify(result: Result<T, ProvisionError>) -> Self {
        match result {
            Ok(value) => StartupOutcome::Ready(value),
            Err(e) if e.is_retryable() => StartupOutcome::Retryable(e),
            Err(e) => StartupOutcome::Fatal(e),
        }
    }
}

/// Provision the store, retrying transient failures.
pub async fn provision_with_retry(
    database: &DatabaseConfig,
    policy: &ProvisioningConfig,
) -> Result<SqlProductStore, ProvisionError> {
    retry_startup(policy, || provision(database)).await
}

/// Drive `attempt` until it is ready, fails fatally, or runs out of attempts.
pub async fn retry_startup<T, F, Fut>(policy: &ProvisioningConfig, mut attempt: F) -> Result<T, ProvisionError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProvisionError>>,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match StartupOutcome::classify(attempt().await) {
            StartupOutcome::Ready(value) => {
                tracing::info!(attempts = tries, "Store provisioned");
                return Ok(value);
            }
            StartupOutcome::Fatal(e) => {
                tracing::error!(attempt = tries, error = %e, "Provisioning failed permanently");
                return Err(e);
            }
            StartupOutcome::Retryable(e) if tries >= policy.max_attempts => {
                tracing::error!(attempts = tries, error = %e, "Provisioning attempts exhausted");
                return Err(e);
            }
            StartupOutcome::Retryable(e) => {
                let delay = provisioning_delay(tries, policy);
                tracing::warn!(attempt = tries, delay = ?delay, error = %e, "Provisioning failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
