//! Payment platform port
//!
//! A platform transfers money to its workers. Transfers are network I/O,
//! so every call is async and failures come back as values.

use async_trait::async_trait;
use crowdcontrol_domain::{ExperimentId, PaymentJob};
use futures::future::join_all;
use thiserror::Error;

/// Errors that can occur while paying a worker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("No payment platform available for '{0}'")]
    NoPlatform(String),

    #[error("Payment rejected: {0}")]
    Rejected(String),

    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    #[error("Payment timed out")]
    Timeout,
}

/// A crowdsourcing platform that can pay workers
#[async_trait]
pub trait PaymentPlatform: Send + Sync {
    /// Identifier matched against `Worker::platform`
    fn id(&self) -> &str;

    /// Whether this platform can transfer money at all
    fn supports_payment(&self) -> bool {
        true
    }

    /// Pay one worker
    async fn pay_worker(&self, job: &PaymentJob) -> Result<(), PlatformError>;

    /// Pay every job of an experiment; one result per job, in job order
    ///
    /// The dispatcher sends each platform's jobs through here when no
    /// per-job timeout is configured. Platforms with a bulk payment API
    /// override it; a missing result fails its job.
    async fn pay_experiment(
        &self,
        _experiment: ExperimentId,
        jobs: &[PaymentJob],
    ) -> Vec<Result<(), PlatformError>> {
        join_all(jobs.iter().map(|job| self.pay_worker(job))).await
    }
}
