//! Ledger payment platform
//!
//! Pays a worker by crediting the balance kept in the data store. Used
//! directly for workers registered on the ledger and as the fallback for
//! platforms that cannot transfer money themselves.

use async_trait::async_trait;
use crowdcontrol_application::{DataAccess, DataAccessError, PaymentPlatform, PlatformError};
use crowdcontrol_domain::PaymentJob;
use std::sync::Arc;
use tracing::info;

/// Platform id of the ledger
pub const LEDGER_PLATFORM: &str = "ledger";

/// [`PaymentPlatform`] crediting worker balances through [`DataAccess`]
pub struct LedgerPlatform<D: DataAccess + 'static> {
    data: Arc<D>,
    id: String,
}

impl<D: DataAccess + 'static> LedgerPlatform<D> {
    pub fn new(data: Arc<D>) -> Self {
        Self {
            data,
            id: LEDGER_PLATFORM.to_string(),
        }
    }

    /// Register the ledger under a different platform id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

#[async_trait]
impl<D: DataAccess + 'static> PaymentPlatform for LedgerPlatform<D> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn pay_worker(&self, job: &PaymentJob) -> Result<(), PlatformError> {
        if job.amount < 0 {
            return Err(PlatformError::Rejected(format!(
                "negative amount {} for worker {}",
                job.amount, job.worker
            )));
        }

        let balance = self
            .data
            .credit_worker_balance(job.worker, job.amount)
            .map_err(|e| match e {
                DataAccessError::NotFound { .. } => PlatformError::Rejected(e.to_string()),
                DataAccessError::Storage(_) => PlatformError::Unavailable(e.to_string()),
            })?;

        info!(
            "Ledger credited worker {} with {} (balance {})",
            job.worker, job.amount, balance
        );
        Ok(())
    }
}
