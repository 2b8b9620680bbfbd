//! Dispatch Payment use case
//!
//! Once an experiment is scored, every contributing worker is owed
//! `base + answer × good answers + rating × good ratings`. The dispatcher
//! computes the amounts, routes each job to the worker's platform (or the
//! fallback platform) and submits all jobs concurrently on the runtime,
//! job by job under a per-job timeout or as one batch per platform.
//! Publishing never waits for the transfers; one slow or failing platform
//! call does not hold up the other workers.

use crate::config::PaymentParams;
use crate::events::{EventBus, EventLog};
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::data_access::{DataAccess, DataAccessError};
use crate::ports::platform::{PaymentPlatform, PlatformError};
use crowdcontrol_domain::{
    DomainError, ExperimentId, PaymentCalculator, PaymentJob, QualityStrategies, ScoringCompleted,
    WorkerId, tally_contributions,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

const SUBSCRIBER: &str = "payment_dispatcher";

/// Errors that prevent dispatching an experiment's payments
#[derive(Error, Debug)]
pub enum PaymentDispatchError {
    #[error("Invalid payment configuration: {0}")]
    Configuration(#[from] DomainError),

    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),

    #[error("Payments for experiment {0} were already dispatched")]
    AlreadyDispatched(ExperimentId),

    #[error("Payment task failed: {0}")]
    Join(String),
}

/// Result of one payment job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub worker: WorkerId,
    pub amount: i64,
    /// Platform the job was routed to, if any
    pub platform: Option<String>,
    pub error: Option<String>,
}

impl JobOutcome {
    fn of(job: &PaymentJob, platform: &str, result: Result<(), PlatformError>) -> Self {
        Self {
            worker: job.worker,
            amount: job.amount,
            platform: Some(platform.to_string()),
            error: result.err().map(|e| e.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated outcome of an experiment's payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReport {
    pub experiment: ExperimentId,
    pub currency: String,
    /// One outcome per worker, ordered by worker id
    pub outcomes: Vec<JobOutcome>,
}

impl PaymentReport {
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(JobOutcome::succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }

    pub fn total_paid(&self) -> i64 {
        self.outcomes
            .iter()
            .filter(|o| o.succeeded())
            .map(|o| o.amount)
            .sum()
    }

    pub fn amount_for(&self, worker: WorkerId) -> Option<i64> {
        self.outcomes
            .iter()
            .find(|o| o.worker == worker)
            .map(|o| o.amount)
    }
}

/// A job together with the platform that will pay it
pub struct RoutedJob {
    pub job: PaymentJob,
    pub platform: Result<Arc<dyn PaymentPlatform>, PlatformError>,
}

/// Use case for paying the workers of a scored experiment
pub struct PaymentDispatcher<D: DataAccess + 'static> {
    data: Arc<D>,
    strategies: QualityStrategies,
    platforms: Vec<Arc<dyn PaymentPlatform>>,
    params: PaymentParams,
    runtime: Handle,
    audit: Arc<dyn AuditLogger>,
    dispatched: Mutex<HashSet<ExperimentId>>,
    pending: Mutex<Vec<JoinHandle<PaymentReport>>>,
}

impl<D: DataAccess + 'static> PaymentDispatcher<D> {
    pub fn new(
        data: Arc<D>,
        strategies: QualityStrategies,
        params: PaymentParams,
        runtime: Handle,
    ) -> Self {
        Self {
            data,
            strategies,
            platforms: Vec::new(),
            params,
            runtime,
            audit: Arc::new(NoAuditLogger),
            dispatched: Mutex::new(HashSet::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Register a platform, replacing one with the same id
    pub fn with_platform(mut self, platform: Arc<dyn PaymentPlatform>) -> Self {
        self.platforms.retain(|p| p.id() != platform.id());
        self.platforms.push(platform);
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Subscribe to `scoring_completed` on the bus
    pub fn subscribe(self: &Arc<Self>, bus: &EventBus) {
        let dispatcher = Arc::clone(self);
        bus.scoring_completed.subscribe(
            SUBSCRIBER,
            move |event: &ScoringCompleted, log: &mut EventLog| {
                dispatcher.on_scoring_completed(event, log);
            },
        );
    }

    /// Start dispatching without waiting for the platforms
    pub fn on_scoring_completed(&self, event: &ScoringCompleted, log: &mut EventLog) {
        if !event.succeeded() {
            warn!(
                "Experiment {} scored with {} failed answer(s), paying anyway",
                event.experiment, event.failed_answers
            );
        }
        match self.dispatch(event.experiment) {
            Ok(handle) => {
                self.pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(handle);
                log.push("dispatched", format!("payments of experiment {} submitted", event.experiment));
            }
            Err(PaymentDispatchError::AlreadyDispatched(id)) => {
                debug!("Payments of experiment {} already dispatched", id);
                log.push("skipped", format!("payments of experiment {} already dispatched", id));
            }
            Err(e) => {
                warn!("Dispatching payments of experiment {} failed: {}", event.experiment, e);
                log.push("dispatch failed", e.to_string());
            }
        }
    }

    /// Compute and route the jobs of an experiment without paying
    pub fn prepare(&self, experiment_id: ExperimentId) -> Result<Vec<RoutedJob>, PaymentDispatchError> {
        let experiment = self.data.get_experiment(experiment_id)?;
        experiment.payment.validate()?;
        let good_rating_threshold = self.strategies.resolve(&experiment)?.good_rating_threshold();

        let answers = self.data.get_answers_of_experiment(experiment_id)?;
        let ratings = self.data.get_ratings_of_experiment(experiment_id)?;
        let contributions = tally_contributions(
            &answers,
            &ratings,
            self.params.good_answer_threshold,
            good_rating_threshold,
        );
        let amounts = PaymentCalculator::calculate(&experiment.payment, &contributions)?;

        Ok(amounts
            .into_iter()
            .map(|(worker, amount)| {
                let context = contributions
                    .get(&worker)
                    .map(|c| c.feedback(&experiment))
                    .unwrap_or_default();
                RoutedJob {
                    job: PaymentJob::new(worker, amount, context),
                    platform: self.route(worker),
                }
            })
            .collect())
    }

    /// Submit the payments of an experiment, at most once
    ///
    /// Returns immediately; the handle resolves when every job finished.
    pub fn dispatch(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<JoinHandle<PaymentReport>, PaymentDispatchError> {
        let first = self
            .dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(experiment_id);
        if !first {
            return Err(PaymentDispatchError::AlreadyDispatched(experiment_id));
        }

        let jobs = match self.prepare(experiment_id) {
            Ok(jobs) => jobs,
            Err(e) => {
                // nothing was paid, a later signal may retry
                self.dispatched
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&experiment_id);
                return Err(e);
            }
        };

        info!(
            "Dispatching {} payment(s) for experiment {}",
            jobs.len(),
            experiment_id
        );
        let timeout = self.params.timeout;
        let currency = self.params.currency.clone();
        let audit = Arc::clone(&self.audit);
        Ok(self.runtime.spawn(async move {
            let outcomes = submit_all(experiment_id, jobs, timeout).await;
            for outcome in &outcomes {
                audit.log(AuditEvent::new(
                    "payment_submitted",
                    json!({
                        "experiment": experiment_id,
                        "worker": outcome.worker,
                        "amount": outcome.amount,
                        "currency": currency,
                        "platform": outcome.platform,
                        "error": outcome.error,
                    }),
                ));
            }
            let report = PaymentReport {
                experiment: experiment_id,
                currency,
                outcomes,
            };
            info!(
                "Experiment {} payments finished: {} paid, {} failed",
                experiment_id,
                report.total_paid(),
                report.failed_count()
            );
            report
        }))
    }

    /// Dispatch and wait for the outcome
    pub async fn execute(&self, experiment_id: ExperimentId) -> Result<PaymentReport, PaymentDispatchError> {
        self.dispatch(experiment_id)?
            .await
            .map_err(|e| PaymentDispatchError::Join(e.to_string()))
    }

    /// Wait for every dispatch started through the bus
    pub async fn drain(&self) -> Vec<PaymentReport> {
        let handles: Vec<_> = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Payment task join error: {}", e),
            }
        }
        reports
    }

    /// The worker's own platform, or the fallback when it cannot pay
    fn route(&self, worker: WorkerId) -> Result<Arc<dyn PaymentPlatform>, PlatformError> {
        let platform_id = match self.data.get_worker(worker) {
            Ok(w) => w.platform,
            Err(e) => return Err(PlatformError::NoPlatform(e.to_string())),
        };
        let own = self
            .platforms
            .iter()
            .find(|p| p.id() == platform_id && p.supports_payment());
        let fallback = || {
            let id = self.params.fallback_platform.as_deref()?;
            self.platforms.iter().find(|p| p.id() == id && p.supports_payment())
        };
        own.or_else(fallback)
            .cloned()
            .ok_or(PlatformError::NoPlatform(platform_id))
    }
}

/// Submit every routed job
///
/// With a per-job timeout each job is its own `pay_worker` call. Without
/// one, the jobs of each platform go out as a single `pay_experiment`
/// batch and timing is left to the platform.
async fn submit_all(
    experiment: ExperimentId,
    jobs: Vec<RoutedJob>,
    timeout: Option<Duration>,
) -> Vec<JobOutcome> {
    let mut join_set: JoinSet<Vec<JobOutcome>> = JoinSet::new();
    let mut outcomes = Vec::with_capacity(jobs.len());
    let mut batches: BTreeMap<String, (Arc<dyn PaymentPlatform>, Vec<PaymentJob>)> = BTreeMap::new();

    for RoutedJob { job, platform } in jobs {
        match (platform, timeout) {
            (Ok(platform), Some(limit)) => {
                join_set.spawn(async move {
                    let result = tokio::time::timeout(limit, platform.pay_worker(&job))
                        .await
                        .unwrap_or(Err(PlatformError::Timeout));
                    vec![JobOutcome::of(&job, platform.id(), result)]
                });
            }
            (Ok(platform), None) => {
                batches
                    .entry(platform.id().to_string())
                    .or_insert_with(|| (platform, Vec::new()))
                    .1
                    .push(job);
            }
            (Err(e), _) => {
                warn!("No platform can pay worker {}: {}", job.worker, e);
                outcomes.push(JobOutcome {
                    worker: job.worker,
                    amount: job.amount,
                    platform: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    for (platform, jobs) in batches.into_values() {
        join_set.spawn(async move {
            debug!("Paying {} job(s) in one batch on {}", jobs.len(), platform.id());
            let mut results = platform.pay_experiment(experiment, &jobs).await.into_iter();
            jobs.iter()
                .map(|job| {
                    let result = results.next().unwrap_or_else(|| {
                        Err(PlatformError::Unavailable("no result for job".to_string()))
                    });
                    JobOutcome::of(job, platform.id(), result)
                })
                .collect()
        });
    }

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(finished) => {
                for outcome in finished {
                    if let Some(error) = &outcome.error {
                        warn!("Payment to worker {} failed: {}", outcome.worker, error);
                    }
                    outcomes.push(outcome);
                }
            }
            Err(e) => warn!("Payment task join error: {}", e),
        }
    }

    outcomes.sort_by_key(|o| o.worker);
    outcomes
}
