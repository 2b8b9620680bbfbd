//! Score Experiment use case
//!
//! The quality orchestrator reacts to experiment lifecycle events. When an
//! experiment moves from STOPPING to STOPPED it runs, in strict order:
//!
//! 1. Duplicate detection over all answers
//! 2. Rating quality for the ratings of every answer not yet assured
//! 3. Answer quality for every such answer that is not a duplicate
//! 4. A `scoring_completed` event for the payment dispatcher
//!
//! Assured answers are never rescored, so a redelivered transition is
//! harmless. A failure on one answer is recorded and the others continue;
//! completed work is kept.
//!
//! While an experiment still accepts work, every new rating triggers an
//! interim rescoring of its answer that never marks it assured.

use crate::config::{DuplicateParams, ScoringParams};
use crate::events::{EventBus, EventLog};
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::data_access::{DataAccess, DataAccessError};
use crate::ports::image_source::ImageSource;
use crate::ports::progress::{NoProgress, ScoringPhase, ScoringProgress};
use crate::use_cases::detect_duplicates::{
    DuplicateDetectionError, DuplicateDetector, DuplicateReport,
};
use crowdcontrol_domain::{
    Answer, AnswerId, AnswerScore, DomainError, ExperimentChanged, ExperimentId, Quality,
    QualityStrategies, Rating, RatingCreated, RatingId, ResolvedStrategies, ScoringCompleted,
};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use thiserror::Error;
use tracing::{debug, info, warn};

const SUBSCRIBER: &str = "quality_orchestrator";

/// Errors that abort a whole scoring run
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid experiment configuration: {0}")]
    Configuration(#[from] DomainError),

    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),

    #[error("Duplicate detection failed: {0}")]
    Duplicates(#[from] DuplicateDetectionError),

    #[error("Scoring of experiment {0} is already running")]
    AlreadyRunning(ExperimentId),
}

/// Scoring of one answer that failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFailure {
    pub answer: AnswerId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAnswer {
    pub answer: AnswerId,
    pub score: AnswerScore,
}

/// Outcome of one scoring run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringReport {
    pub experiment: ExperimentId,
    pub duplicates: DuplicateReport,
    pub ratings_scored: usize,
    /// Non-duplicate answers scored in this run
    pub answers: Vec<ScoredAnswer>,
    /// Answers left alone because they were already assured
    pub skipped_assured: usize,
    pub failures: Vec<AnswerFailure>,
}

impl ScoringReport {
    fn new(experiment: ExperimentId) -> Self {
        Self {
            experiment,
            duplicates: DuplicateReport::default(),
            ratings_scored: 0,
            answers: Vec::new(),
            skipped_assured: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every answer was scored without error
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn score_of(&self, answer: AnswerId) -> Option<AnswerScore> {
        self.answers
            .iter()
            .find(|a| a.answer == answer)
            .map(|a| a.score)
    }

    pub fn unscored_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.score == AnswerScore::Unscored)
            .count()
    }

    fn fail(&mut self, answer: AnswerId, error: impl ToString) {
        let error = error.to_string();
        warn!("Scoring answer {} failed: {}", answer, error);
        self.failures.push(AnswerFailure { answer, error });
    }
}

/// Removes the experiment from the running set when the run ends
struct RunGuard<'a> {
    running: &'a Mutex<HashSet<ExperimentId>>,
    experiment: ExperimentId,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a Mutex<HashSet<ExperimentId>>, experiment: ExperimentId) -> Option<Self> {
        let inserted = running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(experiment);
        inserted.then_some(Self {
            running,
            experiment,
        })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.experiment);
    }
}

/// Map over items, on the rayon pool when `parallel` is set
fn map_items<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Use case sequencing duplicate detection and quality scoring
pub struct QualityOrchestrator<D: DataAccess + 'static, I: ImageSource + 'static> {
    data: Arc<D>,
    detector: DuplicateDetector<D, I>,
    strategies: QualityStrategies,
    params: ScoringParams,
    progress: Arc<dyn ScoringProgress>,
    audit: Arc<dyn AuditLogger>,
    running: Mutex<HashSet<ExperimentId>>,
    /// Serializes final and interim quality writes per experiment
    writers: Mutex<HashMap<ExperimentId, Arc<Mutex<()>>>>,
    reports: Mutex<HashMap<ExperimentId, ScoringReport>>,
}

impl<D: DataAccess + 'static, I: ImageSource + 'static> QualityOrchestrator<D, I> {
    pub fn new(
        data: Arc<D>,
        images: Arc<I>,
        strategies: QualityStrategies,
        duplicates: DuplicateParams,
    ) -> Self {
        let params = ScoringParams::default();
        Self {
            detector: DuplicateDetector::new(Arc::clone(&data), images, duplicates)
                .with_parallel(params.parallel),
            data,
            strategies,
            params,
            progress: Arc::new(NoProgress),
            audit: Arc::new(NoAuditLogger),
            running: Mutex::new(HashSet::new()),
            writers: Mutex::new(HashMap::new()),
            reports: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_scoring_params(mut self, params: ScoringParams) -> Self {
        self.detector = self.detector.with_parallel(params.parallel);
        self.params = params;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ScoringProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Subscribe to experiment and rating events on the bus
    ///
    /// The bus is held weakly, so subscribing does not keep it alive.
    pub fn subscribe(self: &Arc<Self>, bus: &Arc<EventBus>) {
        let orchestrator = Arc::clone(self);
        let weak_bus = Arc::downgrade(bus);
        bus.experiment_changed.subscribe(
            SUBSCRIBER,
            move |event: &ExperimentChanged, log: &mut EventLog| {
                let bus = weak_bus.upgrade();
                orchestrator.on_experiment_changed(event, log, bus.as_deref());
            },
        );

        let orchestrator = Arc::clone(self);
        bus.rating_created.subscribe(
            SUBSCRIBER,
            move |event: &RatingCreated, log: &mut EventLog| {
                orchestrator.on_rating_created(event, log);
            },
        );
    }

    /// The report of the latest run for an experiment
    pub fn latest_report(&self, experiment: ExperimentId) -> Option<ScoringReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&experiment)
            .cloned()
    }

    /// Handle an experiment change; only STOPPING → STOPPED does anything
    pub fn on_experiment_changed(
        &self,
        event: &ExperimentChanged,
        log: &mut EventLog,
        bus: Option<&EventBus>,
    ) {
        if !event.completes() {
            debug!(
                "Ignoring transition {} -> {} of experiment {}",
                event.old.state,
                event.new.state,
                event.experiment_id()
            );
            return;
        }

        let experiment = event.experiment_id();
        match self.run(experiment) {
            Ok(report) => {
                log.push(
                    "scored",
                    format!(
                        "experiment {}: {} answer(s) scored, {} duplicate(s), {} failure(s)",
                        experiment,
                        report.answers.len(),
                        report.duplicates.duplicate_count(),
                        report.failures.len()
                    ),
                );
                for diagnostic in &report.duplicates.diagnostics {
                    log.push("image skipped", diagnostic.clone());
                }
                for failure in &report.failures {
                    log.push(
                        "answer failed",
                        format!("answer {}: {}", failure.answer, failure.error),
                    );
                }

                if let Some(bus) = bus {
                    let completed = ScoringCompleted {
                        experiment,
                        failed_answers: report.failures.len(),
                    };
                    let emission = bus.scoring_completed.publish(&completed);
                    for (subscriber, entry) in emission.entries() {
                        log.push(format!("{}: {}", subscriber, entry.short), entry.long.clone());
                    }
                }
            }
            Err(ScoringError::AlreadyRunning(id)) => {
                info!("Scoring of experiment {} already running, ignoring", id);
                log.push("skipped", format!("scoring of experiment {} already running", id));
            }
            Err(e) => {
                warn!("Scoring of experiment {} failed: {}", experiment, e);
                log.push("scoring failed", e.to_string());
            }
        }
    }

    /// Handle a new rating with an interim rescoring of its answer
    pub fn on_rating_created(&self, event: &RatingCreated, log: &mut EventLog) {
        match self.rescore_interim(&event.rating) {
            Ok(Some(score)) => {
                log.push(
                    "interim",
                    format!("answer {}: {:?}", event.rating.answer_id, score),
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Interim scoring for rating {} failed: {}", event.rating.id, e);
                log.push("interim failed", e.to_string());
            }
        }
    }

    /// Run the final scoring of an experiment
    pub fn run(&self, experiment_id: ExperimentId) -> Result<ScoringReport, ScoringError> {
        let Some(_guard) = RunGuard::acquire(&self.running, experiment_id) else {
            return Err(ScoringError::AlreadyRunning(experiment_id));
        };
        // Waits for an interim rescoring of this experiment to finish
        let writer = self.writer(experiment_id);
        let _writing = writer.lock().unwrap_or_else(PoisonError::into_inner);

        let experiment = self.data.get_experiment(experiment_id)?;
        let strategies = self.strategies.resolve(&experiment)?;
        info!(
            "Scoring experiment {} ({} / {})",
            experiment_id,
            strategies.rating_algorithm(),
            strategies.answer_algorithm()
        );

        let answers = self.data.get_answers_of_experiment(experiment_id)?;
        let pending: Vec<AnswerId> = answers
            .iter()
            .filter(|a| !a.quality_assured)
            .map(|a| a.id)
            .collect();

        let mut report = ScoringReport::new(experiment_id);
        report.skipped_assured = answers.len() - pending.len();

        // Step 1
        self.progress
            .on_phase_start(ScoringPhase::Duplicates, answers.len());
        report.duplicates = self.detector.apply(&answers)?;
        self.progress.on_phase_complete(ScoringPhase::Duplicates);
        self.audit.log(AuditEvent::new(
            "duplicates_detected",
            json!({
                "experiment": experiment_id,
                "comparisons": report.duplicates.comparisons,
                "clusters": report.duplicates.clusters,
                "diagnostics": report.duplicates.diagnostics,
            }),
        ));

        if pending.is_empty() {
            info!("Experiment {}: every answer already assured", experiment_id);
            self.store(&report);
            return Ok(report);
        }

        // Step 2
        let rated = self.score_ratings(&pending, &strategies, &mut report);

        // Step 3
        self.score_answers(rated, &strategies, &mut report);

        info!(
            "Experiment {} scored: {} answer(s), {} unscored, {} failure(s)",
            experiment_id,
            report.answers.len(),
            report.unscored_count(),
            report.failures.len()
        );
        self.audit.log(AuditEvent::new(
            "scoring_completed",
            json!({
                "experiment": experiment_id,
                "answers": report.answers.len(),
                "ratings": report.ratings_scored,
                "duplicates": report.duplicates.duplicate_count(),
                "failures": report.failures,
            }),
        ));
        self.store(&report);
        Ok(report)
    }

    /// Score and write the ratings of every pending answer
    ///
    /// Returns the answers whose ratings were written, with their updated
    /// ratings. Answers that failed are recorded in the report.
    fn score_ratings(
        &self,
        pending: &[AnswerId],
        strategies: &ResolvedStrategies,
        report: &mut ScoringReport,
    ) -> Vec<(Answer, Vec<Rating>)> {
        self.progress
            .on_phase_start(ScoringPhase::Ratings, pending.len());

        let mut loaded = Vec::with_capacity(pending.len());
        for &id in pending {
            let answer = self.data.get_answer(id);
            let ratings = self.data.get_ratings_of_answer(id);
            match (answer, ratings) {
                (Ok(answer), Ok(ratings)) => loaded.push((answer, ratings)),
                (Err(e), _) | (_, Err(e)) => {
                    report.fail(id, e);
                    self.progress.on_item_complete(ScoringPhase::Ratings, false);
                }
            }
        }

        let scored = map_items(&loaded, self.params.parallel, |(_, ratings)| {
            strategies.score_ratings(ratings)
        });

        let mut rated = Vec::with_capacity(loaded.len());
        for ((answer, mut ratings), result) in loaded.into_iter().zip(scored) {
            let written = result
                .map(|qualities| qualities.into_iter().collect::<BTreeMap<RatingId, Quality>>())
                .map_err(|e| e.to_string())
                .and_then(|qualities| {
                    self.data
                        .set_quality_to_ratings(&qualities)
                        .map(|_| qualities)
                        .map_err(|e| e.to_string())
                });
            match written {
                Ok(qualities) => {
                    for rating in &mut ratings {
                        rating.quality = qualities.get(&rating.id).copied();
                    }
                    report.ratings_scored += qualities.len();
                    self.progress.on_item_complete(ScoringPhase::Ratings, true);
                    rated.push((answer, ratings));
                }
                Err(e) => {
                    report.fail(answer.id, e);
                    self.progress.on_item_complete(ScoringPhase::Ratings, false);
                }
            }
        }

        self.progress.on_phase_complete(ScoringPhase::Ratings);
        rated
    }

    /// Score and write every non-duplicate answer from its good ratings
    fn score_answers(
        &self,
        rated: Vec<(Answer, Vec<Rating>)>,
        strategies: &ResolvedStrategies,
        report: &mut ScoringReport,
    ) {
        let candidates: Vec<(Answer, Vec<Rating>)> =
            rated.into_iter().filter(|(answer, _)| !answer.duplicate).collect();
        self.progress
            .on_phase_start(ScoringPhase::Answers, candidates.len());

        let scores = map_items(&candidates, self.params.parallel, |(answer, ratings)| {
            strategies.score_answer(answer, ratings)
        });

        for ((answer, _), result) in candidates.iter().zip(scores) {
            let outcome = result
                .map_err(|e| e.to_string())
                .and_then(|score| self.write_final(answer.id, score).map_err(|e| e.to_string()));
            match outcome {
                Ok(score) => {
                    debug!("Answer {} scored: {:?}", answer.id, score);
                    self.audit.log(AuditEvent::new(
                        "answer_scored",
                        json!({
                            "experiment": report.experiment,
                            "answer": answer.id,
                            "worker": answer.worker_id,
                            "score": score,
                        }),
                    ));
                    report.answers.push(ScoredAnswer {
                        answer: answer.id,
                        score,
                    });
                    self.progress.on_item_complete(ScoringPhase::Answers, true);
                }
                Err(e) => {
                    report.fail(answer.id, e);
                    self.progress.on_item_complete(ScoringPhase::Answers, false);
                }
            }
        }

        self.progress.on_phase_complete(ScoringPhase::Answers);
    }

    fn write_final(&self, answer: AnswerId, score: AnswerScore) -> Result<AnswerScore, DataAccessError> {
        if let Some(quality) = score.quality() {
            self.data.set_quality_to_answer(answer, quality)?;
            self.data.set_answer_quality_assured(answer)?;
        }
        Ok(score)
    }

    fn writer(&self, experiment: ExperimentId) -> Arc<Mutex<()>> {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(writers.entry(experiment).or_default())
    }

    /// Rescore one answer while its experiment still accepts work
    ///
    /// Runs only while no final scoring of the experiment holds the writer
    /// lock. State and assurance are read under the lock, so an answer the
    /// final scoring has assured is never overwritten.
    fn rescore_interim(&self, rating: &Rating) -> Result<Option<AnswerScore>, ScoringError> {
        let writer = self.writer(rating.experiment_id);
        let _writing = match writer.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!(
                    "Final scoring of experiment {} in progress, no interim scoring",
                    rating.experiment_id
                );
                return Ok(None);
            }
        };

        let experiment = self.data.get_experiment(rating.experiment_id)?;
        if !experiment.state.accepts_work() {
            debug!(
                "Experiment {} is {}, no interim scoring",
                experiment.id, experiment.state
            );
            return Ok(None);
        }
        let is_running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&experiment.id);
        if is_running {
            return Ok(None);
        }

        let answer = self.data.get_answer(rating.answer_id)?;
        if answer.quality_assured {
            return Ok(None);
        }

        let strategies = self.strategies.resolve(&experiment)?;
        let mut ratings = self.data.get_ratings_of_answer(answer.id)?;
        let qualities: BTreeMap<RatingId, Quality> =
            strategies.score_ratings(&ratings)?.into_iter().collect();
        self.data.set_quality_to_ratings(&qualities)?;
        for rating in &mut ratings {
            rating.quality = qualities.get(&rating.id).copied();
        }

        let score = strategies.score_answer(&answer, &ratings)?;
        if let Some(quality) = score.quality() {
            self.data.set_quality_to_answer(answer.id, quality)?;
        }
        Ok(Some(score))
    }

    fn store(&self, report: &ScoringReport) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(report.experiment, report.clone());
    }
}
