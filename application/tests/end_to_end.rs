//! End-to-end: lifecycle event → duplicates → scoring → payment

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use crowdcontrol_application::{
    DataAccess, DataAccessError, DuplicateParams, EventBus, NoImages, PaymentDispatcher,
    PaymentParams, PaymentPlatform, PlatformError, QualityOrchestrator,
};
use crowdcontrol_domain::{
    Answer, AnswerId, Experiment, ExperimentChanged, ExperimentId, ExperimentState, PaymentConfig,
    PaymentJob, Quality, QualityStrategies, Rating, RatingId, Worker, WorkerId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Store {
    experiments: BTreeMap<ExperimentId, Experiment>,
    answers: BTreeMap<AnswerId, Answer>,
    ratings: BTreeMap<RatingId, Rating>,
    workers: BTreeMap<WorkerId, Worker>,
}

#[derive(Default)]
struct Database(Mutex<Store>);

impl Database {
    fn with<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }

    fn answer_mut<R>(&self, id: AnswerId, f: impl FnOnce(&mut Answer) -> R) -> Result<R, DataAccessError> {
        self.with(|s| {
            s.answers
                .get_mut(&id)
                .map(f)
                .ok_or_else(|| DataAccessError::not_found("answer", id.get()))
        })
    }
}

impl DataAccess for Database {
    fn get_experiment(&self, id: ExperimentId) -> Result<Experiment, DataAccessError> {
        self.with(|s| s.experiments.get(&id).cloned())
            .ok_or_else(|| DataAccessError::not_found("experiment", id.get()))
    }

    fn get_answer(&self, id: AnswerId) -> Result<Answer, DataAccessError> {
        self.answer_mut(id, |a| a.clone())
    }

    fn get_answers_of_experiment(&self, id: ExperimentId) -> Result<Vec<Answer>, DataAccessError> {
        let mut answers: Vec<Answer> = self.with(|s| {
            s.answers
                .values()
                .filter(|a| a.experiment_id == id)
                .cloned()
                .collect()
        });
        answers.sort_by_key(Answer::submission_key);
        Ok(answers)
    }

    fn get_ratings_of_answer(&self, id: AnswerId) -> Result<Vec<Rating>, DataAccessError> {
        Ok(self.with(|s| {
            s.ratings
                .values()
                .filter(|r| r.answer_id == id)
                .cloned()
                .collect()
        }))
    }

    fn set_quality_to_answer(&self, id: AnswerId, quality: Quality) -> Result<(), DataAccessError> {
        self.answer_mut(id, |a| a.quality = Some(quality))
    }

    fn set_answer_quality_assured(&self, id: AnswerId) -> Result<(), DataAccessError> {
        self.answer_mut(id, |a| a.quality_assured = true)
    }

    fn mark_answer_duplicate(&self, id: AnswerId) -> Result<(), DataAccessError> {
        self.answer_mut(id, |a| a.duplicate = true)
    }

    fn set_quality_to_ratings(
        &self,
        qualities: &BTreeMap<RatingId, Quality>,
    ) -> Result<(), DataAccessError> {
        self.with(|s| {
            for (id, quality) in qualities {
                if let Some(rating) = s.ratings.get_mut(id) {
                    rating.quality = Some(*quality);
                }
            }
        });
        Ok(())
    }

    fn get_worker(&self, id: WorkerId) -> Result<Worker, DataAccessError> {
        self.with(|s| s.workers.get(&id).cloned())
            .ok_or_else(|| DataAccessError::not_found("worker", id.get()))
    }

    fn credit_worker_balance(&self, id: WorkerId, amount: i64) -> Result<i64, DataAccessError> {
        self.with(|s| {
            s.workers.get_mut(&id).map(|w| {
                w.balance += amount;
                w.balance
            })
        })
        .ok_or_else(|| DataAccessError::not_found("worker", id.get()))
    }
}

/// Credits balances directly, like a local ledger
struct Bank(Arc<Database>);

#[async_trait]
impl PaymentPlatform for Bank {
    fn id(&self) -> &str {
        "bank"
    }

    async fn pay_worker(&self, job: &PaymentJob) -> Result<(), PlatformError> {
        self.0
            .credit_worker_balance(job.worker, job.amount)
            .map(|_| ())
            .map_err(|e| PlatformError::Rejected(e.to_string()))
    }
}

struct System {
    db: Arc<Database>,
    bus: Arc<EventBus>,
    dispatcher: Arc<PaymentDispatcher<Database>>,
}

fn system(db: Database) -> System {
    let db = Arc::new(db);
    let bus = Arc::new(EventBus::new());
    let orchestrator = Arc::new(QualityOrchestrator::new(
        Arc::clone(&db),
        Arc::new(NoImages),
        QualityStrategies::with_defaults(),
        DuplicateParams::default(),
    ));
    orchestrator.subscribe(&bus);
    let dispatcher = Arc::new(
        PaymentDispatcher::new(
            Arc::clone(&db),
            QualityStrategies::with_defaults(),
            PaymentParams::default(),
            tokio::runtime::Handle::current(),
        )
        .with_platform(Arc::new(Bank(Arc::clone(&db)))),
    );
    dispatcher.subscribe(&bus);
    System {
        db,
        bus,
        dispatcher,
    }
}

fn seed(db: &Database, experiment: Experiment, answers: &[(u64, u64, &str, [i32; 2])]) {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    db.with(|s| {
        let mut rating_id = 100 * experiment.id.get();
        for (i, (answer_id, worker, text, values)) in answers.iter().enumerate() {
            s.workers
                .entry(WorkerId::new(*worker))
                .or_insert_with(|| Worker::new(*worker, "bank"));
            s.answers.insert(
                AnswerId::new(*answer_id),
                Answer::new(*answer_id, experiment.id, *worker, *text, t0 + Duration::seconds(i as i64)),
            );
            for (j, value) in values.iter().enumerate() {
                rating_id += 1;
                let rater = 50 + j as u64;
                s.workers
                    .entry(WorkerId::new(rater))
                    .or_insert_with(|| Worker::new(rater, "bank"));
                s.ratings.insert(
                    RatingId::new(rating_id),
                    Rating::new(rating_id, *answer_id, experiment.id, rater, *value),
                );
            }
        }
        s.experiments.insert(experiment.id, experiment);
    });
}

fn stop(system: &System, id: u64) {
    let experiment = system.db.get_experiment(ExperimentId::new(id)).unwrap();
    system.bus.experiment_changed.publish(&ExperimentChanged::transition(
        &experiment,
        ExperimentState::Stopping,
        ExperimentState::Stopped,
    ));
}

fn quality(system: &System, id: u64) -> Option<u8> {
    system
        .db
        .get_answer(AnswerId::new(id))
        .unwrap()
        .quality
        .map(Quality::value)
}

#[tokio::test]
async fn duplicate_answers_are_clustered_and_scored() {
    let db = Database::default();
    seed(
        &db,
        Experiment::new(1, "Describe your pet")
            .with_state(ExperimentState::Stopped)
            .with_payment(PaymentConfig::new(5, 10, 8)),
        &[
            (1, 1, "cats are great", [7, 8]),
            (2, 2, "CATS ARE GREAT!!", [7, 9]),
            (3, 3, "dogs are better", [2, 3]),
        ],
    );
    let system = system(db);

    stop(&system, 1);
    let reports = system.dispatcher.drain().await;

    let kept = system.db.get_answer(AnswerId::new(1)).unwrap();
    assert!(!kept.duplicate);
    assert_eq!(kept.quality.map(Quality::value), Some(7));

    let duplicate = system.db.get_answer(AnswerId::new(2)).unwrap();
    assert!(duplicate.duplicate);
    assert_eq!(duplicate.quality.map(Quality::value), Some(0));

    let unique = system.db.get_answer(AnswerId::new(3)).unwrap();
    assert!(!unique.duplicate);
    assert_eq!(unique.quality.map(Quality::value), Some(2));

    assert_eq!(reports.len(), 1);
    assert!(reports[0].succeeded());
    // one good answer
    assert_eq!(system.db.get_worker(WorkerId::new(1)).unwrap().balance, 15);
    assert_eq!(system.db.get_worker(WorkerId::new(2)).unwrap().balance, 5);
}

#[tokio::test]
async fn payment_for_three_good_answers() {
    let db = Database::default();
    seed(
        &db,
        Experiment::new(2, "Name a color")
            .with_state(ExperimentState::Stopped)
            .with_payment(PaymentConfig::new(5, 10, 8)),
        &[
            (21, 7, "deep ocean blue", [8, 8]),
            (22, 7, "bright lemon yellow", [9, 9]),
            (23, 7, "forest green shades", [6, 6]),
        ],
    );
    let system = system(db);

    stop(&system, 2);
    system.dispatcher.drain().await;

    assert_eq!(quality(&system, 21), Some(8));
    assert_eq!(quality(&system, 22), Some(9));
    assert_eq!(quality(&system, 23), Some(6));
    assert_eq!(system.db.get_worker(WorkerId::new(7)).unwrap().balance, 5 + 10 * 3 + 8 * 0);
}

#[tokio::test]
async fn redelivered_stop_changes_nothing() {
    let db = Database::default();
    seed(
        &db,
        Experiment::new(1, "Describe your pet")
            .with_state(ExperimentState::Stopped)
            .with_payment(PaymentConfig::new(5, 10, 8)),
        &[
            (1, 1, "cats are great", [7, 8]),
            (2, 2, "CATS ARE GREAT!!", [7, 9]),
            (3, 3, "dogs are better", [2, 3]),
        ],
    );
    let system = system(db);

    stop(&system, 1);
    system.dispatcher.drain().await;
    let answers = system.db.get_answers_of_experiment(ExperimentId::new(1)).unwrap();
    let balance = system.db.get_worker(WorkerId::new(50)).unwrap().balance;

    stop(&system, 1);
    assert!(system.dispatcher.drain().await.is_empty());
    assert_eq!(system.db.get_answers_of_experiment(ExperimentId::new(1)).unwrap(), answers);
    assert_eq!(system.db.get_worker(WorkerId::new(50)).unwrap().balance, balance);
}
