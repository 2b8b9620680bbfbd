//! In-memory data access
//!
//! Backs the CLI and integration tests. Every call takes one lock, so a
//! single write is never lost or half-applied.

use super::dataset::Dataset;
use crowdcontrol_application::{DataAccess, DataAccessError};
use crowdcontrol_domain::{
    Answer, AnswerId, Experiment, ExperimentId, ExperimentState, Quality, Rating, RatingId,
    Worker, WorkerId,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct Store {
    experiments: BTreeMap<ExperimentId, Experiment>,
    workers: BTreeMap<WorkerId, Worker>,
    answers: BTreeMap<AnswerId, Answer>,
    ratings: BTreeMap<RatingId, Rating>,
}

/// [`DataAccess`] over in-process maps
#[derive(Debug, Default)]
pub struct InMemoryDataAccess {
    store: Mutex<Store>,
}

impl InMemoryDataAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every record of a dataset; images are left to the image source
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let data = Self::new();
        {
            let mut store = data.lock();
            for experiment in &dataset.experiments {
                store.experiments.insert(experiment.id, experiment.clone());
            }
            for worker in &dataset.workers {
                store.workers.insert(worker.id, worker.clone());
            }
            for answer in &dataset.answers {
                store.answers.insert(answer.id, answer.clone());
            }
            for rating in &dataset.ratings {
                store.ratings.insert(rating.id, rating.clone());
            }
            debug!(
                experiments = store.experiments.len(),
                answers = store.answers.len(),
                ratings = store.ratings.len(),
                workers = store.workers.len(),
                "Loaded dataset"
            );
        }
        data
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Record Management ====================

    pub fn insert_experiment(&self, experiment: Experiment) {
        self.lock().experiments.insert(experiment.id, experiment);
    }

    pub fn insert_worker(&self, worker: Worker) {
        self.lock().workers.insert(worker.id, worker);
    }

    pub fn insert_answer(&self, answer: Answer) {
        self.lock().answers.insert(answer.id, answer);
    }

    pub fn insert_rating(&self, rating: Rating) {
        self.lock().ratings.insert(rating.id, rating);
    }

    /// Move an experiment to a new state, returning the record before and after
    pub fn set_experiment_state(
        &self,
        id: ExperimentId,
        state: ExperimentState,
    ) -> Result<(Experiment, Experiment), DataAccessError> {
        let mut store = self.lock();
        let experiment = store
            .experiments
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("experiment", id.get()))?;
        let old = experiment.clone();
        experiment.state = state;
        Ok((old, experiment.clone()))
    }

    pub fn experiments(&self) -> Vec<Experiment> {
        self.lock().experiments.values().cloned().collect()
    }

    pub fn workers(&self) -> Vec<Worker> {
        self.lock().workers.values().cloned().collect()
    }
}

impl DataAccess for InMemoryDataAccess {
    fn get_experiment(&self, id: ExperimentId) -> Result<Experiment, DataAccessError> {
        self.lock()
            .experiments
            .get(&id)
            .cloned()
            .ok_or_else(|| DataAccessError::not_found("experiment", id.get()))
    }

    fn get_answer(&self, id: AnswerId) -> Result<Answer, DataAccessError> {
        self.lock()
            .answers
            .get(&id)
            .cloned()
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))
    }

    fn get_answers_of_experiment(&self, id: ExperimentId) -> Result<Vec<Answer>, DataAccessError> {
        let store = self.lock();
        if !store.experiments.contains_key(&id) {
            return Err(DataAccessError::not_found("experiment", id.get()));
        }
        let mut answers: Vec<Answer> = store
            .answers
            .values()
            .filter(|a| a.experiment_id == id)
            .cloned()
            .collect();
        answers.sort_by_key(Answer::submission_key);
        Ok(answers)
    }

    fn get_ratings_of_answer(&self, id: AnswerId) -> Result<Vec<Rating>, DataAccessError> {
        let store = self.lock();
        if !store.answers.contains_key(&id) {
            return Err(DataAccessError::not_found("answer", id.get()));
        }
        Ok(store
            .ratings
            .values()
            .filter(|r| r.answer_id == id)
            .cloned()
            .collect())
    }

    fn set_quality_to_answer(&self, id: AnswerId, quality: Quality) -> Result<(), DataAccessError> {
        let mut store = self.lock();
        let answer = store
            .answers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))?;
        answer.quality = Some(quality);
        Ok(())
    }

    fn set_answer_quality_assured(&self, id: AnswerId) -> Result<(), DataAccessError> {
        let mut store = self.lock();
        let answer = store
            .answers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))?;
        answer.quality_assured = true;
        Ok(())
    }

    fn mark_answer_duplicate(&self, id: AnswerId) -> Result<(), DataAccessError> {
        let mut store = self.lock();
        let answer = store
            .answers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))?;
        answer.duplicate = true;
        Ok(())
    }

    fn set_quality_to_ratings(
        &self,
        qualities: &BTreeMap<RatingId, Quality>,
    ) -> Result<(), DataAccessError> {
        let mut store = self.lock();
        // All or nothing
        if let Some(missing) = qualities.keys().find(|id| !store.ratings.contains_key(id)) {
            return Err(DataAccessError::not_found("rating", missing.get()));
        }
        for (id, quality) in qualities {
            if let Some(rating) = store.ratings.get_mut(id) {
                rating.quality = Some(*quality);
            }
        }
        Ok(())
    }

    fn get_worker(&self, id: WorkerId) -> Result<Worker, DataAccessError> {
        self.lock()
            .workers
            .get(&id)
            .cloned()
            .ok_or_else(|| DataAccessError::not_found("worker", id.get()))
    }

    fn credit_worker_balance(&self, id: WorkerId, amount: i64) -> Result<i64, DataAccessError> {
        let mut store = self.lock();
        let worker = store
            .workers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("worker", id.get()))?;
        worker.balance = worker.balance.checked_add(amount).ok_or_else(|| {
            DataAccessError::Storage(format!("balance of worker {} would overflow", id))
        })?;
        Ok(worker.balance)
    }

    fn get_ratings_of_experiment(&self, id: ExperimentId) -> Result<Vec<Rating>, DataAccessError> {
        let store = self.lock();
        if !store.experiments.contains_key(&id) {
            return Err(DataAccessError::not_found("experiment", id.get()));
        }
        Ok(store
            .ratings
            .values()
            .filter(|r| r.experiment_id == id)
            .cloned()
            .collect())
    }
}
