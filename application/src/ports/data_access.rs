//! Data access port
//!
//! Persistence of experiments, answers, ratings and workers lives behind
//! this trait. All calls are blocking from the caller's point of view; the
//! implementation is expected to avoid lost updates within one scoring run.

use crowdcontrol_domain::{
    Answer, AnswerId, Experiment, ExperimentId, Quality, Rating, RatingId, Worker, WorkerId,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during data access
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataAccessError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DataAccessError {
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        DataAccessError::NotFound { kind, id }
    }
}

/// Access to persisted crowd work
pub trait DataAccess: Send + Sync {
    fn get_experiment(&self, id: ExperimentId) -> Result<Experiment, DataAccessError>;

    fn get_answer(&self, id: AnswerId) -> Result<Answer, DataAccessError>;

    /// All answers of an experiment, in submission order
    fn get_answers_of_experiment(&self, id: ExperimentId) -> Result<Vec<Answer>, DataAccessError>;

    fn get_ratings_of_answer(&self, id: AnswerId) -> Result<Vec<Rating>, DataAccessError>;

    fn set_quality_to_answer(&self, id: AnswerId, quality: Quality) -> Result<(), DataAccessError>;

    /// Mark an answer's quality as final
    fn set_answer_quality_assured(&self, id: AnswerId) -> Result<(), DataAccessError>;

    fn mark_answer_duplicate(&self, id: AnswerId) -> Result<(), DataAccessError>;

    /// Write the qualities of several ratings at once
    fn set_quality_to_ratings(
        &self,
        qualities: &BTreeMap<RatingId, Quality>,
    ) -> Result<(), DataAccessError>;

    fn get_worker(&self, id: WorkerId) -> Result<Worker, DataAccessError>;

    /// Add `amount` to a worker's balance, returning the new balance
    fn credit_worker_balance(&self, id: WorkerId, amount: i64) -> Result<i64, DataAccessError>;

    /// All ratings given to answers of an experiment
    fn get_ratings_of_experiment(&self, id: ExperimentId) -> Result<Vec<Rating>, DataAccessError> {
        let mut ratings = Vec::new();
        for answer in self.get_answers_of_experiment(id)? {
            ratings.extend(self.get_ratings_of_answer(answer.id)?);
        }
        Ok(ratings)
    }
}
