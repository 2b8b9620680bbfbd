//! In-memory fakes shared by the use case tests

use crate::ports::data_access::{DataAccess, DataAccessError};
use crowdcontrol_domain::{
    Answer, AnswerId, Experiment, ExperimentId, Quality, Rating, RatingId, Worker, WorkerId,
};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    experiments: BTreeMap<ExperimentId, Experiment>,
    answers: BTreeMap<AnswerId, Answer>,
    ratings: BTreeMap<RatingId, Rating>,
    workers: BTreeMap<WorkerId, Worker>,
}

#[derive(Default)]
pub struct MemoryData {
    state: Mutex<State>,
}

impl MemoryData {
    pub fn insert_experiment(&self, experiment: Experiment) {
        self.state.lock().unwrap().experiments.insert(experiment.id, experiment);
    }

    pub fn insert_answer(&self, answer: Answer) {
        self.state.lock().unwrap().answers.insert(answer.id, answer);
    }

    pub fn insert_rating(&self, rating: Rating) {
        self.state.lock().unwrap().ratings.insert(rating.id, rating);
    }

    pub fn insert_worker(&self, worker: Worker) {
        self.state.lock().unwrap().workers.insert(worker.id, worker);
    }

    pub fn rating(&self, id: u64) -> Rating {
        self.state.lock().unwrap().ratings[&RatingId::new(id)].clone()
    }
}

impl DataAccess for MemoryData {
    fn get_experiment(&self, id: ExperimentId) -> Result<Experiment, DataAccessError> {
        let state = self.state.lock().unwrap();
        state
            .experiments
            .get(&id)
            .cloned()
            .ok_or_else(|| DataAccessError::not_found("experiment", id.get()))
    }

    fn get_answer(&self, id: AnswerId) -> Result<Answer, DataAccessError> {
        let state = self.state.lock().unwrap();
        state
            .answers
            .get(&id)
            .cloned()
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))
    }

    fn get_answers_of_experiment(&self, id: ExperimentId) -> Result<Vec<Answer>, DataAccessError> {
        let state = self.state.lock().unwrap();
        let mut answers: Vec<Answer> = state
            .answers
            .values()
            .filter(|a| a.experiment_id == id)
            .cloned()
            .collect();
        answers.sort_by_key(Answer::submission_key);
        Ok(answers)
    }

    fn get_ratings_of_answer(&self, id: AnswerId) -> Result<Vec<Rating>, DataAccessError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ratings
            .values()
            .filter(|r| r.answer_id == id)
            .cloned()
            .collect())
    }

    fn set_quality_to_answer(&self, id: AnswerId, quality: Quality) -> Result<(), DataAccessError> {
        let mut state = self.state.lock().unwrap();
        let answer = state
            .answers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))?;
        answer.quality = Some(quality);
        Ok(())
    }

    fn set_answer_quality_assured(&self, id: AnswerId) -> Result<(), DataAccessError> {
        let mut state = self.state.lock().unwrap();
        let answer = state
            .answers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("answer", id.get()))?;
        answer.quality_assured = true;
        Ok(())
    }

    fn mark_answer_duplicate(&self, id: AnswerId) -> Result<(), DataAccessError> {
        let mut state = self.state.lock().unwrap();
        let answer = state
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
        let mut state = self.state.lock().unwrap();
        for (id, quality) in qualities {
            let rating = state
                .ratings
                .get_mut(id)
                .ok_or_else(|| DataAccessError::not_found("rating", id.get()))?;
            rating.quality = Some(*quality);
        }
        Ok(())
    }

    fn get_worker(&self, id: WorkerId) -> Result<Worker, DataAccessError> {
        let state = self.state.lock().unwrap();
        state
            .workers
            .get(&id)
            .cloned()
            .ok_or_else(|| DataAccessError::not_found("worker", id.get()))
    }

    fn credit_worker_balance(&self, id: WorkerId, amount: i64) -> Result<i64, DataAccessError> {
        let mut state = self.state.lock().unwrap();
        let worker = state
            .workers
            .get_mut(&id)
            .ok_or_else(|| DataAccessError::not_found("worker", id.get()))?;
        worker.balance += amount;
        Ok(worker.balance)
    }
}

/// Three answers rated `[7, 8]`, `[7, 9]` and `[2, 3]`; the first two are
/// near-identical texts.
pub fn scenario(state: crowdcontrol_domain::ExperimentState) -> MemoryData {
    use chrono::{Duration, TimeZone, Utc};
    use crowdcontrol_domain::PaymentConfig;

    let data = MemoryData::default();
    data.insert_experiment(
        Experiment::new(1, "Describe your pet")
            .with_state(state)
            .with_payment(PaymentConfig::new(5, 10, 8)),
    );
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let texts = ["cats are great", "CATS ARE GREAT!!", "dogs are better"];
    for (i, text) in texts.iter().enumerate() {
        let id = i as u64 + 1;
        data.insert_answer(Answer::new(id, 1, id, *text, t0 + Duration::seconds(i as i64)));
        data.insert_worker(Worker::new(id, "mturk"));
    }
    data.insert_worker(Worker::new(10, "pybossa"));
    data.insert_worker(Worker::new(11, "pybossa"));

    let values = [(1, 7), (1, 8), (2, 7), (2, 9), (3, 2), (3, 3)];
    for (i, (answer, value)) in values.into_iter().enumerate() {
        let id = i as u64 + 1;
        let worker = if i % 2 == 0 { 10 } else { 11 };
        data.insert_rating(Rating::new(id, answer, 1, worker, value));
    }
    data
}
