//! Payment calculation
//!
//! `amount = base + answer × good answers + rating × good ratings`, paid to
//! every worker who contributed to the experiment.

use crate::core::error::DomainError;
use crate::core::ids::WorkerId;
use crate::core::quality::Quality;
use crate::experiment::{Experiment, PaymentConfig};
use crate::submission::{Answer, Rating};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What one worker contributed to an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerContribution {
    pub answers: usize,
    pub good_answers: usize,
    pub ratings: usize,
    pub good_ratings: usize,
}

impl WorkerContribution {
    /// Plain-text summary sent along with the payment
    pub fn feedback(&self, experiment: &Experiment) -> String {
        format!(
            "Experiment \"{}\": {} of {} answers and {} of {} ratings were accepted as good.",
            experiment.title, self.good_answers, self.answers, self.good_ratings, self.ratings
        )
    }
}

/// Tally contributions per worker
///
/// An answer is good when it is not a duplicate and its quality reaches
/// `good_answer_threshold`; a rating is good when its own quality reaches
/// `good_rating_threshold`.
pub fn tally_contributions<'a>(
    answers: impl IntoIterator<Item = &'a Answer>,
    ratings: impl IntoIterator<Item = &'a Rating>,
    good_answer_threshold: Quality,
    good_rating_threshold: Quality,
) -> BTreeMap<WorkerId, WorkerContribution> {
    let mut tally: BTreeMap<WorkerId, WorkerContribution> = BTreeMap::new();
    for answer in answers {
        let entry = tally.entry(answer.worker_id).or_default();
        entry.answers += 1;
        if answer.is_good(good_answer_threshold) {
            entry.good_answers += 1;
        }
    }
    for rating in ratings {
        let entry = tally.entry(rating.worker_id).or_default();
        entry.ratings += 1;
        if rating.is_good(good_rating_threshold) {
            entry.good_ratings += 1;
        }
    }
    tally
}

/// Maps contributions to amounts
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentCalculator;

impl PaymentCalculator {
    /// Compute the amount owed to every contributing worker
    ///
    /// A negative configured amount is rejected before anything is
    /// computed. An amount that does not fit in `i64` fails the whole
    /// calculation.
    pub fn calculate(
        config: &PaymentConfig,
        contributions: &BTreeMap<WorkerId, WorkerContribution>,
    ) -> Result<BTreeMap<WorkerId, i64>, DomainError> {
        config.validate()?;
        contributions
            .iter()
            .map(|(worker, c)| {
                amount_for(config, c)
                    .map(|amount| (*worker, amount))
                    .ok_or(DomainError::PaymentOverflow { worker: *worker })
            })
            .collect()
    }
}

fn amount_for(config: &PaymentConfig, c: &WorkerContribution) -> Option<i64> {
    let answers = config
        .answer
        .checked_mul(i64::try_from(c.good_answers).ok()?)?;
    let ratings = config
        .rating
        .checked_mul(i64::try_from(c.good_ratings).ok()?)?;
    config.base.checked_add(answers)?.checked_add(ratings)
}

/// One payment handed to a platform (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentJob {
    pub worker: WorkerId,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// Feedback text shown to the worker
    pub context: String,
}

impl PaymentJob {
    pub fn new(worker: WorkerId, amount: i64, context: impl Into<String>) -> Self {
        Self {
            worker,
            amount,
            context: context.into(),
        }
    }
}
