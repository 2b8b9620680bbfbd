//! Rating entity

use crate::core::error::DomainError;
use crate::core::ids::{AnswerId, ExperimentId, RatingId, WorkerId};
use crate::core::quality::{Quality, check_rating_value};
use serde::{Deserialize, Serialize};

/// A worker's rating of one answer (Entity)
///
/// `value` is kept raw so that a corrupt record reaches the strategies and
/// fails the batch instead of being dropped at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub answer_id: AnswerId,
    pub experiment_id: ExperimentId,
    pub worker_id: WorkerId,
    pub value: i32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub quality: Option<Quality>,
}

impl Rating {
    pub fn new(
        id: impl Into<RatingId>,
        answer_id: impl Into<AnswerId>,
        experiment_id: impl Into<ExperimentId>,
        worker_id: impl Into<WorkerId>,
        value: i32,
    ) -> Self {
        Self {
            id: id.into(),
            answer_id: answer_id.into(),
            experiment_id: experiment_id.into(),
            worker_id: worker_id.into(),
            value,
            feedback: String::new(),
            quality: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = feedback.into();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// The rating value, validated against the scale
    pub fn checked_value(&self) -> Result<u8, DomainError> {
        check_rating_value(self.value)
    }

    /// Whether this rating's own quality reaches the threshold
    pub fn is_good(&self, threshold: Quality) -> bool {
        self.quality.is_some_and(|q| q >= threshold)
    }
}
