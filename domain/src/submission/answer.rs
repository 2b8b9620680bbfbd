//! Answer entity

use crate::core::ids::{AnswerId, ExperimentId, WorkerId};
use crate::core::quality::Quality;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-text answer submitted by a worker (Entity)
///
/// `quality`, `quality_assured` and `duplicate` are only written by the
/// scoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub experiment_id: ExperimentId,
    pub worker_id: WorkerId,
    pub content: String,
    /// Reference to an attached image, resolved through an image source
    #[serde(default)]
    pub image: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub quality: Option<Quality>,
    #[serde(default)]
    pub quality_assured: bool,
    #[serde(default)]
    pub duplicate: bool,
}

impl Answer {
    pub fn new(
        id: impl Into<AnswerId>,
        experiment_id: impl Into<ExperimentId>,
        worker_id: impl Into<WorkerId>,
        content: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            experiment_id: experiment_id.into(),
            worker_id: worker_id.into(),
            content: content.into(),
            image: None,
            submitted_at,
            quality: None,
            quality_assured: false,
            duplicate: false,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Ordering key for picking a cluster representative: earliest
    /// submission first, lowest id breaks exact ties
    pub fn submission_key(&self) -> (DateTime<Utc>, AnswerId) {
        (self.submitted_at, self.id)
    }

    /// Whether this answer counts as good at the given threshold
    pub fn is_good(&self, threshold: Quality) -> bool {
        !self.duplicate && self.quality.is_some_and(|q| q >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_submission_key_orders_by_time_then_id() {
        let a = Answer::new(5, 1, 1, "a", at(0));
        let b = Answer::new(2, 1, 1, "b", at(1));
        let c = Answer::new(1, 1, 1, "c", at(1));
        assert!(a.submission_key() < b.submission_key());
        assert!(c.submission_key() < b.submission_key());
    }

    #[test]
    fn test_is_good() {
        let threshold = Quality::new(5).unwrap();
        let mut answer = Answer::new(1, 1, 1, "a", at(0));
        assert!(!answer.is_good(threshold));

        answer.quality = Some(Quality::new(6).unwrap());
        assert!(answer.is_good(threshold));

        answer.duplicate = true;
        assert!(!answer.is_good(threshold));
    }
}
