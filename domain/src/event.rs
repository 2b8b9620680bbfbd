//! Event payloads published on the event bus

use crate::core::ids::ExperimentId;
use crate::experiment::{Experiment, ExperimentState};
use crate::submission::Rating;
use serde::Serialize;

/// An experiment was updated; carries the record before and after
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentChanged {
    pub old: Experiment,
    pub new: Experiment,
}

impl ExperimentChanged {
    pub fn new(old: Experiment, new: Experiment) -> Self {
        Self { old, new }
    }

    /// Convenience for a pure state transition
    pub fn transition(experiment: &Experiment, from: ExperimentState, to: ExperimentState) -> Self {
        Self {
            old: experiment.clone().with_state(from),
            new: experiment.clone().with_state(to),
        }
    }

    pub fn experiment_id(&self) -> ExperimentId {
        self.new.id
    }

    /// Whether this change completes the experiment (STOPPING → STOPPED)
    pub fn completes(&self) -> bool {
        self.old.state.completes_with(self.new.state)
    }
}

/// A worker rated an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCreated {
    pub rating: Rating,
}

impl RatingCreated {
    pub fn new(rating: Rating) -> Self {
        Self { rating }
    }
}

/// Final scoring of an experiment finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoringCompleted {
    pub experiment: ExperimentId,
    /// Answers whose scoring failed; completed work is kept
    pub failed_answers: usize,
}

impl ScoringCompleted {
    pub fn succeeded(&self) -> bool {
        self.failed_answers == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_only_from_stopping() {
        let exp = Experiment::new(1, "t");
        assert!(ExperimentChanged::transition(&exp, ExperimentState::Stopping, ExperimentState::Stopped).completes());
        assert!(!ExperimentChanged::transition(&exp, ExperimentState::Published, ExperimentState::Stopped).completes());
        assert!(!ExperimentChanged::transition(&exp, ExperimentState::Stopped, ExperimentState::Stopped).completes());
    }
}
