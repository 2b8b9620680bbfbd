//! Typed event bus
//!
//! Each topic is a typed channel. Publishing delivers the event
//! synchronously, in subscription order, to every current subscriber before
//! `publish` returns. There is no buffering and no replay to late
//! subscribers.
//!
//! Every delivery hands the subscriber a fresh [`EventLog`]. The publisher
//! receives all of them back as an [`Emission`] for debugging and audit;
//! the logs never influence control flow.

mod log;
mod topic;

pub use log::{Emission, EventLog, LogEntry};
pub use topic::Topic;

use crowdcontrol_domain::{ExperimentChanged, RatingCreated, ScoringCompleted};

/// The topics of the scoring core
///
/// Constructed once by the composition root and shared as `Arc<EventBus>`.
pub struct EventBus {
    /// An experiment record changed; carries the old and new record
    pub experiment_changed: Topic<ExperimentChanged>,
    /// A worker rated an answer
    pub rating_created: Topic<RatingCreated>,
    /// Final scoring of an experiment finished
    pub scoring_completed: Topic<ScoringCompleted>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            experiment_changed: Topic::new("experiment_changed"),
            rating_created: Topic::new("rating_created"),
            scoring_completed: Topic::new("scoring_completed"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
