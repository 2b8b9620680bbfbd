//! Progress notification port
//!
//! Defines the interface for reporting progress during a scoring run.

/// Phases of a scoring run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoringPhase {
    Duplicates,
    Ratings,
    Answers,
}

impl ScoringPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPhase::Duplicates => "duplicates",
            ScoringPhase::Ratings => "ratings",
            ScoringPhase::Answers => "answers",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScoringPhase::Duplicates => "Duplicate Detection",
            ScoringPhase::Ratings => "Rating Quality",
            ScoringPhase::Answers => "Answer Quality",
        }
    }
}

impl std::fmt::Display for ScoringPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Callback for progress updates during a scoring run
///
/// Implementations live in the presentation layer.
pub trait ScoringProgress: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: ScoringPhase, total: usize);

    /// Called when one answer completes within a phase
    fn on_item_complete(&self, phase: ScoringPhase, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: ScoringPhase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ScoringProgress for NoProgress {
    fn on_phase_start(&self, _phase: ScoringPhase, _total: usize) {}
    fn on_item_complete(&self, _phase: ScoringPhase, _success: bool) {}
    fn on_phase_complete(&self, _phase: ScoringPhase) {}
}
