//! Experiment lifecycle state

use serde::{Deserialize, Serialize};

/// Lifecycle state of an experiment
///
/// ```text
/// CREATED ──► PUBLISHED ──► STOPPING ──► STOPPED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentState {
    #[default]
    Created,
    Published,
    Stopping,
    Stopped,
}

impl ExperimentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentState::Created => "CREATED",
            ExperimentState::Published => "PUBLISHED",
            ExperimentState::Stopping => "STOPPING",
            ExperimentState::Stopped => "STOPPED",
        }
    }

    /// Whether workers may still submit answers and ratings
    pub fn accepts_work(&self) -> bool {
        matches!(self, ExperimentState::Published | ExperimentState::Stopping)
    }

    /// Whether the `self → next` transition completes the experiment
    ///
    /// Only `STOPPING → STOPPED` finalizes scoring and triggers payment.
    pub fn completes_with(&self, next: ExperimentState) -> bool {
        *self == ExperimentState::Stopping && next == ExperimentState::Stopped
    }
}

impl std::fmt::Display for ExperimentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExperimentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREATED" => Ok(ExperimentState::Created),
            "PUBLISHED" => Ok(ExperimentState::Published),
            "STOPPING" => Ok(ExperimentState::Stopping),
            "STOPPED" => Ok(ExperimentState::Stopped),
            _ => Err(format!(
                "Unknown experiment state: {}. Valid: created, published, stopping, stopped",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_only_from_stopping() {
        use ExperimentState::*;

        assert!(Stopping.completes_with(Stopped));
        assert!(!Published.completes_with(Stopped));
        assert!(!Created.completes_with(Stopped));
        assert!(!Stopped.completes_with(Stopped));
        assert!(!Stopping.completes_with(Published));
    }

    #[test]
    fn test_accepts_work() {
        assert!(ExperimentState::Published.accepts_work());
        assert!(ExperimentState::Stopping.accepts_work());
        assert!(!ExperimentState::Created.accepts_work());
        assert!(!ExperimentState::Stopped.accepts_work());
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(
            "stopping".parse::<ExperimentState>().ok(),
            Some(ExperimentState::Stopping)
        );
        assert!("paused".parse::<ExperimentState>().is_err());
    }
}
