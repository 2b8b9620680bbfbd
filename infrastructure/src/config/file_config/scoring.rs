//! Scoring configuration from TOML (`[scoring]` section)

use crowdcontrol_application::ScoringParams;
use serde::{Deserialize, Serialize};

/// Raw scoring configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScoringConfig {
    /// Score answers on the rayon thread pool
    pub parallel: bool,
}

impl Default for FileScoringConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl FileScoringConfig {
    pub fn to_scoring_params(&self) -> ScoringParams {
        ScoringParams {
            parallel: self.parallel,
        }
    }
}
