//! Strategy traits for the two quality families

use super::params::{ParameterSpec, QualityBounds};
use crate::core::error::DomainError;
use crate::core::ids::RatingId;
use crate::core::quality::Quality;
use crate::experiment::AlgorithmParams;
use crate::submission::{Answer, Rating};
use serde::Serialize;

/// Scores the ratings of one answer
///
/// Implementations are stateless; the parameters of the experiment are
/// passed on every call.
pub trait RatingQualityStrategy: Send + Sync {
    /// Stable identifier stored on experiments
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Parameters this algorithm accepts
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Check the parameters without scoring anything
    fn validate(&self, params: &AlgorithmParams) -> Result<(), DomainError> {
        super::params::reject_unknown(self.name(), params, &self.parameters())?;
        QualityBounds::from_params(self.name(), params).map(|_| ())
    }

    /// Score every rating of one answer
    ///
    /// Fails the whole batch if any rating value is off the scale.
    fn identify(
        &self,
        ratings: &[Rating],
        params: &AlgorithmParams,
    ) -> Result<Vec<(RatingId, Quality)>, DomainError>;
}

/// Outcome of scoring one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerScore {
    Scored { quality: Quality, ratings_used: usize },
    /// No good rating was available; the answer keeps no quality
    Unscored,
}

impl AnswerScore {
    pub fn quality(&self) -> Option<Quality> {
        match self {
            AnswerScore::Scored { quality, .. } => Some(*quality),
            AnswerScore::Unscored => None,
        }
    }
}

/// Scores an answer from its good ratings
pub trait AnswerQualityStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn parameters(&self) -> Vec<ParameterSpec>;

    fn validate(&self, params: &AlgorithmParams) -> Result<(), DomainError> {
        super::params::reject_unknown(self.name(), params, &self.parameters())?;
        QualityBounds::from_params(self.name(), params)?;
        self.good_rating_threshold(params).map(|_| ())
    }

    /// Minimum rating quality for a rating to count as good
    fn good_rating_threshold(&self, params: &AlgorithmParams) -> Result<Quality, DomainError>;

    /// Score one answer; `good_ratings` are already filtered by threshold
    fn identify(
        &self,
        answer: &Answer,
        good_ratings: &[Rating],
        params: &AlgorithmParams,
    ) -> Result<AnswerScore, DomainError>;
}
