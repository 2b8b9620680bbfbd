//! Strategy lookup by stable identifier

use super::answer_by_ratings::AnswerQualityByRatings;
use super::params::ParameterSpec;
use super::rating_distribution::RatingQualityByDistribution;
use super::strategy::{AnswerQualityStrategy, AnswerScore, RatingQualityStrategy};
use crate::core::error::DomainError;
use crate::core::ids::RatingId;
use crate::core::quality::Quality;
use crate::experiment::{AlgorithmParams, Experiment};
use crate::submission::{Answer, Rating};
use serde::Serialize;
use std::sync::Arc;

/// Which strategy family an algorithm belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyFamily {
    Rating,
    Answer,
}

impl StrategyFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyFamily::Rating => "rating",
            StrategyFamily::Answer => "answer",
        }
    }
}

impl std::fmt::Display for StrategyFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog entry describing one registered algorithm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmInfo {
    pub family: StrategyFamily,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

/// Registered quality strategies of both families
#[derive(Clone, Default)]
pub struct QualityStrategies {
    rating: Vec<Arc<dyn RatingQualityStrategy>>,
    answer: Vec<Arc<dyn AnswerQualityStrategy>>,
}

impl QualityStrategies {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in algorithms
    pub fn with_defaults() -> Self {
        Self::new()
            .with_rating_strategy(Arc::new(RatingQualityByDistribution))
            .with_answer_strategy(Arc::new(AnswerQualityByRatings))
    }

    /// Register a rating strategy, replacing one with the same name
    pub fn with_rating_strategy(mut self, strategy: Arc<dyn RatingQualityStrategy>) -> Self {
        self.rating.retain(|s| s.name() != strategy.name());
        self.rating.push(strategy);
        self
    }

    /// Register an answer strategy, replacing one with the same name
    pub fn with_answer_strategy(mut self, strategy: Arc<dyn AnswerQualityStrategy>) -> Self {
        self.answer.retain(|s| s.name() != strategy.name());
        self.answer.push(strategy);
        self
    }

    pub fn rating_strategy(&self, name: &str) -> Option<Arc<dyn RatingQualityStrategy>> {
        self.rating.iter().find(|s| s.name() == name).cloned()
    }

    pub fn answer_strategy(&self, name: &str) -> Option<Arc<dyn AnswerQualityStrategy>> {
        self.answer.iter().find(|s| s.name() == name).cloned()
    }

    /// Resolve and validate the algorithms an experiment names
    ///
    /// Every configuration error surfaces here, before scoring starts.
    pub fn resolve(&self, experiment: &Experiment) -> Result<ResolvedStrategies, DomainError> {
        let rating_name = experiment.rating_quality.name.as_str();
        let rating = self
            .rating_strategy(rating_name)
            .ok_or_else(|| DomainError::UnknownStrategy {
                family: StrategyFamily::Rating.as_str(),
                name: rating_name.to_string(),
            })?;
        let answer_name = experiment.answer_quality.name.as_str();
        let answer = self
            .answer_strategy(answer_name)
            .ok_or_else(|| DomainError::UnknownStrategy {
                family: StrategyFamily::Answer.as_str(),
                name: answer_name.to_string(),
            })?;

        rating.validate(&experiment.rating_quality.params)?;
        answer.validate(&experiment.answer_quality.params)?;
        let good_rating_threshold = answer.good_rating_threshold(&experiment.answer_quality.params)?;

        Ok(ResolvedStrategies {
            rating,
            rating_params: experiment.rating_quality.params.clone(),
            answer,
            answer_params: experiment.answer_quality.params.clone(),
            good_rating_threshold,
        })
    }

    /// Every registered algorithm, rating family first
    pub fn catalog(&self) -> Vec<AlgorithmInfo> {
        let ratings = self.rating.iter().map(|s| AlgorithmInfo {
            family: StrategyFamily::Rating,
            name: s.name(),
            description: s.description(),
            parameters: s.parameters(),
        });
        let answers = self.answer.iter().map(|s| AlgorithmInfo {
            family: StrategyFamily::Answer,
            name: s.name(),
            description: s.description(),
            parameters: s.parameters(),
        });
        ratings.chain(answers).collect()
    }
}

impl std::fmt::Debug for QualityStrategies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityStrategies")
            .field("rating", &self.rating.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("answer", &self.answer.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// The strategies and parameters of one experiment, validated
#[derive(Clone)]
pub struct ResolvedStrategies {
    rating: Arc<dyn RatingQualityStrategy>,
    rating_params: AlgorithmParams,
    answer: Arc<dyn AnswerQualityStrategy>,
    answer_params: AlgorithmParams,
    good_rating_threshold: Quality,
}

impl ResolvedStrategies {
    pub fn rating_algorithm(&self) -> &'static str {
        self.rating.name()
    }

    pub fn answer_algorithm(&self) -> &'static str {
        self.answer.name()
    }

    pub fn good_rating_threshold(&self) -> Quality {
        self.good_rating_threshold
    }

    /// Score the ratings of one answer
    pub fn score_ratings(&self, ratings: &[Rating]) -> Result<Vec<(RatingId, Quality)>, DomainError> {
        self.rating.identify(ratings, &self.rating_params)
    }

    /// Score an answer from those of its ratings that are good
    pub fn score_answer(&self, answer: &Answer, ratings: &[Rating]) -> Result<AnswerScore, DomainError> {
        let good: Vec<Rating> = ratings
            .iter()
            .filter(|r| r.is_good(self.good_rating_threshold))
            .cloned()
            .collect();
        self.answer.identify(answer, &good, &self.answer_params)
    }
}

impl std::fmt::Debug for ResolvedStrategies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedStrategies")
            .field("rating", &self.rating.name())
            .field("rating_params", &self.rating_params)
            .field("answer", &self.answer.name())
            .field("answer_params", &self.answer_params)
            .field("good_rating_threshold", &self.good_rating_threshold)
            .finish()
    }
}
