//! Experiment entity

use super::config::{AlgorithmConfig, PaymentConfig};
use super::state::ExperimentState;
use crate::core::ids::ExperimentId;
use crate::quality::{AnswerQualityByRatings, RatingQualityByDistribution};
use serde::{Deserialize, Serialize};

/// An experiment as seen by the scoring core (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub title: String,
    #[serde(default)]
    pub state: ExperimentState,
    /// Algorithm scoring the ratings of each answer
    pub rating_quality: AlgorithmConfig,
    /// Algorithm scoring each answer from its good ratings
    pub answer_quality: AlgorithmConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
}

impl Experiment {
    /// Create an experiment using the default algorithms
    pub fn new(id: impl Into<ExperimentId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: ExperimentState::default(),
            rating_quality: AlgorithmConfig::new(RatingQualityByDistribution::NAME),
            answer_quality: AlgorithmConfig::new(AnswerQualityByRatings::NAME),
            payment: PaymentConfig::default(),
        }
    }

    pub fn with_state(mut self, state: ExperimentState) -> Self {
        self.state = state;
        self
    }

    pub fn with_payment(mut self, payment: PaymentConfig) -> Self {
        self.payment = payment;
        self
    }

    pub fn with_rating_quality(mut self, config: AlgorithmConfig) -> Self {
        self.rating_quality = config;
        self
    }

    pub fn with_answer_quality(mut self, config: AlgorithmConfig) -> Self {
        self.answer_quality = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_algorithms() {
        let exp = Experiment::new(1, "Describe a cat");
        assert_eq!(exp.rating_quality.name, "RatingQualityByDistribution");
        assert_eq!(exp.answer_quality.name, "AnswerQualityByRatings");
        assert_eq!(exp.state, ExperimentState::Created);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "id": 3,
            "title": "t",
            "rating_quality": {"name": "RatingQualityByDistribution"},
            "answer_quality": {"name": "AnswerQualityByRatings", "params": {"rating_quality_threshold": "4"}}
        }"#;
        let exp: Experiment = serde_json::from_str(json).unwrap();
        assert_eq!(exp.id, ExperimentId::new(3));
        assert_eq!(exp.payment, PaymentConfig::default());
        assert_eq!(exp.answer_quality.param("rating_quality_threshold"), Some("4"));
    }
}
