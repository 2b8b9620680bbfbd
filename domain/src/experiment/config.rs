//! Per-experiment algorithm and payment configuration

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw parameter values keyed by parameter name
///
/// Values stay strings until the owning strategy parses them, so an
/// unparsable value is reported against the algorithm that needs it.
pub type AlgorithmParams = BTreeMap<String, String>;

/// Selected quality algorithm plus its parameter values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Stable algorithm identifier (e.g. "RatingQualityByDistribution")
    pub name: String,
    #[serde(default)]
    pub params: AlgorithmParams,
}

impl AlgorithmConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: AlgorithmParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Payment amounts in the smallest currency unit
///
/// Stored signed so a misconfigured negative amount can be reported
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Paid once to every participating worker
    pub base: i64,
    /// Paid per good answer
    pub answer: i64,
    /// Paid per good rating
    pub rating: i64,
}

impl PaymentConfig {
    pub fn new(base: i64, answer: i64, rating: i64) -> Self {
        Self {
            base,
            answer,
            rating,
        }
    }

    /// Reject negative amounts
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, amount) in [
            ("base", self.base),
            ("answer", self.answer),
            ("rating", self.rating),
        ] {
            if amount < 0 {
                return Err(DomainError::NegativePayment { field, amount });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_validate() {
        assert!(PaymentConfig::new(5, 10, 8).validate().is_ok());
        assert!(PaymentConfig::default().validate().is_ok());
        assert_eq!(
            PaymentConfig::new(5, -1, 8).validate(),
            Err(DomainError::NegativePayment {
                field: "answer",
                amount: -1
            })
        );
    }

    #[test]
    fn test_algorithm_config_params() {
        let config = AlgorithmConfig::new("AnswerQualityByRatings")
            .with_param("rating_quality_threshold", 6);
        assert_eq!(config.param("rating_quality_threshold"), Some("6"));
        assert_eq!(config.param("missing"), None);
    }
}
