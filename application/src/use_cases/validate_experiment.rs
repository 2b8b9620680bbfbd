//! Validate Experiment use case
//!
//! Checks an experiment's algorithm and payment configuration before any
//! scoring run, so a bad configuration never produces partially scored
//! data. Every problem is reported, not just the first.

use crowdcontrol_domain::{
    DomainError, Experiment, QualityBounds, QualityStrategies, StrategyFamily,
};
use serde::Serialize;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Fatal: the experiment cannot be scored or paid.
    Error,
    /// Non-fatal: scoring works but may not behave as expected.
    Warning,
}

/// A detected issue in an experiment's configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Configuration section the issue belongs to
    pub section: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn error(section: &'static str, error: &DomainError) -> Self {
        Self {
            severity: Severity::Error,
            section,
            message: error.to_string(),
        }
    }

    fn warning(section: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            section,
            message: message.into(),
        }
    }
}

/// Collect every configuration issue of an experiment
pub fn validate_experiment(experiment: &Experiment, strategies: &QualityStrategies) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let rating = &experiment.rating_quality;
    let rating_check = match strategies.rating_strategy(&rating.name) {
        Some(strategy) => strategy.validate(&rating.params),
        None => Err(DomainError::UnknownStrategy {
            family: StrategyFamily::Rating.as_str(),
            name: rating.name.clone(),
        }),
    };
    if let Err(e) = &rating_check {
        issues.push(ConfigIssue::error("rating_quality", e));
    }

    let answer = &experiment.answer_quality;
    let threshold = match strategies.answer_strategy(&answer.name) {
        Some(strategy) => strategy
            .validate(&answer.params)
            .and_then(|_| strategy.good_rating_threshold(&answer.params)),
        None => Err(DomainError::UnknownStrategy {
            family: StrategyFamily::Answer.as_str(),
            name: answer.name.clone(),
        }),
    };
    if let Err(e) = &threshold {
        issues.push(ConfigIssue::error("answer_quality", e));
    }

    if let Err(e) = experiment.payment.validate() {
        issues.push(ConfigIssue::error("payment", &e));
    }

    // a threshold above the best rating quality makes every answer unscored
    if let (Ok(()), Ok(threshold)) = (&rating_check, &threshold)
        && let Ok(bounds) = QualityBounds::from_params(&rating.name, &rating.params)
        && bounds.max() < *threshold
    {
        issues.push(ConfigIssue::warning(
            "answer_quality",
            format!(
                "good rating threshold {} is above the highest rating quality {}; no answer can be scored",
                threshold,
                bounds.max()
            ),
        ));
    }

    let payment = &experiment.payment;
    if payment.base == 0 && payment.answer == 0 && payment.rating == 0 {
        issues.push(ConfigIssue::warning("payment", "all payment amounts are zero"));
    }

    issues
}

/// Whether any issue is fatal
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdcontrol_domain::{AlgorithmConfig, PaymentConfig};

    fn experiment() -> Experiment {
        Experiment::new(1, "Describe a cat").with_payment(PaymentConfig::new(5, 10, 8))
    }

    #[test]
    fn test_valid_experiment_has_no_issues() {
        let issues = validate_experiment(&experiment(), &QualityStrategies::with_defaults());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_reports_every_error() {
        let exp = experiment()
            .with_rating_quality(AlgorithmConfig::new("Majority"))
            .with_answer_quality(AlgorithmConfig::new("Median"))
            .with_payment(PaymentConfig::new(5, -1, 8));
        let issues = validate_experiment(&exp, &QualityStrategies::with_defaults());
        assert_eq!(issues.len(), 3);
        assert!(has_errors(&issues));
        let sections: Vec<_> = issues.iter().map(|i| i.section).collect();
        assert_eq!(sections, vec!["rating_quality", "answer_quality", "payment"]);
    }

    #[test]
    fn test_warns_on_unreachable_threshold() {
        let exp = experiment()
            .with_rating_quality(
                AlgorithmConfig::new("RatingQualityByDistribution").with_param("max_quality", 4),
            )
            .with_answer_quality(
                AlgorithmConfig::new("AnswerQualityByRatings").with_param("rating_quality_threshold", 6),
            );
        let issues = validate_experiment(&exp, &QualityStrategies::with_defaults());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_warns_on_zero_payment() {
        let exp = experiment().with_payment(PaymentConfig::default());
        let issues = validate_experiment(&exp, &QualityStrategies::with_defaults());
        assert_eq!(issues[0].section, "payment");
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
