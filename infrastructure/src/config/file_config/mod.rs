//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod audit;
mod duplicates;
mod output;
mod payment;
mod scoring;

pub use audit::FileAuditConfig;
pub use duplicates::FileDuplicatesConfig;
pub use output::FileOutputConfig;
pub use payment::FilePaymentConfig;
pub use scoring::FileScoringConfig;

use crowdcontrol_application::{AppParams, ConfigIssue, has_errors};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The configuration contains at least one error-severity issue
#[derive(Error, Debug, Clone)]
#[error("Invalid configuration: {}", summarize(.issues))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Duplicate detection thresholds
    pub duplicates: FileDuplicatesConfig,
    pub scoring: FileScoringConfig,
    /// Payment threshold, timeout and fallback routing
    pub payment: FilePaymentConfig,
    /// Audit trail settings
    pub audit: FileAuditConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.duplicates.to_duplicate_params().1);
        issues.extend(self.payment.to_payment_params().1);
        issues
    }

    /// Convert into use case parameters.
    ///
    /// Fails if [`validate`](Self::validate) reports any error.
    pub fn to_params(&self) -> Result<AppParams, ConfigValidationError> {
        let (duplicates, mut issues) = self.duplicates.to_duplicate_params();
        let (payment, payment_issues) = self.payment.to_payment_params();
        issues.extend(payment_issues);

        if has_errors(&issues) {
            return Err(ConfigValidationError { issues });
        }

        Ok(AppParams {
            duplicates,
            scoring: self.scoring.to_scoring_params(),
            payment,
        })
    }
}
