//! Payment configuration from TOML (`[payment]` section)

use crowdcontrol_application::{ConfigIssue, PaymentParams, Severity};
use crowdcontrol_domain::Quality;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw payment configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePaymentConfig {
    /// Answers at or above this quality are paid
    pub good_answer_threshold: i32,
    /// Per-job platform timeout; absent leaves timing to the platform
    pub timeout_seconds: Option<u64>,
    pub currency: String,
    /// Platform id used when a worker's platform cannot pay
    pub fallback_platform: Option<String>,
}

impl Default for FilePaymentConfig {
    fn default() -> Self {
        Self {
            good_answer_threshold: 5,
            timeout_seconds: Some(30),
            currency: "EUR".to_string(),
            fallback_platform: None,
        }
    }
}

impl FilePaymentConfig {
    /// Convert to [`PaymentParams`], replacing invalid values with defaults.
    pub fn to_payment_params(&self) -> (PaymentParams, Vec<ConfigIssue>) {
        let defaults = PaymentParams::default();
        let mut issues = Vec::new();

        let threshold = match Quality::new(self.good_answer_threshold) {
            Ok(q) => q,
            Err(e) => {
                issues.push(invalid(format!("payment.good_answer_threshold: {}", e)));
                defaults.good_answer_threshold
            }
        };

        let timeout = match self.timeout_seconds {
            Some(0) => {
                issues.push(invalid(
                    "payment.timeout_seconds must be greater than 0; omit it to disable".to_string(),
                ));
                defaults.timeout
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let currency = if self.currency.trim().is_empty() {
            issues.push(invalid("payment.currency must not be empty".to_string()));
            defaults.currency.clone()
        } else {
            self.currency.clone()
        };

        let mut params = PaymentParams {
            currency,
            ..defaults
        }
        .with_good_answer_threshold(threshold)
        .with_timeout(timeout);

        match self.fallback_platform.as_deref().map(str::trim) {
            Some("") => issues.push(invalid(
                "payment.fallback_platform must not be empty".to_string(),
            )),
            Some(id) => params = params.with_fallback_platform(id),
            None => {}
        }

        (params, issues)
    }
}

fn invalid(message: String) -> ConfigIssue {
    ConfigIssue {
        severity: Severity::Error,
        section: "payment",
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converts_cleanly() {
        let (params, issues) = FilePaymentConfig::default().to_payment_params();
        assert!(issues.is_empty());
        assert_eq!(params, PaymentParams::default());
    }

    #[test]
    fn test_threshold_off_scale() {
        let config = FilePaymentConfig {
            good_answer_threshold: 12,
            ..Default::default()
        };
        let (params, issues) = config.to_payment_params();
        assert_eq!(issues.len(), 1);
        assert_eq!(params.good_answer_threshold.value(), 5);
    }

    #[test]
    fn test_zero_timeout_is_error_but_absent_is_fine() {
        let zero = FilePaymentConfig {
            timeout_seconds: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.to_payment_params().1.len(), 1);

        let absent = FilePaymentConfig {
            timeout_seconds: None,
            ..Default::default()
        };
        let (params, issues) = absent.to_payment_params();
        assert!(issues.is_empty());
        assert_eq!(params.timeout, None);
    }

    #[test]
    fn test_fallback_platform() {
        let config = FilePaymentConfig {
            fallback_platform: Some("ledger".to_string()),
            ..Default::default()
        };
        let (params, _) = config.to_payment_params();
        assert_eq!(params.fallback_platform.as_deref(), Some("ledger"));

        let blank = FilePaymentConfig {
            fallback_platform: Some("  ".to_string()),
            ..Default::default()
        };
        let (params, issues) = blank.to_payment_params();
        assert_eq!(issues.len(), 1);
        assert_eq!(params.fallback_platform, None);
    }
}
