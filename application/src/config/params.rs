//! Use case parameters.
//!
//! These are application-layer concerns, not domain policy: the per
//! experiment algorithm settings live on the experiment itself.

use crowdcontrol_domain::{ImageMethod, Quality};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duplicate detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateParams {
    /// Shingle length in characters.
    pub shingle_size: usize,
    /// Two texts are duplicates when their similarity exceeds this.
    pub text_threshold: f64,
    /// Two images are duplicates when their similarity exceeds this.
    pub image_threshold: f64,
    pub image_method: ImageMethod,
}

impl Default for DuplicateParams {
    fn default() -> Self {
        Self {
            shingle_size: 3,
            text_threshold: 0.85,
            image_threshold: 0.92,
            image_method: ImageMethod::Signature,
        }
    }
}

impl DuplicateParams {
    // ==================== Builder Methods ====================

    pub fn with_shingle_size(mut self, size: usize) -> Self {
        self.shingle_size = size;
        self
    }

    pub fn with_text_threshold(mut self, threshold: f64) -> Self {
        self.text_threshold = threshold;
        self
    }

    pub fn with_image_threshold(mut self, threshold: f64) -> Self {
        self.image_threshold = threshold;
        self
    }

    pub fn with_image_method(mut self, method: ImageMethod) -> Self {
        self.image_method = method;
        self
    }
}

/// Scoring run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// Compare and score answers on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ScoringParams {
    pub fn sequential() -> Self {
        Self { parallel: false }
    }
}

/// Payment dispatch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentParams {
    /// Answers at or above this quality count as good.
    pub good_answer_threshold: Quality,
    /// Per-job timeout. `None` leaves timing to the platform.
    pub timeout: Option<Duration>,
    /// Platform used when a worker's own platform cannot pay.
    pub fallback_platform: Option<String>,
    pub currency: String,
}

impl Default for PaymentParams {
    fn default() -> Self {
        Self {
            good_answer_threshold: Quality::new(5).unwrap_or(Quality::MAX),
            timeout: Some(Duration::from_secs(30)),
            fallback_platform: None,
            currency: "EUR".to_string(),
        }
    }
}

impl PaymentParams {
    // ==================== Builder Methods ====================

    pub fn with_good_answer_threshold(mut self, threshold: Quality) -> Self {
        self.good_answer_threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback_platform(mut self, platform: impl Into<String>) -> Self {
        self.fallback_platform = Some(platform.into());
        self
    }
}

/// All use case parameters, as produced by the config loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppParams {
    pub duplicates: DuplicateParams,
    pub scoring: ScoringParams,
    pub payment: PaymentParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = AppParams::default();
        assert_eq!(params.duplicates.shingle_size, 3);
        assert_eq!(params.duplicates.text_threshold, 0.85);
        assert_eq!(params.duplicates.image_method, ImageMethod::Signature);
        assert!(params.scoring.parallel);
        assert_eq!(params.payment.good_answer_threshold.value(), 5);
        assert_eq!(params.payment.timeout, Some(Duration::from_secs(30)));
        assert!(params.payment.fallback_platform.is_none());
    }

    #[test]
    fn test_builder() {
        let duplicates = DuplicateParams::default()
            .with_shingle_size(4)
            .with_text_threshold(0.9)
            .with_image_method(ImageMethod::PerceptualHash);
        assert_eq!(duplicates.shingle_size, 4);
        assert_eq!(duplicates.text_threshold, 0.9);
        assert_eq!(duplicates.image_method, ImageMethod::PerceptualHash);

        let payment = PaymentParams::default()
            .with_timeout(None)
            .with_fallback_platform("ledger");
        assert!(payment.timeout.is_none());
        assert_eq!(payment.fallback_platform.as_deref(), Some("ledger"));
    }
}
