//! Duplicate detection configuration from TOML (`[duplicates]` section)

use crowdcontrol_application::{ConfigIssue, DuplicateParams, Severity};
use crowdcontrol_domain::ImageMethod;
use serde::{Deserialize, Serialize};

/// Raw duplicate detection configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDuplicatesConfig {
    /// Character n-gram length
    pub shingle_size: usize,
    pub text_threshold: f64,
    pub image_threshold: f64,
    pub image_method: ImageMethod,
}

impl Default for FileDuplicatesConfig {
    fn default() -> Self {
        let params = DuplicateParams::default();
        Self {
            shingle_size: params.shingle_size,
            text_threshold: params.text_threshold,
            image_threshold: params.image_threshold,
            image_method: params.image_method,
        }
    }
}

impl FileDuplicatesConfig {
    /// Convert to [`DuplicateParams`], replacing invalid values with defaults.
    pub fn to_duplicate_params(&self) -> (DuplicateParams, Vec<ConfigIssue>) {
        let defaults = DuplicateParams::default();
        let mut issues = Vec::new();

        let shingle_size = if self.shingle_size == 0 {
            issues.push(invalid("duplicates.shingle_size must be at least 1".to_string()));
            defaults.shingle_size
        } else {
            self.shingle_size
        };

        let text_threshold = unit_interval(
            "duplicates.text_threshold",
            self.text_threshold,
            defaults.text_threshold,
            &mut issues,
        );
        let image_threshold = unit_interval(
            "duplicates.image_threshold",
            self.image_threshold,
            defaults.image_threshold,
            &mut issues,
        );

        let params = DuplicateParams::default()
            .with_shingle_size(shingle_size)
            .with_text_threshold(text_threshold)
            .with_image_threshold(image_threshold)
            .with_image_method(self.image_method);
        (params, issues)
    }
}

fn unit_interval(field: &str, value: f64, default: f64, issues: &mut Vec<ConfigIssue>) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        issues.push(invalid(format!(
            "{}: {} is outside [0, 1]",
            field, value
        )));
        default
    }
}

fn invalid(message: String) -> ConfigIssue {
    ConfigIssue {
        severity: Severity::Error,
        section: "duplicates",
        message,
    }
}
