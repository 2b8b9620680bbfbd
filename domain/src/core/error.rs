//! Domain error types

use crate::core::ids::WorkerId;
use thiserror::Error;

/// Domain-level errors
///
/// Every variant is a validation error: the operation that raised it is
/// rejected as a whole and nothing is computed or written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Rating value {0} is out of range, expected 0 to 9")]
    RatingOutOfRange(i32),

    #[error("Quality value {0} is out of range, expected 0 to 9")]
    QualityOutOfRange(i32),

    #[error("Invalid quality bounds: minimum {min} exceeds maximum {max}")]
    InvalidQualityBounds { min: u8, max: u8 },

    #[error("Payment amount '{field}' must not be negative, got {amount}")]
    NegativePayment { field: &'static str, amount: i64 },

    #[error("Payment for worker {worker} exceeds the representable amount")]
    PaymentOverflow { worker: WorkerId },

    #[error("Unknown {family} quality algorithm: {name}")]
    UnknownStrategy { family: &'static str, name: String },

    #[error("Invalid value '{value}' for parameter '{key}' of algorithm {algorithm}")]
    InvalidParameter {
        algorithm: String,
        key: String,
        value: String,
    },

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl DomainError {
    /// Check if this error was caused by a misconfigured experiment
    /// rather than by submitted data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidQualityBounds { .. }
                | DomainError::NegativePayment { .. }
                | DomainError::PaymentOverflow { .. }
                | DomainError::UnknownStrategy { .. }
                | DomainError::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_out_of_range_display() {
        let error = DomainError::RatingOutOfRange(12);
        assert_eq!(
            error.to_string(),
            "Rating value 12 is out of range, expected 0 to 9"
        );
    }

    #[test]
    fn test_is_configuration_check() {
        assert!(
            DomainError::UnknownStrategy {
                family: "rating",
                name: "nope".to_string()
            }
            .is_configuration()
        );
        assert!(
            DomainError::NegativePayment {
                field: "base",
                amount: -1
            }
            .is_configuration()
        );
        assert!(!DomainError::RatingOutOfRange(-1).is_configuration());
        assert!(!DomainError::InvalidImage("empty".to_string()).is_configuration());
    }
}
