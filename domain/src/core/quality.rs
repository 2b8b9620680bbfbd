//! Quality value object
//!
//! Rating values, answer qualities and rating qualities all live on the same
//! ten-step scale. Values outside the scale are rejected, never clamped.

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lowest value on the rating/quality scale
pub const SCALE_MIN: i32 = 0;
/// Highest value on the rating/quality scale
pub const SCALE_MAX: i32 = 9;
/// Largest possible distance between two values on the scale
pub const SCALE_SPAN: i32 = SCALE_MAX - SCALE_MIN;

/// A quality score in `[0, 9]`
///
/// # Example
///
/// ```
/// use crowdcontrol_domain::Quality;
///
/// let q = Quality::new(7).unwrap();
/// assert_eq!(q.value(), 7);
/// assert!(Quality::new(10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(SCALE_MIN as u8);
    pub const MAX: Quality = Quality(SCALE_MAX as u8);

    /// Create a quality, failing if the value is off the scale
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
            return Err(DomainError::QualityOutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<i32> for Quality {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for i32 {
    fn from(q: Quality) -> Self {
        q.0 as i32
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Quality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i32 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::QualityOutOfRange(i32::MIN))?;
        Self::new(value)
    }
}

/// Validate a raw rating value against the scale
pub fn check_rating_value(value: i32) -> Result<u8, DomainError> {
    if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
        return Err(DomainError::RatingOutOfRange(value));
    }
    Ok(value as u8)
}
