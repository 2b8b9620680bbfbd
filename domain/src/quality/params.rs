//! Algorithm parameter parsing

use crate::core::error::DomainError;
use crate::core::quality::Quality;
use crate::experiment::AlgorithmParams;
use serde::Serialize;
use std::str::FromStr;

/// Parameter key for the lowest quality a strategy assigns
pub const MIN_QUALITY: &str = "min_quality";
/// Parameter key for the highest quality a strategy assigns
pub const MAX_QUALITY: &str = "max_quality";

/// Description of one parameter an algorithm accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub key: &'static str,
    pub description: &'static str,
    /// Accepted value shape, as a regular expression
    pub pattern: &'static str,
    pub default: &'static str,
}

impl ParameterSpec {
    pub const fn new(
        key: &'static str,
        description: &'static str,
        pattern: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            key,
            description,
            pattern,
            default,
        }
    }
}

/// The quality bound parameters every strategy accepts
pub fn bound_parameters() -> [ParameterSpec; 2] {
    [
        ParameterSpec::new(
            MIN_QUALITY,
            "Lowest quality the algorithm assigns",
            "^[0-9]$",
            "0",
        ),
        ParameterSpec::new(
            MAX_QUALITY,
            "Highest quality the algorithm assigns",
            "^[0-9]$",
            "9",
        ),
    ]
}

/// Inclusive range of qualities a strategy may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityBounds {
    min: Quality,
    max: Quality,
}

impl Default for QualityBounds {
    fn default() -> Self {
        Self {
            min: Quality::MIN,
            max: Quality::MAX,
        }
    }
}

impl QualityBounds {
    pub fn new(min: Quality, max: Quality) -> Result<Self, DomainError> {
        if min > max {
            return Err(DomainError::InvalidQualityBounds {
                min: min.value(),
                max: max.value(),
            });
        }
        Ok(Self { min, max })
    }

    /// Read `min_quality` / `max_quality`, defaulting to the full scale
    pub fn from_params(algorithm: &str, params: &AlgorithmParams) -> Result<Self, DomainError> {
        let min = parse_param(algorithm, params, MIN_QUALITY, Quality::MIN)?;
        let max = parse_param(algorithm, params, MAX_QUALITY, Quality::MAX)?;
        Self::new(min, max)
    }

    pub fn min(&self) -> Quality {
        self.min
    }

    pub fn max(&self) -> Quality {
        self.max
    }

    pub fn span(&self) -> i32 {
        i32::from(self.max) - i32::from(self.min)
    }
}

/// Parse one parameter, falling back to `default` when absent
pub fn parse_param<T: FromStr>(
    algorithm: &str,
    params: &AlgorithmParams,
    key: &str,
    default: T,
) -> Result<T, DomainError> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| DomainError::InvalidParameter {
            algorithm: algorithm.to_string(),
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

/// Reject parameter keys the algorithm does not declare
pub fn reject_unknown(
    algorithm: &str,
    params: &AlgorithmParams,
    accepted: &[ParameterSpec],
) -> Result<(), DomainError> {
    match params
        .iter()
        .find(|(key, _)| !accepted.iter().any(|spec| spec.key == key.as_str()))
    {
        Some((key, value)) => Err(DomainError::InvalidParameter {
            algorithm: algorithm.to_string(),
            key: key.clone(),
            value: value.clone(),
        }),
        None => Ok(()),
    }
}

/// Integer division rounding half away from zero
pub(crate) fn div_round(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator.abs() {
        quotient + (numerator.signum() * denominator.signum())
    } else {
        quotient
    }
}
