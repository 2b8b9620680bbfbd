//! Rating quality by value distribution
//!
//! Ratings agreeing with the most chosen value get the maximum quality.
//! Every other rating loses quality linearly with its distance from that
//! value, down to the minimum quality at the far end of the scale.

use super::params::{QualityBounds, bound_parameters, div_round};
use super::strategy::RatingQualityStrategy;
use super::ParameterSpec;
use crate::core::error::DomainError;
use crate::core::ids::RatingId;
use crate::core::quality::{Quality, SCALE_SPAN};
use crate::experiment::AlgorithmParams;
use crate::submission::Rating;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingQualityByDistribution;

impl RatingQualityByDistribution {
    pub const NAME: &'static str = "RatingQualityByDistribution";
}

/// The most chosen rating value
///
/// When several values share the highest count, their mean is used,
/// rounded half away from zero. `None` for an empty histogram.
pub fn optimal_rating(histogram: &BTreeMap<u8, usize>) -> Option<u8> {
    let top = *histogram.values().max()?;
    let tied: Vec<i64> = histogram
        .iter()
        .filter(|(_, count)| **count == top)
        .map(|(value, _)| *value as i64)
        .collect();
    let sum: i64 = tied.iter().sum();
    Some(div_round(sum, tied.len() as i64) as u8)
}

impl RatingQualityStrategy for RatingQualityByDistribution {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Identifies the quality of ratings by their distribution. Ratings with the most chosen \
         value get the maximum quality, others lose quality with their distance from it."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        bound_parameters().to_vec()
    }

    fn identify(
        &self,
        ratings: &[Rating],
        params: &AlgorithmParams,
    ) -> Result<Vec<(RatingId, Quality)>, DomainError> {
        let bounds = QualityBounds::from_params(Self::NAME, params)?;

        let values = ratings
            .iter()
            .map(|rating| rating.checked_value().map(|value| (rating.id, value)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut histogram = BTreeMap::new();
        for (_, value) in &values {
            *histogram.entry(*value).or_insert(0usize) += 1;
        }
        let Some(optimal) = optimal_rating(&histogram) else {
            return Ok(Vec::new());
        };

        let max = i32::from(bounds.max()) as i64;
        values
            .into_iter()
            .map(|(id, value)| {
                let deviation = (value as i64 - optimal as i64).abs();
                let penalty = div_round(deviation * bounds.span() as i64, SCALE_SPAN as i64);
                Quality::new((max - penalty) as i32).map(|quality| (id, quality))
            })
            .collect()
    }
}
