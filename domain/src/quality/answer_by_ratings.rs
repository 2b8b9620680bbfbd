//! Answer quality from the average of its good ratings

use super::params::{QualityBounds, bound_parameters, parse_param};
use super::strategy::{AnswerQualityStrategy, AnswerScore};
use super::ParameterSpec;
use crate::core::error::DomainError;
use crate::core::quality::{Quality, SCALE_SPAN};
use crate::experiment::AlgorithmParams;
use crate::submission::{Answer, Rating};

/// Parameter key for the minimum quality of a good rating
pub const RATING_QUALITY_THRESHOLD: &str = "rating_quality_threshold";

const DEFAULT_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerQualityByRatings;

impl AnswerQualityByRatings {
    pub const NAME: &'static str = "AnswerQualityByRatings";
}

impl AnswerQualityStrategy for AnswerQualityByRatings {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Identifies the quality of an answer as the truncated average of its good ratings, \
         scaled onto the configured quality bounds."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        let mut specs = bound_parameters().to_vec();
        specs.push(ParameterSpec::new(
            RATING_QUALITY_THRESHOLD,
            "Minimum quality a rating needs to count towards the answer",
            "^[0-9]$",
            "5",
        ));
        specs
    }

    fn good_rating_threshold(&self, params: &AlgorithmParams) -> Result<Quality, DomainError> {
        let default = Quality::new(DEFAULT_THRESHOLD)?;
        parse_param(Self::NAME, params, RATING_QUALITY_THRESHOLD, default)
    }

    fn identify(
        &self,
        _answer: &Answer,
        good_ratings: &[Rating],
        params: &AlgorithmParams,
    ) -> Result<AnswerScore, DomainError> {
        let bounds = QualityBounds::from_params(Self::NAME, params)?;
        let values = good_ratings
            .iter()
            .map(Rating::checked_value)
            .collect::<Result<Vec<_>, _>>()?;
        if values.is_empty() {
            return Ok(AnswerScore::Unscored);
        }

        let sum: i64 = values.iter().map(|v| *v as i64).sum();
        let count = values.len() as i64;
        let scaled = sum * bounds.span() as i64 / (SCALE_SPAN as i64 * count);
        let quality = Quality::new(i32::from(bounds.min()) + scaled as i32)?;
        Ok(AnswerScore::Scored {
            quality,
            ratings_used: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn answer() -> Answer {
        Answer::new(1, 1, 1, "text", Utc::now())
    }

    fn ratings(values: &[i32]) -> Vec<Rating> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Rating::new(i as u64 + 1, 1, 1, 2, *v))
            .collect()
    }

    fn score(values: &[i32]) -> AnswerScore {
        AnswerQualityByRatings
            .identify(&answer(), &ratings(values), &AlgorithmParams::new())
            .unwrap()
    }

    #[test]
    fn test_truncated_average() {
        assert_eq!(
            score(&[7, 8]),
            AnswerScore::Scored {
                quality: Quality::new(7).unwrap(),
                ratings_used: 2
            }
        );
        assert_eq!(score(&[9, 9, 8]).quality(), Quality::new(8).ok());
    }

    #[test]
    fn test_no_good_ratings_is_unscored() {
        assert_eq!(score(&[]), AnswerScore::Unscored);
        assert_eq!(score(&[]).quality(), None);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let result = AnswerQualityByRatings.identify(&answer(), &ratings(&[4, 11]), &AlgorithmParams::new());
        assert_eq!(result, Err(DomainError::RatingOutOfRange(11)));
    }

    #[test]
    fn test_threshold_parameter() {
        let mut params = AlgorithmParams::new();
        assert_eq!(
            AnswerQualityByRatings.good_rating_threshold(&params),
            Ok(Quality::new(5).unwrap())
        );
        params.insert(RATING_QUALITY_THRESHOLD.to_string(), "8".to_string());
        assert_eq!(
            AnswerQualityByRatings.good_rating_threshold(&params),
            Ok(Quality::new(8).unwrap())
        );
        params.insert(RATING_QUALITY_THRESHOLD.to_string(), "15".to_string());
        assert!(AnswerQualityByRatings.validate(&params).is_err());
    }

    #[test]
    fn test_custom_bounds() {
        let params: AlgorithmParams = [("min_quality", "2"), ("max_quality", "5")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // 2 + floor(18 * 3 / 18)
        let result = AnswerQualityByRatings
            .identify(&answer(), &ratings(&[9, 9]), &params)
            .unwrap();
        assert_eq!(result.quality(), Quality::new(5).ok());
    }

    proptest! {
        #[test]
        fn prop_default_bounds_match_integer_average(values in proptest::collection::vec(0i32..=9, 1..25)) {
            let expected = values.iter().sum::<i32>() / values.len() as i32;
            prop_assert_eq!(score(&values).quality(), Quality::new(expected).ok());
        }
    }
}
