//! Quality strategies
//!
//! Two swappable strategy families score the work of an experiment:
//!
//! - [`RatingQualityStrategy`]: scores every rating of one answer
//! - [`AnswerQualityStrategy`]: scores an answer from its good ratings
//!
//! Each experiment names one algorithm per family plus its parameters.
//! [`QualityStrategies`] resolves those names and validates the parameters
//! before any scoring run starts.

pub mod answer_by_ratings;
pub mod params;
pub mod rating_distribution;
pub mod registry;
pub mod strategy;

pub use answer_by_ratings::AnswerQualityByRatings;
pub use params::{ParameterSpec, QualityBounds};
pub use rating_distribution::RatingQualityByDistribution;
pub use registry::{AlgorithmInfo, QualityStrategies, ResolvedStrategies, StrategyFamily};
pub use strategy::{AnswerQualityStrategy, AnswerScore, RatingQualityStrategy};
