//! Domain layer for crowdcontrol
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Experiments
//!
//! Workers submit free-text answers to an experiment and rate each other's
//! answers. When the experiment completes (STOPPING → STOPPED) its work is
//! scored once and the workers are paid:
//!
//! 1. **Duplicate detection**: near-identical answers are clustered; only
//!    the earliest of each cluster keeps its quality
//! 2. **Rating quality**: every rating is scored against the others of its
//!    answer
//! 3. **Answer quality**: every answer is scored from its good ratings
//! 4. **Payment**: base amount plus a bonus per good answer and good rating
//!
//! ## Similarity
//!
//! Text is compared by 64-bit simhash fingerprints over character
//! shingles, images by a 5×5 color signature or a perceptual hash.

pub mod config;
pub mod core;
pub mod duplicate;
pub mod event;
pub mod experiment;
pub mod payment;
pub mod quality;
pub mod similarity;
pub mod submission;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    ids::{AnswerId, ExperimentId, RatingId, WorkerId},
    quality::Quality,
};
pub use duplicate::{DuplicateCluster, TextKey, canonicalize, cluster_answers};
pub use event::{ExperimentChanged, RatingCreated, ScoringCompleted};
pub use experiment::{AlgorithmConfig, AlgorithmParams, Experiment, ExperimentState, PaymentConfig};
pub use payment::{PaymentCalculator, PaymentJob, WorkerContribution, tally_contributions};
pub use quality::{
    AlgorithmInfo, AnswerQualityByRatings, AnswerQualityStrategy, AnswerScore, ParameterSpec,
    QualityBounds, QualityStrategies, RatingQualityByDistribution, RatingQualityStrategy,
    ResolvedStrategies, StrategyFamily,
};
pub use similarity::{
    Fingerprint, ImageFingerprint, ImageMethod, ImageSignature, Raster, Rgb, hamming_distance,
    text_similarity,
};
pub use submission::{Answer, Rating, Worker};
