//! Experiment domain
//!
//! An experiment collects answers and ratings from crowd workers. This crate
//! never mutates its lifecycle state; it only observes `(old, new)` pairs.

pub mod config;
pub mod entities;
pub mod state;

pub use config::{AlgorithmConfig, AlgorithmParams, PaymentConfig};
pub use entities::Experiment;
pub use state::ExperimentState;
