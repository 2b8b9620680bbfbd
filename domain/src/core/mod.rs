//! Core domain concepts shared across all subdomains.
//!
//! - [`quality::Quality`]: a validated quality score in `[0, 9]`
//! - [`ids`]: typed identifiers for experiments, answers, ratings and workers
//! - [`error::DomainError`]: domain-level validation errors

pub mod error;
pub mod ids;
pub mod quality;
