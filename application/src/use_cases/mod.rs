//! Use cases (application services)
//!
//! Each use case coordinates domain logic through the ports:
//!
//! - [`detect_duplicates`]: cluster near-identical answers
//! - [`score_experiment`]: the quality orchestrator driven by lifecycle events
//! - [`dispatch_payment`]: pay workers once scoring completed
//! - [`validate_experiment`]: configuration checks before a run

pub mod detect_duplicates;
pub mod dispatch_payment;
pub mod score_experiment;
pub mod validate_experiment;

#[cfg(test)]
pub(crate) mod test_support;
