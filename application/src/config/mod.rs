//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`DuplicateParams`]: text and image similarity thresholds
//! - [`ScoringParams`]: scoring run control
//! - [`PaymentParams`]: good-answer threshold, platform timeout and fallback
//! - [`AppParams`]: container handed from the config loader to the
//!   composition root

pub mod params;

pub use params::{AppParams, DuplicateParams, PaymentParams, ScoringParams};
