//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_logger;
pub mod data_access;
pub mod image_source;
pub mod platform;
pub mod progress;
