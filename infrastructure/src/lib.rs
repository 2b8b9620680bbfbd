//! Infrastructure layer for crowdcontrol
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod data;
pub mod logging;
pub mod platform;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuditConfig, FileConfig, FileDuplicatesConfig,
    FileOutputConfig, FilePaymentConfig, FileScoringConfig,
};
pub use data::{Dataset, DatasetError, InMemoryDataAccess, InMemoryImageSource};
pub use logging::{AuditRecord, AuditTrailError, JsonlAuditLogger};
pub use platform::{LEDGER_PLATFORM, LedgerPlatform};
