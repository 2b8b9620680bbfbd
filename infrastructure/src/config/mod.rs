//! Configuration file loading for crowdcontrol
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CROWDCONTROL_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./crowdcontrol.toml` or `./.crowdcontrol.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/crowdcontrol/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuditConfig, FileConfig, FileDuplicatesConfig, FileOutputConfig,
    FilePaymentConfig, FileScoringConfig,
};
pub use loader::ConfigLoader;
