//! Audit trail configuration from TOML (`[audit]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw audit configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// JSONL file receiving audit events; no file means no audit trail
    pub path: Option<PathBuf>,
}
