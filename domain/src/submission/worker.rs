//! Worker entity

use crate::core::ids::WorkerId;
use serde::{Deserialize, Serialize};

/// A crowd worker (Entity)
///
/// The balance is only mutated by the payment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    /// Identifier of the crowdsourcing platform the worker came from
    pub platform: String,
    /// Accrued credit in the smallest currency unit
    #[serde(default)]
    pub balance: i64,
}

impl Worker {
    pub fn new(id: impl Into<WorkerId>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            balance: 0,
        }
    }
}
