//! Payment platform adapters

mod ledger;

pub use ledger::{LEDGER_PLATFORM, LedgerPlatform};
