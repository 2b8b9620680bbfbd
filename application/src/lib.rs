//! Application layer for crowdcontrol
//!
//! This crate contains use cases, port definitions, the event bus and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod events;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AppParams, DuplicateParams, PaymentParams, ScoringParams};
pub use events::{Emission, EventBus, EventLog, LogEntry, Topic};
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    data_access::{DataAccess, DataAccessError},
    image_source::{ImageSource, ImageSourceError, NoImages},
    platform::{PaymentPlatform, PlatformError},
    progress::{NoProgress, ScoringPhase, ScoringProgress},
};
pub use use_cases::detect_duplicates::{
    DuplicateDetectionError, DuplicateDetector, DuplicateReport,
};
pub use use_cases::dispatch_payment::{
    JobOutcome, PaymentDispatchError, PaymentDispatcher, PaymentReport, RoutedJob,
};
pub use use_cases::score_experiment::{
    AnswerFailure, QualityOrchestrator, ScoredAnswer, ScoringError, ScoringReport,
};
pub use use_cases::validate_experiment::{ConfigIssue, Severity, has_errors, validate_experiment};
