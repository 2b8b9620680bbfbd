//! Port for the structured audit trail.
//!
//! Defines the [`AuditLogger`] trait for recording scoring and payment
//! events (duplicates found, answers scored, payments submitted) to a
//! machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures what was
//! decided about each answer and worker.

use serde_json::Value;

/// A structured audit event.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The adapter adds the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Event type identifier (e.g., "answer_scored", "payment_submitted").
    pub event_type: &'static str,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging audit events.
///
/// `log` is synchronous and infallible; an adapter that cannot write
/// drops the event.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
