//! Append-only JSONL audit trail.
//!
//! Every [`AuditEvent`] becomes one [`AuditRecord`] line:
//!
//! ```text
//! {"seq":4,"recorded_at":"...","kind":"answer_scored","experiment":1,"details":{...}}
//! ```
//!
//! `seq` keeps counting across runs that share a file, so a trail can be
//! checked for gaps after several `crowdcontrol run` invocations.

use chrono::{DateTime, Utc};
use crowdcontrol_application::{AuditEvent, AuditLogger};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to open an audit trail
#[derive(Error, Debug)]
pub enum AuditTrailError {
    #[error("Could not create audit directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not open audit trail {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: String,
    /// Lifted out of the details when the event names its experiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<u64>,
    pub details: Value,
}

impl AuditRecord {
    fn from_event(seq: u64, event: AuditEvent) -> Self {
        let mut details = event.payload;
        let experiment = match &mut details {
            Value::Object(map) => map.remove("experiment").and_then(|v| v.as_u64()),
            _ => None,
        };
        Self {
            seq,
            recorded_at: Utc::now(),
            kind: event.event_type.to_string(),
            experiment,
            details,
        }
    }
}

struct Trail {
    writer: BufWriter<File>,
    next_seq: u64,
}

/// [`AuditLogger`] writing an [`AuditRecord`] per line
pub struct JsonlAuditLogger {
    trail: Mutex<Trail>,
    path: PathBuf,
}

impl JsonlAuditLogger {
    /// Open (or create) the trail at `path`, continuing its sequence
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditTrailError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| AuditTrailError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(|source| AuditTrailError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let next_seq = BufReader::new(&file).lines().map_while(Result::ok).count() as u64;
        debug!("Audit trail {} continues at seq {}", path.display(), next_seq);

        Ok(Self {
            trail: Mutex::new(Trail {
                writer: BufWriter::new(file),
                next_seq,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLogger for JsonlAuditLogger {
    fn log(&self, event: AuditEvent) {
        let mut trail = self.trail.lock().unwrap_or_else(PoisonError::into_inner);
        let record = AuditRecord::from_event(trail.next_seq, event);

        let written = serde_json::to_writer(&mut trail.writer, &record)
            .map_err(std::io::Error::from)
            .and_then(|_| trail.writer.write_all(b"\n"))
            .and_then(|_| trail.writer.flush());
        match written {
            Ok(()) => trail.next_seq += 1,
            Err(e) => warn!(
                "Dropped audit record {} ({}) for {}: {}",
                record.seq,
                record.kind,
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for JsonlAuditLogger {
    fn drop(&mut self) {
        let trail = self.trail.get_mut().unwrap_or_else(PoisonError::into_inner);
        let _ = trail.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(path: &Path) -> Vec<AuditRecord> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_records_lift_experiment_and_number_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.audit.jsonl");
        let logger = JsonlAuditLogger::open(&path).unwrap();

        logger.log(AuditEvent::new(
            "answer_scored",
            json!({"experiment": 1, "answer": 3, "quality": 7}),
        ));
        logger.log(AuditEvent::new(
            "payment_submitted",
            json!({"experiment": 1, "worker": 2, "amount": 35, "platform": "ledger"}),
        ));
        drop(logger);

        let trail = records(&path);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].seq, 0);
        assert_eq!(trail[0].kind, "answer_scored");
        assert_eq!(trail[0].experiment, Some(1));
        assert_eq!(trail[0].details, json!({"answer": 3, "quality": 7}));
        assert_eq!(trail[1].seq, 1);
        assert_eq!(trail[1].details["platform"], "ledger");
        assert!(trail[0].recorded_at <= trail[1].recorded_at);
    }

    #[test]
    fn test_scalar_details_kept_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scalar.audit.jsonl");
        let logger = JsonlAuditLogger::open(&path).unwrap();

        logger.log(AuditEvent::new("note", json!("just a string")));
        drop(logger);

        let trail = records(&path);
        assert_eq!(trail[0].experiment, None);
        assert_eq!(trail[0].details, json!("just a string"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("\"experiment\""));
    }

    #[test]
    fn test_sequence_continues_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trail.jsonl");

        for _ in 0..2 {
            let logger = JsonlAuditLogger::open(&path).unwrap();
            logger.log(AuditEvent::new("scoring_completed", json!({"experiment": 4})));
            logger.log(AuditEvent::new("payment_submitted", json!({"experiment": 4})));
        }

        let seqs: Vec<u64> = records(&path).iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_open_fails_for_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JsonlAuditLogger::open(dir.path()),
            Err(AuditTrailError::Open { .. })
        ));
    }
}
