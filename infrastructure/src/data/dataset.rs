//! JSON dataset files
//!
//! A dataset is a snapshot of everything the scoring core reads:
//!
//! ```json
//! {
//!   "experiments": [{ "id": 1, "title": "...", "state": "STOPPING", ... }],
//!   "workers":     [{ "id": 1, "platform": "mturk" }],
//!   "answers":     [{ "id": 1, "experiment_id": 1, "worker_id": 1, ... }],
//!   "ratings":     [{ "id": 1, "answer_id": 1, "experiment_id": 1, ... }],
//!   "images":      { "img-1": { "width": 2, "height": 1, "pixels": [[0,0,0],[255,255,255]] } }
//! }
//! ```
//!
//! Images are kept as raw JSON so that a malformed image only fails the
//! comparisons that need it.

use crowdcontrol_domain::{Answer, Experiment, Rating, Worker};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Could not read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },

    #[error("{kind} {id} references unknown {target} {target_id}")]
    DanglingReference {
        kind: &'static str,
        id: u64,
        target: &'static str,
        target_id: u64,
    },
}

/// Crowd work loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub experiments: Vec<Experiment>,
    pub workers: Vec<Worker>,
    pub answers: Vec<Answer>,
    pub ratings: Vec<Rating>,
    /// Image reference → raw raster JSON
    pub images: BTreeMap<String, serde_json::Value>,
}

impl Dataset {
    /// Read and check a dataset file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and check a dataset
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        dataset.check()?;
        Ok(dataset)
    }

    /// Reject duplicate ids and references to records that do not exist
    pub fn check(&self) -> Result<(), DatasetError> {
        let experiments = unique("experiment", self.experiments.iter().map(|e| e.id.get()))?;
        let workers = unique("worker", self.workers.iter().map(|w| w.id.get()))?;
        let answers = unique("answer", self.answers.iter().map(|a| a.id.get()))?;
        unique("rating", self.ratings.iter().map(|r| r.id.get()))?;

        for answer in &self.answers {
            let id = answer.id.get();
            require("answer", id, "experiment", answer.experiment_id.get(), &experiments)?;
            require("answer", id, "worker", answer.worker_id.get(), &workers)?;
        }
        for rating in &self.ratings {
            let id = rating.id.get();
            require("rating", id, "experiment", rating.experiment_id.get(), &experiments)?;
            require("rating", id, "answer", rating.answer_id.get(), &answers)?;
            require("rating", id, "worker", rating.worker_id.get(), &workers)?;
        }
        Ok(())
    }
}

fn unique(
    kind: &'static str,
    ids: impl Iterator<Item = u64>,
) -> Result<HashSet<u64>, DatasetError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DatasetError::DuplicateId { kind, id });
        }
    }
    Ok(seen)
}

fn require(
    kind: &'static str,
    id: u64,
    target: &'static str,
    target_id: u64,
    known: &HashSet<u64>,
) -> Result<(), DatasetError> {
    if known.contains(&target_id) {
        Ok(())
    } else {
        Err(DatasetError::DanglingReference {
            kind,
            id,
            target,
            target_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "experiments": [{
            "id": 1,
            "title": "Describe the picture",
            "state": "STOPPING",
            "rating_quality": { "name": "RatingQualityByDistribution" },
            "answer_quality": { "name": "AnswerQualityByRatings", "params": { "rating_quality_threshold": "6" } },
            "payment": { "base": 5, "answer": 10, "rating": 8 }
        }],
        "workers": [
            { "id": 1, "platform": "mturk" },
            { "id": 2, "platform": "ledger", "balance": 3 }
        ],
        "answers": [{
            "id": 1, "experiment_id": 1, "worker_id": 1,
            "content": "a red square", "image": "img-1",
            "submitted_at": "2024-05-01T10:00:00Z"
        }],
        "ratings": [{
            "id": 1, "answer_id": 1, "experiment_id": 1, "worker_id": 2, "value": 7
        }],
        "images": {
            "img-1": { "width": 1, "height": 1, "pixels": [[255, 0, 0]] }
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let dataset = Dataset::from_json(SAMPLE).unwrap();
        assert_eq!(dataset.experiments.len(), 1);
        assert_eq!(dataset.experiments[0].payment.answer, 10);
        assert_eq!(
            dataset.experiments[0].answer_quality.param("rating_quality_threshold"),
            Some("6")
        );
        assert_eq!(dataset.workers[1].balance, 3);
        assert_eq!(dataset.answers[0].image.as_deref(), Some("img-1"));
        assert!(!dataset.answers[0].quality_assured);
        assert!(dataset.images.contains_key("img-1"));
    }

    #[test]
    fn test_empty_object_is_empty_dataset() {
        let dataset = Dataset::from_json("{}").unwrap();
        assert!(dataset.experiments.is_empty());
        assert!(dataset.images.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"{ "workers": [
            { "id": 4, "platform": "a" },
            { "id": 4, "platform": "b" }
        ] }"#;
        let err = Dataset::from_json(json).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateId { kind: "worker", id: 4 }));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut dataset = Dataset::from_json(SAMPLE).unwrap();
        dataset.ratings[0].answer_id = 99.into();
        let err = dataset.check().unwrap_err();
        assert!(matches!(
            err,
            DatasetError::DanglingReference { target: "answer", target_id: 99, .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_path("/nonexistent/crowdcontrol/dataset.json").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
