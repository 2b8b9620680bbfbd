//! Detect Duplicates use case
//!
//! Compares every pair of answers of one experiment by text and, when both
//! carry one, by image. Similar pairs are clustered transitively; the
//! earliest answer of each cluster stays, the others become duplicates
//! with quality 0.
//!
//! The comparison is O(n²) in the number of answers.

use crate::config::DuplicateParams;
use crate::ports::data_access::{DataAccess, DataAccessError};
use crate::ports::image_source::ImageSource;
use crowdcontrol_domain::{
    Answer, AnswerId, DuplicateCluster, ImageFingerprint, Quality, TextKey, cluster_answers,
};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while applying duplicate flags
#[derive(Error, Debug)]
pub enum DuplicateDetectionError {
    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),
}

/// Outcome of comparing the answers of one experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub clusters: Vec<DuplicateCluster>,
    /// Number of pairs compared
    pub comparisons: usize,
    /// Images that could not be loaded; their comparisons were skipped
    pub diagnostics: Vec<String>,
}

impl DuplicateReport {
    pub fn duplicate_ids(&self) -> impl Iterator<Item = AnswerId> + '_ {
        self.clusters.iter().flat_map(|c| c.duplicates.iter().copied())
    }

    pub fn duplicate_count(&self) -> usize {
        self.clusters.iter().map(|c| c.duplicates.len()).sum()
    }
}

struct AnswerKey {
    text: TextKey,
    image: Option<ImageFingerprint>,
}

/// Use case for finding duplicate answers
pub struct DuplicateDetector<D: DataAccess + 'static, I: ImageSource + 'static> {
    data: Arc<D>,
    images: Arc<I>,
    params: DuplicateParams,
    parallel: bool,
}

impl<D: DataAccess + 'static, I: ImageSource + 'static> DuplicateDetector<D, I> {
    pub fn new(data: Arc<D>, images: Arc<I>, params: DuplicateParams) -> Self {
        Self {
            data,
            images,
            params,
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Cluster the given answers without writing anything
    ///
    /// A missing or corrupt image never fails the batch: comparisons
    /// involving it fall back to text only, and the failure is recorded as
    /// a diagnostic.
    pub fn detect(&self, answers: &[Answer]) -> DuplicateReport {
        let mut diagnostics = Vec::new();
        let keys: Vec<AnswerKey> = answers
            .iter()
            .map(|answer| AnswerKey {
                text: TextKey::new(&answer.content, self.params.shingle_size),
                image: self.image_key(answer, &mut diagnostics),
            })
            .collect();

        let n = answers.len();
        let comparisons = n * n.saturating_sub(1) / 2;
        let pairs: Vec<(usize, usize)> = if self.parallel {
            (0..n)
                .into_par_iter()
                .flat_map_iter(|i| {
                    let keys = &keys;
                    (i + 1..n)
                        .filter(move |&j| self.is_duplicate(&keys[i], &keys[j]))
                        .map(move |j| (i, j))
                })
                .collect()
        } else {
            (0..n)
                .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
                .filter(|&(i, j)| self.is_duplicate(&keys[i], &keys[j]))
                .collect()
        };
        debug!("{} of {} pairs similar", pairs.len(), comparisons);

        DuplicateReport {
            clusters: cluster_answers(answers, pairs),
            comparisons,
            diagnostics,
        }
    }

    /// Detect duplicates among the answers and flag them
    ///
    /// Duplicates get quality 0 and are marked assured. Answers already
    /// assured take part in clustering but are never rewritten.
    pub fn apply(&self, answers: &[Answer]) -> Result<DuplicateReport, DuplicateDetectionError> {
        let report = self.detect(answers);
        for id in report.duplicate_ids() {
            let assured = answers
                .iter()
                .find(|a| a.id == id)
                .is_some_and(|a| a.quality_assured);
            if assured {
                debug!("Answer {} already assured, keeping it", id);
                continue;
            }
            self.data.mark_answer_duplicate(id)?;
            self.data.set_quality_to_answer(id, Quality::MIN)?;
            self.data.set_answer_quality_assured(id)?;
        }
        info!(
            "Found {} duplicate(s) in {} cluster(s)",
            report.duplicate_count(),
            report.clusters.len()
        );
        Ok(report)
    }

    fn image_key(&self, answer: &Answer, diagnostics: &mut Vec<String>) -> Option<ImageFingerprint> {
        let reference = answer.image.as_deref()?;
        match self.images.load(reference) {
            Ok(raster) => Some(ImageFingerprint::compute(&raster, self.params.image_method)),
            Err(e) => {
                warn!("Skipping image of answer {}: {}", answer.id, e);
                diagnostics.push(format!("answer {}: {}", answer.id, e));
                None
            }
        }
    }

    fn is_duplicate(&self, a: &AnswerKey, b: &AnswerKey) -> bool {
        if a.text.similarity(&b.text) > self.params.text_threshold {
            return true;
        }
        match (&a.image, &b.image) {
            (Some(x), Some(y)) => x
                .similarity(y)
                .is_some_and(|s| s > self.params.image_threshold),
            _ => false,
        }
    }
}
