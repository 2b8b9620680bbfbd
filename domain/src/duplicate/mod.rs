//! Duplicate clustering
//!
//! Answers are compared pairwise; every similar pair is merged into one
//! cluster through a disjoint-set forest, so similarity is treated as
//! transitive. The earliest submission of each cluster stays the
//! representative, all other members are duplicates.
//!
//! Comparing every pair is O(n²) in the number of answers of one
//! experiment.

mod union_find;

pub use union_find::UnionFind;

use crate::core::ids::AnswerId;
use crate::similarity::{Fingerprint, normalize, shingles};
use crate::submission::Answer;
use serde::Serialize;

/// Drop every character that is neither alphanumeric nor whitespace
pub fn canonicalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Precomputed comparison key for an answer's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextKey {
    normalized: String,
    /// `None` when the text is shorter than one shingle
    fingerprint: Option<Fingerprint>,
}

impl TextKey {
    pub fn new(text: &str, shingle_size: usize) -> Self {
        let normalized = normalize(&canonicalize(text));
        let shingle_set = shingles(&normalized, shingle_size);
        let fingerprint = (!shingle_set.is_empty()).then(|| Fingerprint::from_shingles(&shingle_set));
        Self {
            normalized,
            fingerprint,
        }
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Fingerprint similarity, or exact equality for texts too short to
    /// fingerprint
    pub fn similarity(&self, other: &Self) -> f64 {
        match (self.fingerprint, other.fingerprint) {
            (Some(a), Some(b)) => a.similarity(b),
            _ if self.normalized == other.normalized => 1.0,
            _ => 0.0,
        }
    }
}

/// One cluster of mutually similar answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateCluster {
    /// Earliest submission, kept as the non-duplicate
    pub representative: AnswerId,
    /// Every other member, in submission order
    pub duplicates: Vec<AnswerId>,
}

/// Group answers into clusters from the indices of similar pairs
///
/// Only clusters with at least two members are returned, ordered by their
/// representative's submission.
pub fn cluster_answers(
    answers: &[Answer],
    similar_pairs: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<DuplicateCluster> {
    let mut forest = UnionFind::new(answers.len());
    for (a, b) in similar_pairs {
        forest.union(a, b);
    }

    let mut clusters: Vec<DuplicateCluster> = forest
        .groups()
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|mut members| {
            members.sort_by_key(|&i| answers[i].submission_key());
            let representative = answers[members[0]].id;
            let duplicates = members[1..].iter().map(|&i| answers[i].id).collect();
            DuplicateCluster {
                representative,
                duplicates,
            }
        })
        .collect();

    clusters.sort_by_key(|cluster| {
        answers
            .iter()
            .find(|a| a.id == cluster.representative)
            .map(Answer::submission_key)
    });
    clusters
}
