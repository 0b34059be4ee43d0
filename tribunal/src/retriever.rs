//! Candidate retrieval: ranked postings from the similarity index and
//! the deterministic merge that selects which postings get a debate.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{JobPosting, Profile};

/// A posting with its similarity score from the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPosting {
    pub posting: Arc<JobPosting>,
    /// Similarity in [0, 1].
    pub score: f64,
}

impl RankedPosting {
    pub fn new(posting: Arc<JobPosting>, score: f64) -> Self {
        Self { posting, score }
    }
}

/// Error from the similarity index.
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    #[error("similarity index unavailable: {0}")]
    Unavailable(String),
}

/// External similarity index, treated as a ranked-candidate-list provider.
#[async_trait]
pub trait CandidateRetriever: Send + Sync {
    /// Return up to `k` postings ordered by similarity to the profile.
    async fn rank(&self, profile: &Profile, k: usize)
        -> Result<Vec<RankedPosting>, RetrieverError>;
}

/// Select the postings worth debating: score at or above `threshold`,
/// highest first, ties broken by posting id ascending for determinism.
pub fn merge_candidates(mut ranked: Vec<RankedPosting>, threshold: f64) -> Vec<RankedPosting> {
    ranked.retain(|r| r.score >= threshold);
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.posting.id.cmp(&b.posting.id))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn posting(id: &str) -> Arc<JobPosting> {
        Arc::new(JobPosting {
            id: id.into(),
            title: "Engineer".into(),
            org: "Globex".into(),
            required_skills: BTreeSet::new(),
            preferred_skills: BTreeSet::new(),
            description: String::new(),
            min_experience_years: None,
        })
    }

    #[test]
    fn test_merge_filters_below_threshold() {
        let merged = merge_candidates(
            vec![
                RankedPosting::new(posting("a"), 0.9),
                RankedPosting::new(posting("b"), 0.5),
                RankedPosting::new(posting("c"), 0.7),
            ],
            0.7,
        );
        let ids: Vec<_> = merged.iter().map(|r| r.posting.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_merge_orders_by_score_then_id() {
        let merged = merge_candidates(
            vec![
                RankedPosting::new(posting("z"), 0.8),
                RankedPosting::new(posting("a"), 0.8),
                RankedPosting::new(posting("m"), 0.95),
            ],
            0.7,
        );
        let ids: Vec<_> = merged.iter().map(|r| r.posting.id.as_str()).collect();
        assert_eq!(ids, vec!["m", "a", "z"]);
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_candidates(Vec::new(), 0.7).is_empty());
    }
}
