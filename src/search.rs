//! Query execution: ranking, threshold filtering, and identity lookup.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_THRESHOLD, DEFAULT_TOP_K};
use crate::database::FaceRecord;
use crate::embedding::Embedding;
use crate::error::{Result, VisageError};
use crate::index::FlatIndex;

/// Parameters for a recognition query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Minimum similarity score for a result to be included. The scale is
    /// metric-dependent: cosine scores lie in `[-1, 1]`, euclidean-derived
    /// scores in `(0, 1]`.
    pub threshold: f32,
    /// Maximum number of ranked results to return. Must be at least 1.
    pub top_k: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// A single recognition result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionMatch {
    /// Identity label of the matching record.
    pub identity: String,
    /// Similarity score under the database's metric.
    pub score: f32,
}

/// Executes queries against a flat index and its backing record sequence.
///
/// The index reports hit positions; identities are looked up by position in
/// the record sequence, which is the sole correspondence between the two.
pub struct FlatSearcher<'a> {
    index: &'a FlatIndex,
    records: &'a [FaceRecord],
}

impl<'a> FlatSearcher<'a> {
    /// Create a searcher over an index and the records it was built from.
    pub fn new(index: &'a FlatIndex, records: &'a [FaceRecord]) -> Self {
        Self { index, records }
    }

    /// Run a query: retrieve the top-k hits, then keep those at or above
    /// the threshold, ordered by descending score (ties by ascending
    /// insertion position).
    pub fn search(
        &self,
        query: &Embedding,
        request: &SearchRequest,
    ) -> Result<Vec<RecognitionMatch>> {
        let hits = self.index.top_k(query, request.top_k)?;

        let mut matches = Vec::with_capacity(hits.len());
        for hit in hits {
            if hit.score < request.threshold {
                continue;
            }
            let record = self.records.get(hit.position).ok_or_else(|| {
                VisageError::index(format!(
                    "index position {} has no backing record ({} records)",
                    hit.position,
                    self.records.len()
                ))
            })?;
            matches.push(RecognitionMatch {
                identity: record.identity.clone(),
                score: hit.score,
            });
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::DistanceMetric;

    fn sample_records() -> Vec<FaceRecord> {
        vec![
            FaceRecord {
                identity: "alice".to_string(),
                embedding: Embedding::new(vec![1.0, 0.0, 0.0]),
            },
            FaceRecord {
                identity: "bob".to_string(),
                embedding: Embedding::new(vec![0.0, 1.0, 0.0]),
            },
            FaceRecord {
                identity: "carol".to_string(),
                embedding: Embedding::new(vec![0.9, 0.1, 0.0]),
            },
        ]
    }

    #[test]
    fn test_threshold_filters_after_ranking() {
        let records = sample_records();
        let index = FlatIndex::build(
            records.iter().map(|r| &r.embedding),
            DistanceMetric::Cosine,
        )
        .unwrap();
        let searcher = FlatSearcher::new(&index, &records);

        let request = SearchRequest {
            threshold: 0.5,
            top_k: 3,
        };
        let matches = searcher
            .search(&Embedding::new(vec![1.0, 0.0, 0.0]), &request)
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].identity, "alice");
        assert_eq!(matches[1].identity, "carol");
        assert!(matches.iter().all(|m| m.score >= request.threshold));
    }

    #[test]
    fn test_default_request_uses_configured_defaults() {
        let request = SearchRequest::default();
        assert_eq!(request.threshold, DEFAULT_THRESHOLD);
        assert_eq!(request.top_k, DEFAULT_TOP_K);
    }
}
