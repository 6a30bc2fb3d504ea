//! Exact (flat) nearest-neighbor index over stored embeddings.
//!
//! The flat index compares a query against every entry, so results are
//! always exact. It is a derived structure: the database rebuilds it
//! synchronously on every insert and on every load, and it is never
//! persisted on its own.

use rayon::prelude::*;

use crate::embedding::Embedding;
use crate::error::{Result, VisageError};
use crate::metric::DistanceMetric;

/// Below this entry count, scoring runs sequentially.
const PARALLEL_SCORE_THRESHOLD: usize = 100;

/// A single ranked index entry: the record's insertion position and its
/// metric-dependent similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// Position of the matching record in the store's insertion order.
    pub position: usize,
    /// Similarity score under the index's metric.
    pub score: f32,
}

/// An exact brute-force index built from a snapshot of the store.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    metric: DistanceMetric,
    dimension: Option<usize>,
    /// Entries prepared per metric, in insertion order. The entry position
    /// is the join key back to the store's record sequence.
    entries: Vec<Embedding>,
}

impl FlatIndex {
    /// Create an empty index that answers every query with zero hits.
    pub fn empty(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimension: None,
            entries: Vec::new(),
        }
    }

    /// Build an index from the current embedding sequence.
    ///
    /// Pure function of its inputs: cosine entries are stored L2-normalized
    /// for inner-product scoring, euclidean entries are stored as-is. The
    /// cost is O(n·D); callers that rebuild on every insert pay O(n²·D)
    /// over n inserts.
    pub fn build<'a, I>(embeddings: I, metric: DistanceMetric) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Embedding>,
    {
        let mut dimension = None;
        let mut entries = Vec::new();

        for embedding in embeddings {
            match dimension {
                None => dimension = Some(embedding.dimension()),
                Some(expected) => embedding.validate_dimension(expected)?,
            }
            if !embedding.is_valid() {
                return Err(VisageError::index(format!(
                    "embedding at position {} contains non-finite values",
                    entries.len()
                )));
            }
            entries.push(metric.prepare(embedding));
        }

        Ok(Self {
            metric,
            dimension,
            entries,
        })
    }

    /// The metric this index was built under.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The dimension of indexed entries, or `None` if the index is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve the `k` entries most similar to `query`.
    ///
    /// Hits are ordered by descending score, with ties broken by ascending
    /// insertion position. An empty index yields an empty hit list; `k`
    /// larger than the entry count returns only what exists.
    pub fn top_k(&self, query: &Embedding, k: usize) -> Result<Vec<IndexHit>> {
        if k == 0 {
            return Err(VisageError::invalid_argument("top_k must be at least 1"));
        }

        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        query.validate_dimension(dimension)?;
        if !query.is_valid() {
            return Err(VisageError::invalid_argument(
                "query embedding contains non-finite values",
            ));
        }

        let prepared = self.metric.prepare(query);
        let scores = if self.entries.len() < PARALLEL_SCORE_THRESHOLD {
            self.entries
                .iter()
                .map(|entry| self.metric.score(&prepared.data, &entry.data))
                .collect::<Result<Vec<_>>>()?
        } else {
            self.entries
                .par_iter()
                .map(|entry| self.metric.score(&prepared.data, &entry.data))
                .collect::<Result<Vec<_>>>()?
        };

        let mut hits: Vec<IndexHit> = scores
            .into_iter()
            .enumerate()
            .map(|(position, score)| IndexHit { position, score })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);

        Ok(hits)
    }
}
