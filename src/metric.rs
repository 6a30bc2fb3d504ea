//! Distance metrics for embedding similarity scoring.

use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::{Result, VisageError};

/// Distance metric used to compare embeddings, fixed at database construction.
///
/// The metric determines both how vectors are prepared when the index is
/// built and how raw index scores map to similarity scores:
///
/// - `Cosine`: vectors are L2-normalized and scored by inner product, so the
///   score is the cosine similarity in `[-1, 1]`.
/// - `Euclidean`: vectors are stored as-is and scored by squared L2
///   distance `d`, reported as the similarity `1 / (1 + d)` in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity over unit-normalized vectors.
    #[default]
    Cosine,
    /// Similarity derived from squared Euclidean (L2) distance.
    Euclidean,
}

impl DistanceMetric {
    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }

    /// Parse a distance metric from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            _ => Err(VisageError::invalid_argument(format!(
                "Unknown distance metric: {s}"
            ))),
        }
    }

    /// Prepare an embedding for indexing or querying under this metric.
    ///
    /// Cosine normalizes to unit length (zero vectors stay as-is and score
    /// 0 against anything); Euclidean keeps the vector untouched.
    pub fn prepare(&self, embedding: &Embedding) -> Embedding {
        match self {
            DistanceMetric::Cosine => embedding.normalized(),
            DistanceMetric::Euclidean => embedding.clone(),
        }
    }

    /// Score a prepared query against a prepared index entry.
    ///
    /// Both sides must have been run through [`DistanceMetric::prepare`]
    /// with the same metric.
    pub fn score(&self, query: &[f32], entry: &[f32]) -> Result<f32> {
        if query.len() != entry.len() {
            return Err(VisageError::dimension_mismatch(entry.len(), query.len()));
        }

        let score = match self {
            DistanceMetric::Cosine => query.iter().zip(entry.iter()).map(|(x, y)| x * y).sum(),
            DistanceMetric::Euclidean => {
                let squared_distance: f32 = query
                    .iter()
                    .zip(entry.iter())
                    .map(|(x, y)| (x - y).powi(2))
                    .sum();
                1.0 / (1.0 + squared_distance)
            }
        };

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for metric in [DistanceMetric::Cosine, DistanceMetric::Euclidean] {
            assert_eq!(DistanceMetric::parse_str(metric.name()).unwrap(), metric);
        }
    }

    #[test]
    fn test_parse_str_aliases() {
        assert_eq!(
            DistanceMetric::parse_str("COSINE").unwrap(),
            DistanceMetric::Cosine
        );
        assert_eq!(
            DistanceMetric::parse_str("l2").unwrap(),
            DistanceMetric::Euclidean
        );
        assert!(DistanceMetric::parse_str("manhattan").is_err());
    }

    #[test]
    fn test_cosine_score_of_prepared_vectors() {
        let metric = DistanceMetric::Cosine;
        let a = metric.prepare(&Embedding::new(vec![2.0, 0.0]));
        let b = metric.prepare(&Embedding::new(vec![5.0, 0.0]));
        let c = metric.prepare(&Embedding::new(vec![0.0, 1.0]));

        assert!((metric.score(&a.data, &b.data).unwrap() - 1.0).abs() < 1e-6);
        assert!(metric.score(&a.data, &c.data).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_scores_zero() {
        let metric = DistanceMetric::Cosine;
        let zero = metric.prepare(&Embedding::new(vec![0.0, 0.0]));
        let query = metric.prepare(&Embedding::new(vec![1.0, 0.0]));
        assert_eq!(metric.score(&query.data, &zero.data).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_score() {
        let metric = DistanceMetric::Euclidean;
        let a = Embedding::new(vec![1.0, 0.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0, 0.0]);

        // Squared distance between a and b is 2, so similarity is 1/3.
        let score = metric.score(&a.data, &b.data).unwrap();
        assert!((score - 1.0 / 3.0).abs() < 1e-6);

        // Identical vectors score exactly 1.
        assert_eq!(metric.score(&a.data, &a.data).unwrap(), 1.0);
    }

    #[test]
    fn test_score_dimension_mismatch() {
        let metric = DistanceMetric::Cosine;
        let result = metric.score(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(
            result,
            Err(VisageError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&DistanceMetric::Euclidean).unwrap();
        assert_eq!(json, "\"euclidean\"");
        let parsed: DistanceMetric = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(parsed, DistanceMetric::Cosine);
    }
}
