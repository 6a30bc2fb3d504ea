//! Core embedding data structure.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisageError};

/// A fixed-length face embedding produced by an external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// The embedding components as floating point values.
    pub data: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from raw components.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimensionality of this embedding.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Calculate the L2 norm (magnitude) of this embedding.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize this embedding to unit length.
    ///
    /// A zero vector is left unchanged; under cosine scoring it compares
    /// as 0 against any query.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.data {
                *value /= norm;
            }
        }
    }

    /// Get a normalized copy of this embedding.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.normalize();
        normalized
    }

    /// Check if this embedding contains only finite values.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Validate that this embedding has the expected dimension.
    pub fn validate_dimension(&self, expected: usize) -> Result<()> {
        if self.data.len() != expected {
            return Err(VisageError::dimension_mismatch(expected, self.data.len()));
        }
        Ok(())
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        let embedding = Embedding::new(vec![3.0, 4.0]);
        assert!((embedding.norm() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize() {
        let mut embedding = Embedding::new(vec![3.0, 4.0]);
        embedding.normalize();
        assert!((embedding.norm() - 1.0).abs() < 1e-6);
        assert!((embedding.data[0] - 0.6).abs() < 1e-6);
        assert!((embedding.data[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_is_noop() {
        let mut embedding = Embedding::new(vec![0.0, 0.0, 0.0]);
        embedding.normalize();
        assert_eq!(embedding.data, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_validate_dimension() {
        let embedding = Embedding::new(vec![1.0, 2.0, 3.0]);
        assert!(embedding.validate_dimension(3).is_ok());

        let err = embedding.validate_dimension(4).unwrap_err();
        match err {
            VisageError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_is_valid_rejects_nan_and_infinity() {
        assert!(Embedding::new(vec![1.0, 2.0]).is_valid());
        assert!(!Embedding::new(vec![1.0, f32::NAN]).is_valid());
        assert!(!Embedding::new(vec![f32::INFINITY, 0.0]).is_valid());
    }
}
