//! The face database: record store, index lifecycle, and search entry point.

use std::io::{Read, Write};
use std::path::Path;

use crate::embedding::Embedding;
use crate::error::{Result, VisageError};
use crate::index::FlatIndex;
use crate::metric::DistanceMetric;
use crate::persist;
use crate::search::{FlatSearcher, RecognitionMatch, SearchRequest};

/// One stored face: an embedding paired with an identity label.
///
/// Identities are opaque and non-unique; several records may carry the
/// same label.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRecord {
    /// Identity label associated with the embedding.
    pub identity: String,
    /// The face embedding.
    pub embedding: Embedding,
}

/// An in-memory store of face records with an always-current flat index.
///
/// The record sequence is append-only and its insertion order is
/// significant: a record's position is the join key used to map index hits
/// back to identities. The first successful insert fixes the embedding
/// dimension for the database's lifetime.
#[derive(Debug)]
pub struct FaceDatabase {
    model_name: String,
    metric: DistanceMetric,
    records: Vec<FaceRecord>,
    index: FlatIndex,
}

impl FaceDatabase {
    /// Create an empty database tagged with the embedding model's name and
    /// a distance metric. Both tags are fixed for the database's lifetime
    /// and travel with saved snapshots.
    pub fn new(model_name: impl Into<String>, metric: DistanceMetric) -> Self {
        Self {
            model_name: model_name.into(),
            metric,
            records: Vec::new(),
            index: FlatIndex::empty(metric),
        }
    }

    /// Reassemble a database from deserialized parts, rebuilding the index.
    pub(crate) fn from_parts(
        model_name: String,
        metric: DistanceMetric,
        records: Vec<FaceRecord>,
    ) -> Result<Self> {
        let index = FlatIndex::build(records.iter().map(|r| &r.embedding), metric)?;
        Ok(Self {
            model_name,
            metric,
            records,
            index,
        })
    }

    /// Name of the model that produced the stored embeddings.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The distance metric this database scores under.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The established embedding dimension, or `None` before the first insert.
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.dimension())
    }

    /// Number of stored records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Check if the database holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The stored records, in insertion order.
    pub fn records(&self) -> &[FaceRecord] {
        &self.records
    }

    /// The current index.
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Append a face and synchronously rebuild the index.
    ///
    /// Rejects embeddings that are empty, non-finite, or whose dimension
    /// disagrees with the established one; the store is left unchanged on
    /// any failure. Each call rebuilds the whole flat index at O(n·D), so
    /// inserting n faces costs O(n²·D) in total; batch ingestion at scale
    /// should account for that growth.
    pub fn add(&mut self, embedding: Embedding, identity: impl Into<String>) -> Result<()> {
        if embedding.data.is_empty() {
            return Err(VisageError::invalid_argument("embedding must not be empty"));
        }
        if !embedding.is_valid() {
            return Err(VisageError::invalid_argument(
                "embedding contains non-finite values",
            ));
        }
        if let Some(dimension) = self.dimension() {
            embedding.validate_dimension(dimension)?;
        }

        self.records.push(FaceRecord {
            identity: identity.into(),
            embedding,
        });
        if let Err(err) = self.rebuild_index() {
            // Keep record count and index entry count in agreement.
            self.records.pop();
            return Err(err);
        }

        log::debug!("flat index rebuilt with {} faces", self.records.len());
        Ok(())
    }

    /// Search for the stored identities most similar to `query`.
    ///
    /// An empty database yields an empty result, not an error.
    pub fn search(
        &self,
        query: &Embedding,
        request: &SearchRequest,
    ) -> Result<Vec<RecognitionMatch>> {
        FlatSearcher::new(&self.index, &self.records).search(query, request)
    }

    /// Serialize a complete snapshot of this database to `writer`.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        persist::save(self, writer)
    }

    /// Save a snapshot to a file at `path`.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persist::save_to_path(self, path)
    }

    /// Deserialize a database from `reader`, validating the snapshot and
    /// rebuilding the index.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        persist::load(reader)
    }

    /// Load a database from a file at `path`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        persist::load_from_path(path)
    }

    fn rebuild_index(&mut self) -> Result<()> {
        self.index = FlatIndex::build(self.records.iter().map(|r| &r.embedding), self.metric)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_database_is_uninitialized() {
        let database = FaceDatabase::new("VGG-Face", DistanceMetric::Cosine);
        assert_eq!(database.count(), 0);
        assert_eq!(database.dimension(), None);
        assert!(database.index().is_empty());
    }

    #[test]
    fn test_add_establishes_dimension_and_rebuilds_index() {
        let mut database = FaceDatabase::new("VGG-Face", DistanceMetric::Cosine);
        database
            .add(Embedding::new(vec![1.0, 0.0, 0.0]), "alice")
            .unwrap();

        assert_eq!(database.count(), 1);
        assert_eq!(database.dimension(), Some(3));
        assert_eq!(database.index().len(), 1);

        database
            .add(Embedding::new(vec![0.0, 1.0, 0.0]), "bob")
            .unwrap();
        assert_eq!(database.count(), 2);
        assert_eq!(database.index().len(), 2);
    }

    #[test]
    fn test_add_rejects_dimension_mismatch_without_mutation() {
        let mut database = FaceDatabase::new("VGG-Face", DistanceMetric::Cosine);
        database
            .add(Embedding::new(vec![1.0, 0.0, 0.0]), "alice")
            .unwrap();

        let result = database.add(Embedding::new(vec![1.0, 0.0, 0.0, 0.0]), "bob");
        assert!(matches!(
            result,
            Err(VisageError::DimensionMismatch { .. })
        ));
        assert_eq!(database.count(), 1);
        assert_eq!(database.index().len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_and_non_finite_embeddings() {
        let mut database = FaceDatabase::new("VGG-Face", DistanceMetric::Euclidean);

        assert!(database.add(Embedding::new(vec![]), "alice").is_err());
        assert!(
            database
                .add(Embedding::new(vec![1.0, f32::NAN]), "alice")
                .is_err()
        );
        assert_eq!(database.count(), 0);
    }

    #[test]
    fn test_search_on_empty_database_returns_no_matches() {
        let database = FaceDatabase::new("VGG-Face", DistanceMetric::Cosine);
        let matches = database
            .search(
                &Embedding::new(vec![1.0, 0.0, 0.0]),
                &SearchRequest::default(),
            )
            .unwrap();
        assert!(matches.is_empty());
    }
}
