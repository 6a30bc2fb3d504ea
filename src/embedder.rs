//! The embedding source seam.
//!
//! The database consumes already-computed vectors; turning an image into a
//! vector is the job of an external face-recognition model behind the
//! [`FaceEmbedder`] trait. The core never assumes anything about
//! implementations beyond this interface.

use std::path::Path;

use async_trait::async_trait;

use crate::embedding::Embedding;
use crate::error::{Result, VisageError};

/// Trait for producing a face embedding from an image reference.
///
/// `Ok(None)` is the explicit "no embedding" signal: no face was found or
/// extraction failed in a recoverable way, and the caller should skip that
/// input. `Err` is reserved for hard failures (model unavailable, I/O).
#[async_trait]
pub trait FaceEmbedder: Send + Sync {
    /// Extract the embedding of the most prominent face in the image.
    async fn represent(&self, image_path: &Path) -> Result<Option<Embedding>>;

    /// Name of the underlying model, recorded in the database tag.
    fn model_name(&self) -> &str;

    /// Dimension of the embeddings this source produces.
    fn dimension(&self) -> usize;
}

/// An embedder that refuses to embed, for pipelines that enroll
/// externally pre-computed vectors directly via
/// [`FaceDatabase::add`](crate::database::FaceDatabase::add).
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEmbedder;

impl PrecomputedEmbedder {
    /// Creates a new `PrecomputedEmbedder`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FaceEmbedder for PrecomputedEmbedder {
    /// Returns an error for any input, as this embedder does not support
    /// extraction.
    async fn represent(&self, _image_path: &Path) -> Result<Option<Embedding>> {
        Err(VisageError::invalid_argument(
            "PrecomputedEmbedder does not produce embeddings - supply pre-computed vectors",
        ))
    }

    fn model_name(&self) -> &str {
        "precomputed"
    }

    fn dimension(&self) -> usize {
        0
    }
}
