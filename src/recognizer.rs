//! High-level recognition facade tying an embedding source to the database.

use std::path::Path;
use std::sync::Arc;

use crate::config::RecognizerConfig;
use crate::database::FaceDatabase;
use crate::embedder::FaceEmbedder;
use crate::error::Result;
use crate::search::{RecognitionMatch, SearchRequest};

/// Enrolls and recognizes faces by routing images through a
/// [`FaceEmbedder`] and vectors through a [`FaceDatabase`].
///
/// Images in which the embedder finds no face are skipped, never errors:
/// `enroll` reports `false` and `recognize` reports no matches.
pub struct FaceRecognizer {
    database: FaceDatabase,
    embedder: Arc<dyn FaceEmbedder>,
    config: RecognizerConfig,
}

impl FaceRecognizer {
    /// Create a recognizer with default settings, tagged with the
    /// embedder's model name.
    pub fn new(embedder: Arc<dyn FaceEmbedder>) -> Self {
        let config = RecognizerConfig {
            model_name: embedder.model_name().to_string(),
            ..RecognizerConfig::default()
        };
        Self::with_config(embedder, config)
    }

    /// Create a recognizer with explicit settings.
    pub fn with_config(embedder: Arc<dyn FaceEmbedder>, config: RecognizerConfig) -> Self {
        let database = FaceDatabase::new(config.model_name.clone(), config.metric);
        Self {
            database,
            embedder,
            config,
        }
    }

    /// The underlying database.
    pub fn database(&self) -> &FaceDatabase {
        &self.database
    }

    /// The active configuration.
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Extract an embedding from the image and add it under `identity`.
    ///
    /// Returns `true` if a face was enrolled, `false` if the embedder
    /// found no face in the image.
    pub async fn enroll(&mut self, image_path: &Path, identity: &str) -> Result<bool> {
        match self.embedder.represent(image_path).await? {
            Some(embedding) => {
                self.database.add(embedding, identity)?;
                Ok(true)
            }
            None => {
                log::warn!(
                    "no face found in {}, skipping enrollment",
                    image_path.display()
                );
                Ok(false)
            }
        }
    }

    /// Recognize the face in an image using the configured threshold and
    /// top-k.
    pub async fn recognize(&self, image_path: &Path) -> Result<Vec<RecognitionMatch>> {
        let request = SearchRequest {
            threshold: self.config.threshold,
            top_k: self.config.top_k,
        };
        self.recognize_with(image_path, &request).await
    }

    /// Recognize the face in an image with an explicit search request.
    pub async fn recognize_with(
        &self,
        image_path: &Path,
        request: &SearchRequest,
    ) -> Result<Vec<RecognitionMatch>> {
        let Some(embedding) = self.embedder.represent(image_path).await? else {
            log::warn!("no face found in {}", image_path.display());
            return Ok(Vec::new());
        };
        self.database.search(&embedding, request)
    }

    /// Save the database snapshot to a file.
    pub fn save_database<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.database.save_to_path(path)
    }

    /// Replace the database with a snapshot loaded from a file.
    pub fn load_database<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.database = FaceDatabase::load_from_path(path)?;
        Ok(())
    }
}
