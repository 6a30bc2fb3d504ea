//! Default settings and recognizer configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metric::DistanceMetric;

/// Default embedding model tag.
pub const DEFAULT_MODEL_NAME: &str = "VGG-Face";

/// Default minimum similarity for a match.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Default number of ranked results per query.
pub const DEFAULT_TOP_K: usize = 1;

/// Settings for a [`FaceRecognizer`](crate::recognizer::FaceRecognizer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Embedding model tag recorded in the database.
    pub model_name: String,
    /// Distance metric, fixed at database construction.
    pub metric: DistanceMetric,
    /// Default similarity threshold for recognition queries.
    pub threshold: f32,
    /// Default number of ranked results per recognition query.
    pub top_k: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            metric: DistanceMetric::Cosine,
            threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RecognizerConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}
