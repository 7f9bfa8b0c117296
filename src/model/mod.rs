//! Persisted model bundle: scaler, fitted forest, and contract metadata.

pub mod scaler;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use thiserror::Error;

use crate::features::{FEATURE_NAMES, FeatureEngineer, FeatureVector};
pub use scaler::StandardScaler;

/// Failure while scoring, persisting, or loading a model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem failure while reading or writing the artifact.
    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),
    /// The artifact file is not valid JSON for this schema.
    #[error("artifact encoding: {0}")]
    Codec(#[from] serde_json::Error),
    /// The artifact was trained against a different feature contract.
    #[error("artifact feature names do not match this build (expected {expected:?}, found {found:?})")]
    FeatureNames {
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// The underlying regressor refused to score.
    #[error("regressor failure: {0}")]
    Regressor(String),
}

/// Immutable bundle produced by training and consumed at inference.
///
/// Held as one process-wide instance behind `Arc`; nothing is mutated after
/// load, so concurrent scoring needs no locks. The bundle records the
/// feature-name list and the panel angle used at fit time so a mismatched
/// binary or configuration is caught at load instead of skewing silently.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    feature_names: Vec<String>,
    panel_angle_of_incidence_deg: f64,
    trained_at: DateTime<Utc>,
    scaler: StandardScaler,
    forest: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl ModelArtifact {
    /// Bundles a fitted scaler and forest. Only the trainer constructs this.
    pub(crate) fn new(
        panel_angle_of_incidence_deg: f64,
        scaler: StandardScaler,
        forest: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
    ) -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            panel_angle_of_incidence_deg,
            trained_at: Utc::now(),
            scaler,
            forest,
        }
    }

    /// Panel angle of incidence (degrees) the model was fitted with.
    pub fn panel_angle_of_incidence_deg(&self) -> f64 {
        self.panel_angle_of_incidence_deg
    }

    /// When the bundle was fitted.
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// The engineer matching this artifact's fit-time configuration.
    ///
    /// Inference must build vectors through this value rather than live
    /// configuration, so the trained pair can never diverge.
    pub fn engineer(&self) -> FeatureEngineer {
        FeatureEngineer::new(self.panel_angle_of_incidence_deg)
    }

    /// Scales and scores a batch of vectors, returning raw outputs.
    pub fn score_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<f64>, ArtifactError> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<Vec<f64>> = vectors
            .iter()
            .map(|v| self.scaler.transform(v).to_vec())
            .collect();
        let x = DenseMatrix::from_2d_vec(&rows);
        self.forest
            .predict(&x)
            .map_err(|e| ArtifactError::Regressor(e.to_string()))
    }

    /// Scales and scores one vector, returning the raw (unclamped) output.
    pub fn score(&self, vector: &FeatureVector) -> Result<f64, ArtifactError> {
        let mut scores = self.score_batch(std::slice::from_ref(vector))?;
        scores
            .pop()
            .ok_or_else(|| ArtifactError::Regressor("empty prediction batch".to_string()))
    }

    /// Serializes the bundle to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Loads a bundle and verifies it against the compiled-in contract.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path)?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))?;
        if !artifact
            .feature_names
            .iter()
            .map(String::as_str)
            .eq(FEATURE_NAMES)
        {
            return Err(ArtifactError::FeatureNames {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: artifact.feature_names,
            });
        }
        Ok(artifact)
    }
}
