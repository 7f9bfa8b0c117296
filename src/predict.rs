//! Online scoring of live weather snapshots.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::features::FeatureMismatch;
use crate::model::{ArtifactError, ModelArtifact};
use crate::weather::WeatherObservation;

/// Scoring failure for a single request; other requests and the loaded
/// artifact are unaffected.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The observation cannot satisfy the feature contract.
    #[error(transparent)]
    FeatureMismatch(#[from] FeatureMismatch),
    /// The loaded artifact refused to score.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// A scored snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Estimated generation (kW); never negative.
    pub power_kw: f64,
}

impl Prediction {
    /// Value rounded to two decimals for presentation.
    pub fn rounded(&self) -> f64 {
        (self.power_kw * 100.0).round() / 100.0
    }
}

/// Scores observations against one loaded artifact.
///
/// The artifact supplies the engineer it was trained with, so this path
/// cannot drift from the offline transformation. Cheap to clone and safe to
/// call concurrently; the artifact is shared read-only.
#[derive(Clone)]
pub struct PredictionService {
    artifact: Arc<ModelArtifact>,
}

impl PredictionService {
    /// Wraps a loaded artifact.
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self { artifact }
    }

    /// Scores one observation: geometry, features, scaling, forest, clamp.
    ///
    /// Raw regressor output below zero is clamped to 0; a panel does not
    /// consume power.
    pub fn predict(&self, observation: &WeatherObservation) -> Result<Prediction, PredictError> {
        let inputs = observation.feature_inputs();
        let vector = self.artifact.engineer().vector(&inputs)?;
        let raw = self.artifact.score(&vector)?;
        debug!(raw, city = %observation.current.city, "scored observation");
        Ok(Prediction {
            power_kw: raw.max(0.0),
        })
    }
}
