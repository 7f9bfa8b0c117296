//! Batch training: dedup, split, scale, fit, evaluate.

pub mod dataset;
pub mod metrics;

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use thiserror::Error;
use tracing::info;

use crate::features::{
    FEATURE_COUNT, FEATURE_NAMES, FeatureEngineer, FeatureMismatch, FeatureVector, Season,
};
use crate::model::{ModelArtifact, StandardScaler};
use dataset::HistoryRow;

/// Training failure.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Too few rows remain after deduplication to split meaningfully.
    #[error("insufficient training data: {rows} unique rows, need at least {min_rows}")]
    InsufficientData { rows: usize, min_rows: usize },
    /// A dataset row violated the feature contract.
    #[error("row {row}: {source}")]
    Feature {
        row: usize,
        #[source]
        source: FeatureMismatch,
    },
    /// The forest could not be fitted or scored.
    #[error("regressor failure: {0}")]
    Regressor(String),
}

/// Per-season dataset composition, for the training report only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonSummary {
    /// Temperature bucket.
    pub season: Season,
    /// Unique rows in the bucket.
    pub rows: usize,
    /// Mean measured generation in the bucket (kW), 0 when empty.
    pub mean_power_kw: f64,
}

/// Diagnostics from a completed training run.
///
/// Informational only: poor scores never abort a run, that judgment stays
/// with the operator.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Rows read from the dataset.
    pub total_rows: usize,
    /// Rows remaining after exact-duplicate removal.
    pub unique_rows: usize,
    /// Rows in the fit partition.
    pub train_rows: usize,
    /// Rows in the held-out partition.
    pub test_rows: usize,
    /// Root-mean-squared error on the held-out partition (kW).
    pub rmse: f64,
    /// Coefficient of determination on the held-out partition.
    pub r2: f64,
    /// `(name, score)` pairs in feature-contract order; scores sum to 1.
    pub feature_importances: Vec<(&'static str, f64)>,
    /// Winter/shoulder/summer composition of the unique rows.
    pub seasons: Vec<SeasonSummary>,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Training Report ---")?;
        writeln!(
            f,
            "Rows:        {} read, {} unique (train {} / test {})",
            self.total_rows, self.unique_rows, self.train_rows, self.test_rows
        )?;
        writeln!(f, "RMSE:        {:.3} kW", self.rmse)?;
        writeln!(f, "R2:          {:.4}", self.r2)?;
        writeln!(f, "Feature importances:")?;
        for (name, score) in &self.feature_importances {
            writeln!(f, "  {name:<28} {score:.4}")?;
        }
        writeln!(f, "Season mix:")?;
        for (i, s) in self.seasons.iter().enumerate() {
            if i + 1 == self.seasons.len() {
                write!(
                    f,
                    "  {:<9} {:>6} rows, mean {:.2} kW",
                    s.season.label(),
                    s.rows,
                    s.mean_power_kw
                )?;
            } else {
                writeln!(
                    f,
                    "  {:<9} {:>6} rows, mean {:.2} kW",
                    s.season.label(),
                    s.rows,
                    s.mean_power_kw
                )?;
            }
        }
        Ok(())
    }
}

/// Fits a scaler + forest pipeline from historical rows.
#[derive(Debug, Clone, Copy)]
pub struct Trainer {
    engineer: FeatureEngineer,
    holdout_fraction: f64,
    n_trees: usize,
    min_rows: usize,
    seed: u64,
}

impl Trainer {
    /// Creates a trainer.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Shared feature transformation (also recorded in the artifact)
    /// * `holdout_fraction` - Fraction of unique rows held out for evaluation
    /// * `n_trees` - Forest size
    /// * `min_rows` - Minimum unique rows required after deduplication
    /// * `seed` - Seed for the split, the forest, and importance shuffles
    pub fn new(
        engineer: FeatureEngineer,
        holdout_fraction: f64,
        n_trees: usize,
        min_rows: usize,
        seed: u64,
    ) -> Self {
        Self {
            engineer,
            holdout_fraction,
            n_trees,
            min_rows,
            seed,
        }
    }

    /// Runs the full training procedure and returns the artifact with its
    /// diagnostics.
    ///
    /// Steps: dedup, minimum-rows check, seeded shuffle split, scaler fit on
    /// the train partition only, forest fit, held-out RMSE/R², permutation
    /// importances.
    pub fn train(
        &self,
        rows: Vec<HistoryRow>,
    ) -> Result<(ModelArtifact, TrainingReport), TrainError> {
        let total_rows = rows.len();
        let rows = dataset::dedup_rows(rows);
        let unique_rows = rows.len();
        if unique_rows < self.min_rows {
            return Err(TrainError::InsufficientData {
                rows: unique_rows,
                min_rows: self.min_rows,
            });
        }
        info!(total_rows, unique_rows, "dataset prepared");

        let mut vectors = Vec::with_capacity(unique_rows);
        let mut targets = Vec::with_capacity(unique_rows);
        for (row, record) in rows.iter().enumerate() {
            let v = self
                .engineer
                .vector(&record.feature_inputs())
                .map_err(|source| TrainError::Feature { row, source })?;
            vectors.push(v);
            targets.push(record.generated_power_kw);
        }

        // Seeded shuffle split; both partitions stay non-empty.
        let mut indices: Vec<usize> = (0..unique_rows).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(self.seed));
        let n_test = ((unique_rows as f64) * self.holdout_fraction).round() as usize;
        let n_test = n_test.clamp(1, unique_rows - 1);
        let (test_idx, train_idx) = indices.split_at(n_test);

        let train_vectors: Vec<FeatureVector> = train_idx.iter().map(|&i| vectors[i]).collect();
        let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();
        let test_vectors: Vec<FeatureVector> = test_idx.iter().map(|&i| vectors[i]).collect();
        let test_targets: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();

        // Scaler statistics must never see held-out rows.
        let scaler = StandardScaler::fit(&train_vectors);

        let train_scaled: Vec<Vec<f64>> = train_vectors
            .iter()
            .map(|v| scaler.transform(v).to_vec())
            .collect();
        let x_train = DenseMatrix::from_2d_vec(&train_scaled);
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_seed(self.seed);
        info!(
            n_trees = self.n_trees,
            train_rows = train_vectors.len(),
            "fitting forest"
        );
        let forest = RandomForestRegressor::fit(&x_train, &train_targets, params)
            .map_err(|e| TrainError::Regressor(e.to_string()))?;

        let test_scaled: Vec<Vec<f64>> = test_vectors
            .iter()
            .map(|v| scaler.transform(v).to_vec())
            .collect();
        let x_test = DenseMatrix::from_2d_vec(&test_scaled);
        let predictions = forest
            .predict(&x_test)
            .map_err(|e| TrainError::Regressor(e.to_string()))?;
        let rmse = metrics::rmse(&test_targets, &predictions);
        let r2 = metrics::r2(&test_targets, &predictions);
        info!(rmse, r2, test_rows = test_vectors.len(), "holdout evaluation");

        let importances =
            self.permutation_importances(&forest, &test_scaled, &test_targets, rmse)?;

        let report = TrainingReport {
            total_rows,
            unique_rows,
            train_rows: train_vectors.len(),
            test_rows: test_vectors.len(),
            rmse,
            r2,
            feature_importances: FEATURE_NAMES.iter().copied().zip(importances).collect(),
            seasons: season_mix(&rows),
        };
        let artifact = ModelArtifact::new(
            self.engineer.panel_angle_of_incidence_deg(),
            scaler,
            forest,
        );
        Ok((artifact, report))
    }

    /// Seeded permutation importance over the held-out partition.
    ///
    /// Per feature: shuffle that scaled column, re-score, and take the RMSE
    /// increase (floored at 0). Scores are normalized to sum to 1.0; when
    /// every delta is 0 the mass falls back to uniform.
    fn permutation_importances(
        &self,
        forest: &RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
        test_scaled: &[Vec<f64>],
        test_targets: &[f64],
        baseline_rmse: f64,
    ) -> Result<[f64; FEATURE_COUNT], TrainError> {
        let mut importances = [0.0_f64; FEATURE_COUNT];
        for (j, importance) in importances.iter_mut().enumerate() {
            let mut column: Vec<f64> = test_scaled.iter().map(|r| r[j]).collect();
            // Offset the seed per column so shuffles stay decorrelated.
            column.shuffle(&mut StdRng::seed_from_u64(
                self.seed.wrapping_add(1 + j as u64),
            ));

            let mut permuted = test_scaled.to_vec();
            for (prow, value) in permuted.iter_mut().zip(column) {
                prow[j] = value;
            }
            let x = DenseMatrix::from_2d_vec(&permuted);
            let scores = forest
                .predict(&x)
                .map_err(|e| TrainError::Regressor(e.to_string()))?;
            *importance = (metrics::rmse(test_targets, &scores) - baseline_rmse).max(0.0);
        }

        let mass: f64 = importances.iter().sum();
        if mass > 0.0 {
            for v in &mut importances {
                *v /= mass;
            }
        } else {
            importances = [1.0 / FEATURE_COUNT as f64; FEATURE_COUNT];
        }
        Ok(importances)
    }
}

/// Buckets unique rows by season, in winter/shoulder/summer order.
fn season_mix(rows: &[HistoryRow]) -> Vec<SeasonSummary> {
    [Season::Winter, Season::Shoulder, Season::Summer]
        .into_iter()
        .map(|season| {
            let mut count = 0usize;
            let mut power_sum = 0.0_f64;
            for r in rows {
                if Season::from_temperature(r.temperature_c) == season {
                    count += 1;
                    power_sum += r.generated_power_kw;
                }
            }
            SeasonSummary {
                season,
                rows: count,
                mean_power_kw: if count > 0 {
                    power_sum / count as f64
                } else {
                    0.0
                },
            }
        })
        .collect()
}
