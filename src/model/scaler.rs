//! Mean/variance standardization for feature vectors.

use serde::{Deserialize, Serialize};

use crate::features::{FEATURE_COUNT, FeatureVector};

/// Columns with a standard deviation below this are treated as constant.
const MIN_STD: f64 = 1e-10;

/// Per-column standardizer fitted on the training partition only.
///
/// Statistics must never see held-out rows; the trainer fits this after the
/// split and the artifact carries it to inference unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: [f64; FEATURE_COUNT],
    stds: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fits column means and population standard deviations.
    ///
    /// # Panics
    ///
    /// Panics if `vectors` is empty.
    pub fn fit(vectors: &[FeatureVector]) -> Self {
        assert!(!vectors.is_empty(), "scaler requires at least one sample");
        let n = vectors.len() as f64;

        let mut means = [0.0_f64; FEATURE_COUNT];
        for v in vectors {
            for (i, x) in v.values().iter().enumerate() {
                means[i] += x;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = [0.0_f64; FEATURE_COUNT];
        for v in vectors {
            for (i, x) in v.values().iter().enumerate() {
                let d = x - means[i];
                stds[i] += d * d;
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
        }

        Self { means, stds }
    }

    /// Standardizes one vector.
    ///
    /// Constant columns (std below [`MIN_STD`]) map to 0.0 rather than
    /// dividing by ~zero.
    pub fn transform(&self, v: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0_f64; FEATURE_COUNT];
        for (i, x) in v.values().iter().enumerate() {
            out[i] = if self.stds[i] < MIN_STD {
                0.0
            } else {
                (x - self.means[i]) / self.stds[i]
            };
        }
        out
    }
}
