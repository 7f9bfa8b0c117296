//! Feature-vector construction shared by training and inference.
//!
//! Both paths must build model inputs through [`FeatureEngineer::vector`] and
//! nothing else. A second construction path would not fail loudly; it would
//! just quietly skew predictions, so the vector type keeps its storage
//! private and the engineer is the only producer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solar::{self, SolarPosition};

/// Number of fields in the model input vector.
pub const FEATURE_COUNT: usize = 11;

/// Canonical field names, in vector order.
///
/// The order is a contract shared with persisted artifacts; reordering or
/// renaming breaks every previously trained model.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "relative_humidity",
    "cloud_cover",
    "irradiance",
    "wind_speed",
    "panel_angle_of_incidence",
    "zenith",
    "azimuth",
    "is_daylight",
    "temp_humidity_interaction",
    "radiation_cloud_interaction",
];

/// Default fixed installation tilt in degrees.
pub const DEFAULT_PANEL_ANGLE_DEG: f64 = 30.0;

/// A required feature field could not be populated with a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feature `{field}` is missing or not a finite number")]
pub struct FeatureMismatch {
    /// Contract field that failed validation.
    pub field: &'static str,
}

/// Raw per-sample measurements the feature contract consumes.
///
/// Historical dataset rows and live observations both reduce to this struct
/// before vector construction, which is what makes the two paths provably
/// identical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureInputs {
    /// Air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity (%).
    pub relative_humidity_pct: f64,
    /// Cloud cover (%, 0..=100).
    pub cloud_cover_pct: f64,
    /// Measured irradiance (W/m²); `None` requests estimation from
    /// cloud cover and zenith.
    pub irradiance_w_m2: Option<f64>,
    /// Wind speed (m/s).
    pub wind_speed_ms: f64,
    /// Zenith angle in degrees.
    pub zenith_deg: f64,
    /// Azimuth angle in degrees.
    pub azimuth_deg: f64,
}

/// Ordered model input vector; see [`FEATURE_NAMES`] for the field layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Field values in contract order.
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }
}

/// The single transformation from raw measurements to model inputs.
///
/// Carries the one piece of configuration that enters the vector: the panel
/// angle of incidence. The same engineer value must be used when fitting and
/// when scoring; [`crate::model::ModelArtifact`] records it for that reason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureEngineer {
    panel_angle_of_incidence_deg: f64,
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_ANGLE_DEG)
    }
}

impl FeatureEngineer {
    /// Creates an engineer with the given installation tilt (degrees).
    pub fn new(panel_angle_of_incidence_deg: f64) -> Self {
        Self {
            panel_angle_of_incidence_deg,
        }
    }

    /// The configured installation tilt (degrees).
    pub fn panel_angle_of_incidence_deg(&self) -> f64 {
        self.panel_angle_of_incidence_deg
    }

    /// Builds the feature vector for one sample.
    ///
    /// Pure and deterministic: no clock reads, no globals, bit-identical
    /// output for identical inputs. Irradiance falls back to
    /// [`solar::estimate_irradiance`] when the sample carries no measured
    /// value. Any non-finite field fails with [`FeatureMismatch`] naming
    /// the first offending contract field.
    pub fn vector(&self, inputs: &FeatureInputs) -> Result<FeatureVector, FeatureMismatch> {
        let irradiance = inputs.irradiance_w_m2.unwrap_or_else(|| {
            solar::estimate_irradiance(inputs.cloud_cover_pct, inputs.zenith_deg)
        });

        let position = SolarPosition {
            azimuth_deg: inputs.azimuth_deg,
            zenith_deg: inputs.zenith_deg,
        };
        let is_daylight = if position.is_daylight() { 1.0 } else { 0.0 };

        let values = [
            inputs.temperature_c,
            inputs.relative_humidity_pct,
            inputs.cloud_cover_pct,
            irradiance,
            inputs.wind_speed_ms,
            self.panel_angle_of_incidence_deg,
            inputs.zenith_deg,
            inputs.azimuth_deg,
            is_daylight,
            inputs.temperature_c * inputs.relative_humidity_pct,
            irradiance * (100.0 - inputs.cloud_cover_pct),
        ];

        for (value, field) in values.iter().zip(FEATURE_NAMES) {
            if !value.is_finite() {
                return Err(FeatureMismatch { field });
            }
        }

        Ok(FeatureVector { values })
    }
}

/// Temperature-derived season bucket.
///
/// Used only for dataset composition reporting; it never enters the
/// feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// Below 5 °C.
    Winter,
    /// 5 °C to just under 15 °C.
    Shoulder,
    /// 15 °C and above.
    Summer,
}

impl Season {
    /// Buckets a temperature reading.
    pub fn from_temperature(temp_c: f64) -> Self {
        if temp_c < 5.0 {
            Season::Winter
        } else if temp_c < 15.0 {
            Season::Shoulder
        } else {
            Season::Summer
        }
    }

    /// Lowercase label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Shoulder => "shoulder",
            Season::Summer => "summer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> FeatureInputs {
        FeatureInputs {
            temperature_c: 20.0,
            relative_humidity_pct: 50.0,
            cloud_cover_pct: 10.0,
            irradiance_w_m2: Some(640.0),
            wind_speed_ms: 2.0,
            zenith_deg: 75.0,
            azimuth_deg: 0.0,
        }
    }

    #[test]
    fn vector_layout_matches_names() {
        let v = FeatureEngineer::default()
            .vector(&sample_inputs())
            .unwrap();
        let values = v.values();

        assert_eq!(values[0], 20.0); // temperature
        assert_eq!(values[1], 50.0); // relative_humidity
        assert_eq!(values[2], 10.0); // cloud_cover
        assert_eq!(values[3], 640.0); // irradiance
        assert_eq!(values[4], 2.0); // wind_speed
        assert_eq!(values[5], DEFAULT_PANEL_ANGLE_DEG);
        assert_eq!(values[6], 75.0); // zenith
        assert_eq!(values[7], 0.0); // azimuth
        assert_eq!(values[8], 1.0); // is_daylight
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_NAMES[0], "temperature");
        assert_eq!(FEATURE_NAMES[10], "radiation_cloud_interaction");
        assert!(!FEATURE_NAMES.contains(&"season"));
    }

    #[test]
    fn interactions_are_products() {
        let v = FeatureEngineer::default()
            .vector(&sample_inputs())
            .unwrap();
        assert_eq!(v.values()[9], 20.0 * 50.0);
        assert_eq!(v.values()[10], 640.0 * 90.0);
    }

    #[test]
    fn daylight_coerced_to_zero_or_one() {
        let mut inputs = sample_inputs();
        inputs.zenith_deg = 84.99;
        let v = FeatureEngineer::default().vector(&inputs).unwrap();
        assert_eq!(v.values()[8], 1.0);

        inputs.zenith_deg = 85.0;
        let v = FeatureEngineer::default().vector(&inputs).unwrap();
        assert_eq!(v.values()[8], 0.0);
    }

    #[test]
    fn deterministic_bit_for_bit() {
        let engineer = FeatureEngineer::new(27.5);
        let inputs = FeatureInputs {
            temperature_c: -3.25,
            relative_humidity_pct: 81.5,
            cloud_cover_pct: 66.6,
            irradiance_w_m2: None,
            wind_speed_ms: 7.125,
            zenith_deg: 41.0,
            azimuth_deg: -52.5,
        };
        let a = engineer.vector(&inputs).unwrap();
        let b = engineer.vector(&inputs).unwrap();
        for (x, y) in a.values().iter().zip(b.values()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn missing_irradiance_uses_estimate() {
        let mut inputs = sample_inputs();
        inputs.irradiance_w_m2 = None;
        inputs.zenith_deg = 45.0;
        let v = FeatureEngineer::default().vector(&inputs).unwrap();
        let expected = crate::solar::estimate_irradiance(10.0, 45.0);
        assert_eq!(v.values()[3], expected);
        assert_eq!(v.values()[10], expected * 90.0);
    }

    #[test]
    fn panel_angle_comes_from_engineer() {
        let v = FeatureEngineer::new(12.0).vector(&sample_inputs()).unwrap();
        assert_eq!(v.values()[5], 12.0);
    }

    #[test]
    fn non_finite_inputs_name_the_field() {
        let mut inputs = sample_inputs();
        inputs.temperature_c = f64::NAN;
        let err = FeatureEngineer::default().vector(&inputs).unwrap_err();
        assert_eq!(err.field, "temperature");

        let mut inputs = sample_inputs();
        inputs.wind_speed_ms = f64::INFINITY;
        let err = FeatureEngineer::default().vector(&inputs).unwrap_err();
        assert_eq!(err.field, "wind_speed");

        let mut inputs = sample_inputs();
        inputs.irradiance_w_m2 = Some(f64::NAN);
        let err = FeatureEngineer::default().vector(&inputs).unwrap_err();
        assert_eq!(err.field, "irradiance");
    }

    #[test]
    fn nan_interaction_reports_interaction_field() {
        // finite factors cannot produce a non-finite product unless they
        // overflow; force it with a huge pair
        let mut inputs = sample_inputs();
        inputs.temperature_c = f64::MAX;
        inputs.relative_humidity_pct = f64::MAX;
        let err = FeatureEngineer::default().vector(&inputs).unwrap_err();
        assert_eq!(err.field, "temp_humidity_interaction");
    }

    #[test]
    fn season_boundaries() {
        assert_eq!(Season::from_temperature(4.99), Season::Winter);
        assert_eq!(Season::from_temperature(5.0), Season::Shoulder);
        assert_eq!(Season::from_temperature(14.99), Season::Shoulder);
        assert_eq!(Season::from_temperature(15.0), Season::Summer);
        assert_eq!(Season::from_temperature(-10.0), Season::Winter);
    }

    #[test]
    fn season_labels() {
        assert_eq!(Season::Winter.label(), "winter");
        assert_eq!(Season::Shoulder.label(), "shoulder");
        assert_eq!(Season::Summer.label(), "summer");
    }
}
