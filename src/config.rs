//! TOML-based application configuration.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::features::DEFAULT_PANEL_ANGLE_DEG;
use crate::weather::gateway::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL};

/// Top-level application configuration parsed from TOML.
///
/// All fields have defaults matching the reference installation. Load from
/// TOML with [`AppConfig::from_toml_file`] or use [`AppConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Panel installation parameters.
    #[serde(default)]
    pub panel: PanelConfig,
    /// Training pipeline parameters.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Weather and timezone endpoint parameters.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// HTTP server parameters.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Panel installation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Installation tilt recorded in the artifact and replayed at inference
    /// (degrees, 0–90).
    pub angle_of_incidence_deg: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            angle_of_incidence_deg: DEFAULT_PANEL_ANGLE_DEG,
        }
    }
}

/// Training pipeline parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Fraction of unique rows held out for evaluation (exclusive 0–1).
    pub holdout_fraction: f64,
    /// Forest size (must be > 0).
    pub n_trees: usize,
    /// Minimum unique rows required after deduplication (must be >= 2).
    pub min_rows: usize,
    /// Seed for the split, the forest, and importance shuffles.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.2,
            n_trees: 100,
            min_rows: 10,
            seed: 42,
        }
    }
}

/// Weather and timezone endpoint parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Forecast base URL (also used for timezone resolution).
    pub forecast_url: String,
    /// Geocoding base URL.
    pub geocoding_url: String,
    /// Request timeout for both endpoints (seconds, must be > 0).
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// HTTP server parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Port to bind on all interfaces (must be > 0).
    pub port: u16,
    /// Directory served for non-API paths.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: "static".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"training.holdout_fraction"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl AppConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let p = &self.panel;
        if !(0.0..=90.0).contains(&p.angle_of_incidence_deg) {
            errors.push(ConfigError {
                field: "panel.angle_of_incidence_deg".into(),
                message: "must be in [0.0, 90.0]".into(),
            });
        }

        let t = &self.training;
        if !(t.holdout_fraction > 0.0 && t.holdout_fraction < 1.0) {
            errors.push(ConfigError {
                field: "training.holdout_fraction".into(),
                message: "must be in (0.0, 1.0)".into(),
            });
        }
        if t.n_trees == 0 {
            errors.push(ConfigError {
                field: "training.n_trees".into(),
                message: "must be > 0".into(),
            });
        }
        if t.min_rows < 2 {
            errors.push(ConfigError {
                field: "training.min_rows".into(),
                message: "must be >= 2 so both partitions are non-empty".into(),
            });
        }

        let g = &self.gateway;
        if g.forecast_url.is_empty() {
            errors.push(ConfigError {
                field: "gateway.forecast_url".into(),
                message: "must not be empty".into(),
            });
        }
        if g.geocoding_url.is_empty() {
            errors.push(ConfigError {
                field: "gateway.geocoding_url".into(),
                message: "must not be empty".into(),
            });
        }
        if g.timeout_secs == 0 {
            errors.push(ConfigError {
                field: "gateway.timeout_secs".into(),
                message: "must be > 0".into(),
            });
        }

        let s = &self.server;
        if s.port == 0 {
            errors.push(ConfigError {
                field: "server.port".into(),
                message: "must be > 0".into(),
            });
        }
        if s.static_dir.is_empty() {
            errors.push(ConfigError {
                field: "server.static_dir".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}
