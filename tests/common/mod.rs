//! Shared test fixtures for integration tests.

use std::io::Write;
use std::sync::Arc;

use chrono::TimeZone;
use chrono_tz::Tz;

use pv_advisor::features::FeatureEngineer;
use pv_advisor::predict::PredictionService;
use pv_advisor::train::Trainer;
use pv_advisor::train::dataset::HistoryRow;
use pv_advisor::weather::{CurrentWeather, WeatherObservation};

/// Column header matching the upstream weather-archive export.
pub const HISTORY_HEADER: &str = "temperature_2_m_above_gnd,relative_humidity_2_m_above_gnd,\
total_cloud_cover_sfc,shortwave_radiation_backwards_sfc,wind_speed_10_m_above_gnd,\
angle_of_incidence,zenith,azimuth,generated_power_kw";

/// Deterministic synthetic rows spanning cold overcast to warm clear skies.
pub fn synthetic_rows(n: usize) -> Vec<HistoryRow> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            HistoryRow {
                temperature_c: 2.0 + 0.6 * x,
                relative_humidity_pct: 30.0 + (x * 1.7) % 60.0,
                cloud_cover_pct: (x * 7.0) % 100.0,
                irradiance_w_m2: 80.0 + 14.0 * x,
                wind_speed_ms: 0.5 + 0.15 * x,
                zenith: 15.0 + (x * 1.3) % 70.0,
                azimuth: -75.0 + 3.5 * x,
                generated_power_kw: 0.4 + 0.06 * x,
            }
        })
        .collect()
}

/// Writes `n` synthetic rows to a temp CSV in the archive layout.
pub fn write_history_csv(n: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HISTORY_HEADER}").unwrap();
    for row in synthetic_rows(n) {
        writeln!(
            file,
            "{},{},{},{},{},30.0,{},{},{}",
            row.temperature_c,
            row.relative_humidity_pct,
            row.cloud_cover_pct,
            row.irradiance_w_m2,
            row.wind_speed_ms,
            row.zenith,
            row.azimuth,
            row.generated_power_kw,
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

/// Trains a small forest over 40 synthetic rows (30° tilt, 20% holdout).
pub fn trained_service(seed: u64) -> PredictionService {
    let trainer = Trainer::new(FeatureEngineer::new(30.0), 0.2, 10, 10, seed);
    let (artifact, _) = trainer.train(synthetic_rows(40)).unwrap();
    PredictionService::new(Arc::new(artifact))
}

/// A clear mild noon snapshot in a fixed zone.
pub fn clear_noon_observation() -> WeatherObservation {
    observation_at(20.0, 10.0, 2.0, 12)
}

/// Snapshot builder with fixed location and varying conditions.
pub fn observation_at(temp_c: f64, cloud_pct: f64, wind_ms: f64, hour: u32) -> WeatherObservation {
    let current = CurrentWeather {
        city: "Nantes".to_string(),
        latitude: 47.22,
        longitude: -1.55,
        temperature_c: temp_c,
        relative_humidity_pct: 50.0,
        cloud_cover_pct: cloud_pct,
        wind_speed_ms: wind_ms,
        irradiance_w_m2: Some(600.0),
        description: "Clear sky".to_string(),
    };
    let observed_at = Tz::Europe__Paris
        .with_ymd_and_hms(2024, 5, 20, hour, 0, 0)
        .unwrap();
    WeatherObservation::new(current, observed_at)
}
