//! Historical generation dataset loading.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::features::FeatureInputs;

/// Dataset read or parse failure; row positions come from the CSV layer.
#[derive(Debug, Error)]
#[error("dataset read failed: {0}")]
pub struct DatasetError(#[from] csv::Error);

/// One historical generation record as stored on disk.
///
/// Column names follow the upstream weather-archive export. Columns not
/// listed here (notably `angle_of_incidence`) are ignored: the installation
/// tilt enters the pipeline from configuration, not from the archive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HistoryRow {
    /// Air temperature 2 m above ground (°C).
    #[serde(rename = "temperature_2_m_above_gnd")]
    pub temperature_c: f64,
    /// Relative humidity 2 m above ground (%).
    #[serde(rename = "relative_humidity_2_m_above_gnd")]
    pub relative_humidity_pct: f64,
    /// Total cloud cover at the surface (%).
    #[serde(rename = "total_cloud_cover_sfc")]
    pub cloud_cover_pct: f64,
    /// Measured shortwave radiation at the surface (W/m²).
    #[serde(rename = "shortwave_radiation_backwards_sfc")]
    pub irradiance_w_m2: f64,
    /// Wind speed 10 m above ground (m/s).
    #[serde(rename = "wind_speed_10_m_above_gnd")]
    pub wind_speed_ms: f64,
    /// Recorded zenith angle (degrees).
    pub zenith: f64,
    /// Recorded azimuth angle (degrees).
    pub azimuth: f64,
    /// Measured generation (kW), the regression target.
    pub generated_power_kw: f64,
}

impl HistoryRow {
    /// Measurements in feature-contract form.
    ///
    /// The archive always carries measured radiation, so irradiance is
    /// passed through rather than estimated.
    pub fn feature_inputs(&self) -> FeatureInputs {
        FeatureInputs {
            temperature_c: self.temperature_c,
            relative_humidity_pct: self.relative_humidity_pct,
            cloud_cover_pct: self.cloud_cover_pct,
            irradiance_w_m2: Some(self.irradiance_w_m2),
            wind_speed_ms: self.wind_speed_ms,
            zenith_deg: self.zenith,
            azimuth_deg: self.azimuth,
        }
    }

    /// Bit pattern of every field, for exact-duplicate detection.
    fn bits(&self) -> [u64; 8] {
        [
            self.temperature_c.to_bits(),
            self.relative_humidity_pct.to_bits(),
            self.cloud_cover_pct.to_bits(),
            self.irradiance_w_m2.to_bits(),
            self.wind_speed_ms.to_bits(),
            self.zenith.to_bits(),
            self.azimuth.to_bits(),
            self.generated_power_kw.to_bits(),
        ]
    }
}

/// Reads all rows from a CSV dataset file.
pub fn load_csv(path: &Path) -> Result<Vec<HistoryRow>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Drops exact duplicate rows, keeping first occurrences in order.
pub fn dedup_rows(rows: Vec<HistoryRow>) -> Vec<HistoryRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|r| seen.insert(r.bits())).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "temperature_2_m_above_gnd,relative_humidity_2_m_above_gnd,\
total_cloud_cover_sfc,shortwave_radiation_backwards_sfc,wind_speed_10_m_above_gnd,\
angle_of_incidence,zenith,azimuth,generated_power_kw";

    fn write_dataset(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_rows_by_column_name() {
        let file = write_dataset(&[
            "20.0,50.0,10.0,640.0,2.0,42.5,45.0,-15.0,3.2",
            "5.5,80.0,95.0,55.0,7.0,42.5,80.0,60.0,0.1",
        ]);
        let rows = load_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].temperature_c, 20.0);
        assert_eq!(rows[0].irradiance_w_m2, 640.0);
        assert_eq!(rows[0].zenith, 45.0);
        assert_eq!(rows[0].azimuth, -15.0);
        assert_eq!(rows[0].generated_power_kw, 3.2);
        assert_eq!(rows[1].cloud_cover_pct, 95.0);
    }

    #[test]
    fn angle_of_incidence_column_is_ignored() {
        let file = write_dataset(&["20.0,50.0,10.0,640.0,2.0,99.0,45.0,-15.0,3.2"]);
        let rows = load_csv(file.path()).unwrap();
        let inputs = rows[0].feature_inputs();
        // nothing in the contract inputs carries the archive's 99.0 tilt
        assert_eq!(inputs.irradiance_w_m2, Some(640.0));
        assert_eq!(inputs.zenith_deg, 45.0);
    }

    #[test]
    fn unparseable_cell_fails_the_load() {
        let file = write_dataset(&["20.0,50.0,not_a_number,640.0,2.0,30.0,45.0,-15.0,3.2"]);
        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn missing_file_fails() {
        assert!(load_csv(Path::new("/nonexistent/history.csv")).is_err());
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let file = write_dataset(&[
            "20.0,50.0,10.0,640.0,2.0,30.0,45.0,-15.0,3.2",
            "5.5,80.0,95.0,55.0,7.0,30.0,80.0,60.0,0.1",
            "20.0,50.0,10.0,640.0,2.0,30.0,45.0,-15.0,3.2",
            "5.5,80.0,95.0,55.0,7.0,30.0,80.0,60.0,0.1",
            "20.0,50.0,10.0,640.0,2.0,30.0,45.0,-15.0,3.2",
        ]);
        let rows = dedup_rows(load_csv(file.path()).unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temperature_c, 20.0);
        assert_eq!(rows[1].temperature_c, 5.5);
    }

    #[test]
    fn near_duplicates_are_kept() {
        let file = write_dataset(&[
            "20.0,50.0,10.0,640.0,2.0,30.0,45.0,-15.0,3.2",
            "20.0,50.0,10.0,640.0,2.0,30.0,45.0,-15.0,3.2000001",
        ]);
        let rows = dedup_rows(load_csv(file.path()).unwrap());
        assert_eq!(rows.len(), 2);
    }
}
