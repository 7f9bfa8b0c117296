//! CSV export for training diagnostics.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::train::TrainingReport;

/// Column header for the long-format report export.
const HEADER: &str = "kind,name,value";

/// Exports a training report to a CSV file at the given path.
///
/// Writes a header row followed by one `kind,name,value` row per metric,
/// per-feature importance, and per-season aggregate. Produces deterministic
/// output for identical reports.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(report: &TrainingReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(report, buf)
}

/// Writes a training report as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(report: &TrainingReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    // Run counters and holdout scores.
    let metrics = [
        ("total_rows", report.total_rows.to_string()),
        ("unique_rows", report.unique_rows.to_string()),
        ("train_rows", report.train_rows.to_string()),
        ("test_rows", report.test_rows.to_string()),
        ("rmse", format!("{:.4}", report.rmse)),
        ("r2", format!("{:.4}", report.r2)),
    ];
    for (name, value) in metrics {
        wtr.write_record(&["metric".to_string(), name.to_string(), value])?;
    }

    // Importances in feature-contract order.
    for (name, score) in &report.feature_importances {
        wtr.write_record(&[
            "importance".to_string(),
            name.to_string(),
            format!("{score:.6}"),
        ])?;
    }

    // Season composition of the deduplicated rows.
    for summary in &report.seasons {
        let label = summary.season.label();
        wtr.write_record(&[
            "season_rows".to_string(),
            label.to_string(),
            summary.rows.to_string(),
        ])?;
        wtr.write_record(&[
            "season_mean_power_kw".to_string(),
            label.to_string(),
            format!("{:.3}", summary.mean_power_kw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FEATURE_NAMES, Season};
    use crate::train::SeasonSummary;

    fn make_report() -> TrainingReport {
        TrainingReport {
            total_rows: 40,
            unique_rows: 36,
            train_rows: 29,
            test_rows: 7,
            rmse: 0.4123,
            r2: 0.8712,
            feature_importances: FEATURE_NAMES
                .iter()
                .map(|name| (*name, 1.0 / FEATURE_NAMES.len() as f64))
                .collect(),
            seasons: vec![
                SeasonSummary {
                    season: Season::Winter,
                    rows: 10,
                    mean_power_kw: 0.8,
                },
                SeasonSummary {
                    season: Season::Shoulder,
                    rows: 16,
                    mean_power_kw: 1.9,
                },
                SeasonSummary {
                    season: Season::Summer,
                    rows: 10,
                    mean_power_kw: 2.7,
                },
            ],
        }
    }

    #[test]
    fn header_and_row_count() {
        let report = make_report();
        let mut buf = Vec::new();
        write_csv(&report, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();

        assert_eq!(lines.first().copied(), Some("kind,name,value"));
        // 1 header + 6 metrics + 11 importances + 3 seasons * 2 rows
        assert_eq!(lines.len(), 1 + 6 + 11 + 6);
    }

    #[test]
    fn importance_rows_keep_contract_order() {
        let report = make_report();
        let mut buf = Vec::new();
        write_csv(&report, &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();

        let names: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("importance,"))
            .filter_map(|line| line.split(',').nth(1))
            .collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
    }

    #[test]
    fn deterministic_output() {
        let report = make_report();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&report, &mut buf1).ok();
        write_csv(&report, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn round_trip_parseable() {
        let report = make_report();
        let mut buf = Vec::new();
        write_csv(&report, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(3));

        let mut metric_rows = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.unwrap();
            if &rec[0] == "metric" {
                metric_rows += 1;
            }
            // value column always parses as f64
            let val: Result<f64, _> = rec[2].parse();
            assert!(val.is_ok(), "value column should parse as f64");
        }
        assert_eq!(metric_rows, 6);
    }

    #[test]
    fn export_writes_file() {
        let report = make_report();
        let dir = tempfile::tempdir().ok();
        let path = dir.as_ref().map(|d| d.path().join("report.csv"));
        let path = path.as_deref().unwrap();

        export_csv(&report, path).ok();

        let contents = std::fs::read_to_string(path).unwrap_or_default();
        assert!(contents.starts_with("kind,name,value"));
        assert!(contents.contains("metric,rmse,0.4123"));
    }
}
