#![warn(missing_docs)]
//! pibench Report - Result Output
//!
//! Generates and reads back the harness's output formats:
//! - CSV (fixed-precision tables)
//! - JSON (machine-readable, with metadata)
//! - Narrative summary of a saved table

mod csv_io;
mod error;
mod json;
mod load;
mod report;
mod summary;

pub use csv_io::{
    MISSING, generate_csv_report, write_comparisons_csv, write_matrix_csv, write_results_csv,
    write_scaling_csv,
};
pub use error::ReportError;
pub use json::{REPORT_SCHEMA, REPORT_SCHEMA_VERSION, ReportSchema, generate_json_report};
pub use load::{PerfRecord, load_records, read_csv_records, read_json_records, records_from_report};
pub use report::{
    AggregateRecord, CellStatus, ComparisonRecord, MatrixCellRecord, ProbeRecord, Report,
    ReportKind, ReportMeta, ReportSummary, ScalingRecord, StageRecord, SystemInfo,
};
pub use summary::{GroupSummary, PerformanceSummary, generate_summary, summarize};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Human,
    /// CSV tables
    Csv,
    /// JSON with full metadata
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Format a duration in seconds with an adaptive unit
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1e-6 {
        format!("{:.2} ns", seconds * 1e9)
    } else if seconds < 1e-3 {
        format!("{:.2} µs", seconds * 1e6)
    } else if seconds < 1.0 {
        format!("{:.2} ms", seconds * 1e3)
    } else {
        format!("{:.3} s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_report() -> Report {
        Report {
            meta: ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: Utc::now(),
                git_commit: None,
                git_branch: None,
                system: SystemInfo {
                    os: "linux".to_string(),
                    arch: "x86_64".to_string(),
                    cpu: "test".to_string(),
                    cpu_cores: 4,
                    memory_gb: 8.0,
                },
                subject: Some("build/piracer".to_string()),
                baseline: None,
            },
            kind: ReportKind::Bench,
            results: Vec::new(),
            comparisons: Vec::new(),
            scaling: Vec::new(),
            matrix: Vec::new(),
            probes: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(5e-7), "500.00 ns");
        assert_eq!(format_duration(0.0025), "2.50 ms");
        assert_eq!(format_duration(2.0), "2.000 s");
    }

    #[test]
    fn test_json_report_loads_back() {
        let mut report = empty_report();
        report.results.push(AggregateRecord {
            label: None,
            digits: 1_000,
            repetitions: 1,
            median_s: 0.001,
            ns_per_digit: 1_000.0,
            reported_ns_per_digit: None,
            mean_s: 0.001,
            std_dev_s: 0.0,
            min_s: 0.001,
            max_s: 0.001,
            outliers: 0,
            samples_s: vec![0.001],
            output_digits: Some(1_000),
        });

        let json = generate_json_report(&report).unwrap();
        assert!(json.contains("\"$schema\""));

        let records = read_json_records(json.as_bytes(), None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].digits, 1_000);
    }
}
