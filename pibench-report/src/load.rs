//! Loading Saved Results
//!
//! Reads tables written by any pibench command (or by hand) back into flat
//! [`PerfRecord`]s for the narrative summary. Both CSV files and JSON reports
//! are accepted.

use crate::error::ReportError;
use crate::report::Report;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Columns consulted for ns/digit, in priority order
const NS_COLUMNS: &[&str] = &["ns_per_digit", "piracer_ns_per_digit"];
/// Columns consulted for median seconds when ns/digit must be derived
const MEDIAN_COLUMNS: &[&str] = &["median_s", "piracer_median_s"];
/// First header of the scaling table that may follow a results table
const SCALING_SECTION: &str = "from_digits";
/// Categorical columns recognised without `--group-by`
const LABEL_COLUMNS: &[&str] = &["label", "algorithm", "competitor"];

/// One (size, per-digit time) observation, optionally labelled
#[derive(Debug, Clone, PartialEq)]
pub struct PerfRecord {
    pub label: Option<String>,
    pub digits: u64,
    pub median_s: Option<f64>,
    pub ns_per_digit: f64,
}

/// Load records from a `.csv` or `.json` file.
///
/// `group_by` names the categorical column; without it the first of
/// `label`, `algorithm` or `competitor` present is used.
pub fn load_records(path: &Path, group_by: Option<&str>) -> Result<Vec<PerfRecord>, ReportError> {
    if !path.exists() {
        return Err(ReportError::MissingInputFile {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let records = match extension.as_deref() {
        Some("csv") => read_csv_records(std::fs::File::open(path)?, group_by)?,
        Some("json") => read_json_records(std::fs::File::open(path)?, group_by)?,
        _ => {
            return Err(ReportError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    if records.is_empty() {
        return Err(ReportError::EmptyData(path.display().to_string()));
    }
    Ok(records)
}

/// Parse CSV rows into records
pub fn read_csv_records<R: Read>(
    reader: R,
    group_by: Option<&str>,
) -> Result<Vec<PerfRecord>, ReportError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    if !headers.iter().any(|h| h == "digits") {
        return Err(ReportError::MissingColumn {
            column: "digits".to_string(),
            source_name: "CSV header".to_string(),
        });
    }

    let mut records = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        // Extreme reports append a scaling table with its own header
        if row.get(0).map(str::trim) == Some(SCALING_SECTION) {
            break;
        }
        if row.len() != headers.len() {
            return Err(ReportError::InvalidField {
                row: idx + 1,
                column: "<row>".to_string(),
                value: format!("{} fields, expected {}", row.len(), headers.len()),
            });
        }
        let fields: HashMap<&str, String> = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter().map(|f| f.trim().to_string()))
            .collect();
        records.push(record_from_fields(idx + 1, &fields, group_by)?);
    }
    Ok(records)
}

/// Parse a JSON report, or a JSON array of flat row objects
pub fn read_json_records<R: Read>(
    reader: R,
    group_by: Option<&str>,
) -> Result<Vec<PerfRecord>, ReportError> {
    let value: Value = serde_json::from_reader(reader)?;

    match value {
        Value::Array(rows) => rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let fields = flatten_object(row);
                let fields: HashMap<&str, String> =
                    fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
                record_from_fields(idx + 1, &fields, group_by)
            })
            .collect(),
        other => {
            let report: Report = serde_json::from_value(other)?;
            Ok(records_from_report(&report))
        }
    }
}

/// Flatten a saved report: plain results keep their labels, comparisons
/// contribute one record per side.
pub fn records_from_report(report: &Report) -> Vec<PerfRecord> {
    let mut records: Vec<PerfRecord> = report
        .results
        .iter()
        .map(|r| PerfRecord {
            label: r.label.clone(),
            digits: r.digits,
            median_s: Some(r.median_s),
            ns_per_digit: r.ns_per_digit,
        })
        .collect();

    for c in &report.comparisons {
        records.push(PerfRecord {
            label: Some("piracer".to_string()),
            digits: c.digits,
            median_s: Some(c.subject.median_s),
            ns_per_digit: c.subject.ns_per_digit,
        });
        records.push(PerfRecord {
            label: Some(c.competitor.clone()),
            digits: c.digits,
            median_s: Some(c.baseline.median_s),
            ns_per_digit: c.baseline.ns_per_digit,
        });
    }
    records
}

fn flatten_object(value: &Value) -> Vec<(String, String)> {
    let Some(map) = value.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((k.clone(), text))
        })
        .collect()
}

fn record_from_fields(
    row: usize,
    fields: &HashMap<&str, String>,
    group_by: Option<&str>,
) -> Result<PerfRecord, ReportError> {
    let digits_text = fields.get("digits").ok_or_else(|| ReportError::MissingColumn {
        column: "digits".to_string(),
        source_name: format!("row {}", row),
    })?;
    let digits: u64 = digits_text
        .parse()
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| ReportError::InvalidField {
            row,
            column: "digits".to_string(),
            value: digits_text.clone(),
        })?;

    let median_s = first_number(fields, MEDIAN_COLUMNS, row)?;
    let ns_per_digit = match first_number(fields, NS_COLUMNS, row)? {
        Some(ns) => ns,
        None => match median_s {
            Some(m) => m * NANOS_PER_SEC / digits as f64,
            None => {
                return Err(ReportError::MissingColumn {
                    column: "ns_per_digit".to_string(),
                    source_name: format!("row {}", row),
                });
            }
        },
    };

    let label = match group_by {
        Some(column) => Some(fields.get(column).cloned().ok_or_else(|| {
            ReportError::MissingColumn {
                column: column.to_string(),
                source_name: format!("row {}", row),
            }
        })?),
        None => LABEL_COLUMNS.iter().find_map(|c| fields.get(c).cloned()),
    }
    .filter(|l| !l.is_empty());

    Ok(PerfRecord {
        label,
        digits,
        median_s,
        ns_per_digit,
    })
}

/// First present, non-placeholder value among `columns`
fn first_number(
    fields: &HashMap<&str, String>,
    columns: &[&str],
    row: usize,
) -> Result<Option<f64>, ReportError> {
    for column in columns {
        let Some(text) = fields.get(column) else {
            continue;
        };
        if text.is_empty() || text.eq_ignore_ascii_case("n/a") {
            continue;
        }
        let value: f64 = text.parse().map_err(|_| ReportError::InvalidField {
            row,
            column: column.to_string(),
            value: text.clone(),
        })?;
        if !value.is_finite() {
            return Err(ReportError::InvalidField {
                row,
                column: column.to_string(),
                value: text.clone(),
            });
        }
        return Ok(Some(value));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_io::{write_comparisons_csv, write_results_csv};
    use crate::report::{AggregateRecord, ComparisonRecord};
    use pibench_stats::{BenchmarkPoint, TimingSample, aggregate, compare};
    use std::io::Write as _;

    fn record(digits: u64, secs: f64) -> AggregateRecord {
        let point = BenchmarkPoint::new(digits, vec![TimingSample::new(secs)]);
        AggregateRecord::from(&aggregate(&point).unwrap())
    }

    #[test]
    fn test_csv_round_trip_preserves_sizes_and_ns() {
        let rows = vec![
            record(1_000, 0.000_123_456_7),
            record(10_000, 0.0123),
            record(100_000, 1.75),
        ];
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &rows).unwrap();

        let loaded = read_csv_records(buf.as_slice(), None).unwrap();
        assert_eq!(loaded.len(), rows.len());
        for (orig, back) in rows.iter().zip(&loaded) {
            assert_eq!(orig.digits, back.digits);
            assert!((orig.ns_per_digit - back.ns_per_digit).abs() < 1e-3);
            assert_eq!(back.label, None);
        }
    }

    #[test]
    fn test_comparison_csv_falls_back_to_median() {
        let subject = aggregate(&BenchmarkPoint::new(1_000, vec![TimingSample::new(0.002)])).unwrap();
        let baseline = aggregate(&BenchmarkPoint::new(1_000, vec![TimingSample::new(0.006)])).unwrap();
        let cmp = ComparisonRecord::new("minipi", &compare(&subject, &baseline).unwrap());

        let mut buf = Vec::new();
        write_comparisons_csv(&mut buf, &[cmp]).unwrap();

        let loaded = read_csv_records(buf.as_slice(), None).unwrap();
        assert_eq!(loaded[0].digits, 1_000);
        assert!((loaded[0].ns_per_digit - 2_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_algorithm_column_becomes_label() {
        let data = "algorithm,digits,ns_per_digit\nchudnovsky,1000,12.5\nmachin,1000,80.0\n";
        let loaded = read_csv_records(data.as_bytes(), None).unwrap();
        assert_eq!(loaded[0].label.as_deref(), Some("chudnovsky"));
        assert_eq!(loaded[1].label.as_deref(), Some("machin"));
    }

    #[test]
    fn test_group_by_missing_column() {
        let data = "digits,ns_per_digit\n1000,12.5\n";
        assert!(matches!(
            read_csv_records(data.as_bytes(), Some("threads")),
            Err(ReportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_invalid_digits_field() {
        let data = "digits,ns_per_digit\nlots,12.5\n";
        assert!(matches!(
            read_csv_records(data.as_bytes(), None),
            Err(ReportError::InvalidField { row: 1, .. })
        ));
    }

    #[test]
    fn test_trailing_scaling_table_ignored() {
        let data = "digits,median_s,ns_per_digit\n\
                    10000,0.100000,10000.000\n\
                    100000,1.100000,11000.000\n\
                    \n\
                    from_digits,to_digits,size_ratio,time_ratio,ideal_time_ratio,per_digit_ratio,ideal_per_digit_ratio\n\
                    10000,100000,10.00,11.00,10.00,1.10,1.00\n";
        let loaded = read_csv_records(data.as_bytes(), None).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].digits, 100_000);
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let data = "digits,median_s,ns_per_digit\n\
                    1000,0.001000,1000.000\n\
                    2000,0.002000\n\
                    4000,0.004000,1000.000\n";
        match read_csv_records(data.as_bytes(), None) {
            Err(ReportError::InvalidField { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "2 fields, expected 3");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_json_rows() {
        let data = r#"[{"digits": 1000, "ns_per_digit": 10.0, "algorithm": "a"},
                       {"digits": 2000, "median_s": 0.5}]"#;
        let loaded = read_json_records(data.as_bytes(), None).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].label.as_deref(), Some("a"));
        assert!((loaded[1].ns_per_digit - 250_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(matches!(
            load_records(&path, None),
            Err(ReportError::MissingInputFile { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "digits").unwrap();
        assert!(matches!(
            load_records(file.path(), None),
            Err(ReportError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "digits,median_s,ns_per_digit\n1000,0.001000,1000.000\n").unwrap();
        let loaded = load_records(file.path(), None).unwrap();
        assert_eq!(loaded[0].digits, 1_000);
        assert_eq!(loaded[0].median_s, Some(0.001));
    }
}
