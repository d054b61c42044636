//! CSV Output
//!
//! Fixed-precision tables: seconds `{:.6}`, ns/digit `{:.3}`, ratios `{:.2}`.
//! Absent optional values are written as `N/A`.

use crate::error::ReportError;
use crate::report::{AggregateRecord, ComparisonRecord, MatrixCellRecord, Report, ScalingRecord};
use std::io::Write;

/// Placeholder for absent optional values
pub const MISSING: &str = "N/A";

fn seconds(v: f64) -> String {
    format!("{:.6}", v)
}

fn nanos(v: f64) -> String {
    format!("{:.3}", v)
}

fn ratio(v: f64) -> String {
    format!("{:.2}", v)
}

fn or_missing(v: Option<f64>, fmt: fn(f64) -> String) -> String {
    v.map(fmt).unwrap_or_else(|| MISSING.to_string())
}

/// Write aggregates as `digits,median_s,ns_per_digit`.
///
/// A leading `label` column is added when any record carries a label.
pub fn write_results_csv<W: Write>(
    writer: W,
    results: &[AggregateRecord],
) -> Result<(), ReportError> {
    let labelled = results.iter().any(|r| r.label.is_some());
    let mut wtr = csv::Writer::from_writer(writer);

    if labelled {
        wtr.write_record(["label", "digits", "median_s", "ns_per_digit"])?;
    } else {
        wtr.write_record(["digits", "median_s", "ns_per_digit"])?;
    }

    for r in results {
        let mut row = Vec::with_capacity(4);
        if labelled {
            row.push(r.label.clone().unwrap_or_default());
        }
        row.push(r.digits.to_string());
        row.push(seconds(r.median_s));
        row.push(nanos(r.ns_per_digit));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write comparisons as
/// `digits,piracer_median_s,piracer_ns_per_digit,minipi_median_s,speedup`.
///
/// `piracer_ns_per_digit` is the program's own reported figure.
pub fn write_comparisons_csv<W: Write>(
    writer: W,
    comparisons: &[ComparisonRecord],
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "digits",
        "piracer_median_s",
        "piracer_ns_per_digit",
        "minipi_median_s",
        "speedup",
    ])?;

    for c in comparisons {
        wtr.write_record([
            c.digits.to_string(),
            seconds(c.subject.median_s),
            or_missing(c.subject.reported_ns_per_digit, nanos),
            seconds(c.baseline.median_s),
            or_missing(c.speedup, ratio),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write scaling steps with their linear-growth ideals
pub fn write_scaling_csv<W: Write>(
    writer: W,
    steps: &[ScalingRecord],
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "from_digits",
        "to_digits",
        "size_ratio",
        "time_ratio",
        "ideal_time_ratio",
        "per_digit_ratio",
        "ideal_per_digit_ratio",
    ])?;

    for s in steps {
        wtr.write_record([
            s.from_digits.to_string(),
            s.to_digits.to_string(),
            ratio(s.size_ratio),
            ratio(s.time_ratio),
            ratio(s.ideal_time_ratio),
            ratio(s.per_digit_ratio),
            ratio(s.ideal_per_digit_ratio),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write one row per matrix cell
pub fn write_matrix_csv<W: Write>(
    writer: W,
    cells: &[MatrixCellRecord],
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["profile", "instrumentation", "status", "failed_stage"])?;

    for cell in cells {
        wtr.write_record([
            cell.profile.clone(),
            cell.instrumentation.clone(),
            cell.status.to_string(),
            cell.failed_stage.clone().unwrap_or_else(|| MISSING.to_string()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render the primary table of a report as CSV.
///
/// Comparisons win over plain results; matrix reports list their cells.
/// Scaling steps follow plain results after a blank line.
pub fn generate_csv_report(report: &Report) -> Result<String, ReportError> {
    let mut out = Vec::new();

    if !report.comparisons.is_empty() {
        write_comparisons_csv(&mut out, &report.comparisons)?;
    } else if !report.matrix.is_empty() {
        write_matrix_csv(&mut out, &report.matrix)?;
    } else {
        write_results_csv(&mut out, &report.results)?;
        if !report.scaling.is_empty() {
            out.push(b'\n');
            write_scaling_csv(&mut out, &report.scaling)?;
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}
