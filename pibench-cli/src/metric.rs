//! Metric Extraction
//!
//! The digit generator may print a line such as
//! `Performance: 12.345 ns/digit` on stderr. Parsing is lenient: anything
//! that does not yield a finite number is treated as "no metric".

use crate::runner::RunOutcome;
use thiserror::Error;

/// Marker token preceding the self-reported ns/digit figure
pub const METRIC_MARKER: &str = "Performance:";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("malformed metric line: {line:?}")]
    MalformedMetricLine { line: String },
}

/// Parse one stderr line.
///
/// `Ok(None)` when the line has no marker; an error when it has one but the
/// value after it is missing or not a finite number.
pub fn parse_metric_line(line: &str) -> Result<Option<f64>, MetricError> {
    let Some(pos) = line.find(METRIC_MARKER) else {
        return Ok(None);
    };

    let malformed = || MetricError::MalformedMetricLine {
        line: line.to_string(),
    };

    let value = line[pos..]
        .split_whitespace()
        .nth(1)
        .ok_or_else(malformed)?
        .parse::<f64>()
        .map_err(|_| malformed())?;

    if !value.is_finite() {
        return Err(malformed());
    }
    Ok(Some(value))
}

/// First valid metric in `stderr`
pub fn parse_metric(stderr: &str) -> Option<f64> {
    stderr.lines().find_map(|line| match parse_metric_line(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("{}", e);
            None
        }
    })
}

/// Self-reported metric of a captured run
pub fn extract_metric(outcome: &RunOutcome) -> Option<f64> {
    parse_metric(&outcome.stderr)
}

/// Number of digits the generator printed.
///
/// Looks at the last non-empty stdout line and counts what follows the
/// radix point (`3.14159` has 5 digits). A line without a point counts in full.
pub fn output_digit_count(stdout: &str) -> Option<u64> {
    let last = stdout.lines().map(str::trim).rfind(|l| !l.is_empty())?;
    let digits = match last.split_once('.') {
        Some((_, fraction)) => fraction,
        None => last,
    };
    Some(digits.chars().count() as u64)
}
