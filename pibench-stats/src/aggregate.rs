//! Sample Aggregation
//!
//! Turns the repeated timings of one input size into a single
//! [`AggregatedResult`]. The median is the headline figure: process spawn
//! jitter produces occasional slow runs that would drag a mean upward.

use crate::error::StatsError;
use crate::median::median;
use crate::summary::{Spread, describe};
use rayon::prelude::*;

/// Nanoseconds per second
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// One timed invocation of the measured program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    /// Wall-clock seconds from spawn to exit
    pub elapsed_s: f64,
    /// Self-reported ns/digit, if the program printed one
    pub metric: Option<f64>,
}

impl TimingSample {
    /// Sample without a self-reported metric
    pub fn new(elapsed_s: f64) -> Self {
        Self {
            elapsed_s,
            metric: None,
        }
    }

    /// Sample with an optional self-reported metric
    pub fn with_metric(elapsed_s: f64, metric: Option<f64>) -> Self {
        Self { elapsed_s, metric }
    }
}

/// All repetitions recorded for one input size, in run order
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkPoint {
    digits: u64,
    samples: Vec<TimingSample>,
}

impl BenchmarkPoint {
    /// Build a point from samples in the order they were taken
    pub fn new(digits: u64, samples: Vec<TimingSample>) -> Self {
        Self { digits, samples }
    }

    /// Input size
    pub fn digits(&self) -> u64 {
        self.digits
    }

    /// Number of repetitions, always equal to the number of samples
    pub fn repetitions(&self) -> usize {
        self.samples.len()
    }

    /// Samples in run order
    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    /// Elapsed seconds in run order
    pub fn elapsed(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed_s).collect()
    }
}

/// Statistics for one input size. Built once by [`aggregate`]; read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    digits: u64,
    median_s: f64,
    ns_per_digit: f64,
    median_metric: Option<f64>,
    samples_s: Vec<f64>,
    spread: Spread,
}

impl AggregatedResult {
    /// Input size
    pub fn digits(&self) -> u64 {
        self.digits
    }

    /// Number of repetitions aggregated
    pub fn repetitions(&self) -> usize {
        self.samples_s.len()
    }

    /// Median elapsed seconds
    pub fn median_s(&self) -> f64 {
        self.median_s
    }

    /// Median elapsed time divided by input size, in nanoseconds per digit
    pub fn ns_per_digit(&self) -> f64 {
        self.ns_per_digit
    }

    /// Median of the self-reported metric over the runs that printed one
    pub fn median_metric(&self) -> Option<f64> {
        self.median_metric
    }

    /// Raw elapsed seconds in run order
    pub fn samples_s(&self) -> &[f64] {
        &self.samples_s
    }

    /// Mean, standard deviation, extremes and outlier count of the raw samples
    pub fn spread(&self) -> &Spread {
        &self.spread
    }
}

/// Aggregate one benchmark point.
///
/// # Errors
///
/// - [`StatsError::ZeroInputSize`] when the point has zero digits
/// - [`StatsError::EmptySampleSet`] when no repetitions were recorded
/// - [`StatsError::InvalidSample`] for a negative or non-finite elapsed time
pub fn aggregate(point: &BenchmarkPoint) -> Result<AggregatedResult, StatsError> {
    let digits = point.digits();
    if digits == 0 {
        return Err(StatsError::ZeroInputSize);
    }

    let samples_s = point.elapsed();
    if let Some(&bad) = samples_s.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(StatsError::InvalidSample { digits, value: bad });
    }

    let (Some(median_s), Some(spread)) = (median(&samples_s), describe(&samples_s)) else {
        return Err(StatsError::EmptySampleSet { digits });
    };

    let metrics: Vec<f64> = point
        .samples()
        .iter()
        .filter_map(|s| s.metric)
        .filter(|m| m.is_finite())
        .collect();

    Ok(AggregatedResult {
        digits,
        median_s,
        ns_per_digit: median_s * NANOS_PER_SEC / digits as f64,
        median_metric: median(&metrics),
        samples_s,
        spread,
    })
}

/// Aggregate several points in parallel, preserving input order.
///
/// Sampling must already be complete: this only touches in-memory data, so
/// spreading it across the rayon pool cannot disturb any measurement.
pub fn aggregate_all(points: &[BenchmarkPoint]) -> Result<Vec<AggregatedResult>, StatsError> {
    points.par_iter().map(aggregate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(digits: u64, times: &[f64]) -> BenchmarkPoint {
        BenchmarkPoint::new(digits, times.iter().copied().map(TimingSample::new).collect())
    }

    #[test]
    fn test_median_and_per_digit() {
        let result = aggregate(&point(1_000, &[0.003, 0.001, 0.002])).unwrap();
        assert_eq!(result.digits(), 1_000);
        assert_eq!(result.repetitions(), 3);
        assert!((result.median_s() - 0.002).abs() < 1e-15);
        assert!((result.ns_per_digit() - 2_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_even_repetitions() {
        let result = aggregate(&point(10, &[4.0, 1.0, 3.0, 2.0])).unwrap();
        assert!((result.median_s() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_raw_samples_retained_in_run_order() {
        let result = aggregate(&point(10, &[0.3, 0.1, 0.2])).unwrap();
        assert_eq!(result.samples_s(), &[0.3, 0.1, 0.2]);
    }

    #[test]
    fn test_empty_is_an_error_not_zero() {
        let err = aggregate(&point(100, &[])).unwrap_err();
        assert_eq!(err, StatsError::EmptySampleSet { digits: 100 });
    }

    #[test]
    fn test_zero_digits_rejected() {
        assert_eq!(
            aggregate(&point(0, &[1.0])).unwrap_err(),
            StatsError::ZeroInputSize
        );
    }

    #[test]
    fn test_negative_sample_rejected() {
        assert!(matches!(
            aggregate(&point(10, &[1.0, -0.5])),
            Err(StatsError::InvalidSample { digits: 10, .. })
        ));
    }

    #[test]
    fn test_metric_median_over_present_samples_only() {
        let samples = vec![
            TimingSample::with_metric(1.0, Some(30.0)),
            TimingSample::with_metric(1.0, None),
            TimingSample::with_metric(1.0, Some(10.0)),
            TimingSample::with_metric(1.0, Some(20.0)),
        ];
        let result = aggregate(&BenchmarkPoint::new(50, samples)).unwrap();
        assert_eq!(result.median_metric(), Some(20.0));
    }

    #[test]
    fn test_no_metric_samples() {
        let result = aggregate(&point(50, &[1.0, 2.0])).unwrap();
        assert_eq!(result.median_metric(), None);
    }

    #[test]
    fn test_aggregate_all_preserves_order() {
        let points = vec![point(10, &[1.0]), point(20, &[2.0]), point(30, &[3.0])];
        let results = aggregate_all(&points).unwrap();
        let sizes: Vec<u64> = results.iter().map(|r| r.digits()).collect();
        assert_eq!(sizes, vec![10, 20, 30]);
    }

    #[test]
    fn test_aggregate_all_fails_on_any_empty_point() {
        let points = vec![point(10, &[1.0]), point(20, &[])];
        assert_eq!(
            aggregate_all(&points).unwrap_err(),
            StatsError::EmptySampleSet { digits: 20 }
        );
    }
}
