//! Statistics Computation
//!
//! Aggregates collected measurements once sampling has finished. The points
//! are independent, so [`pibench_stats::aggregate_all`] spreads them over the
//! rayon pool; no process is running at that point.

use super::execution::Measurement;
use pibench_stats::{AggregatedResult, BenchmarkPoint, StatsError, aggregate_all};

/// Aggregate every measurement, preserving order
pub fn compute_statistics(
    measurements: &[Measurement],
) -> Result<Vec<AggregatedResult>, StatsError> {
    let points: Vec<BenchmarkPoint> = measurements.iter().map(|m| m.point.clone()).collect();
    aggregate_all(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pibench_stats::TimingSample;

    fn measurement(digits: u64, times: &[f64]) -> Measurement {
        Measurement {
            label: "piracer".to_string(),
            point: BenchmarkPoint::new(digits, times.iter().copied().map(TimingSample::new).collect()),
            output_digits: None,
        }
    }

    #[test]
    fn test_compute_statistics() {
        let stats =
            compute_statistics(&[measurement(10, &[3.0, 1.0, 2.0]), measurement(20, &[5.0, 5.0])])
                .unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].median_s(), 2.0);
        assert_eq!(stats[1].median_s(), 5.0);
    }

    #[test]
    fn test_empty_point_fails() {
        assert_eq!(
            compute_statistics(&[measurement(10, &[])]).unwrap_err(),
            StatsError::EmptySampleSet { digits: 10 }
        );
    }
}
