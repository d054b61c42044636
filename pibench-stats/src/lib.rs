#![warn(missing_docs)]
//! pibench Statistical Engine
//!
//! Pure computations over timing samples collected from external processes:
//! - Median aggregation with per-digit throughput
//! - Descriptive spread and Tukey outlier counts for auditing noisy hosts
//! - Subject vs baseline speedup
//! - Scaling diagnostics across increasing input sizes
//!
//! Nothing here spawns processes or formats output.

mod aggregate;
mod comparison;
mod error;
mod median;
mod outliers;
mod scaling;
mod summary;

pub use aggregate::{AggregatedResult, BenchmarkPoint, TimingSample, aggregate, aggregate_all};
pub use comparison::{ComparisonResult, TimingAnomaly, compare};
pub use error::StatsError;
pub use median::{median, percentile};
pub use outliers::{DEFAULT_FENCE_K, Fences, OutlierCount, count_outliers, tukey_fences};
pub use scaling::{ScalingStep, analyze_scaling};
pub use summary::{Spread, describe};

/// Shortest median, in seconds, treated as a real measurement.
///
/// Process spawn alone costs far more than this, so a smaller median means the
/// clock could not resolve the run.
pub const MIN_RESOLVABLE_SECS: f64 = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_floor() {
        assert!((MIN_RESOLVABLE_SECS - 1e-6).abs() < f64::EPSILON);
    }
}
