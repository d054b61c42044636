//! Scaling Analysis
//!
//! Ratio-of-growth diagnostics between consecutive input sizes. For a
//! linear-time generator the time ratio tracks the size ratio and the
//! per-digit ratio stays at 1.0; anything above that is super-linear growth.
//! No thresholds are applied here.

use crate::MIN_RESOLVABLE_SECS;
use crate::aggregate::AggregatedResult;
use crate::error::StatsError;

/// Growth between two consecutive aggregates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingStep {
    /// Smaller input size
    pub from_digits: u64,
    /// Larger input size
    pub to_digits: u64,
    /// `to_digits / from_digits`
    pub size_ratio: f64,
    /// Ratio of median elapsed times
    pub time_ratio: f64,
    /// Ratio of ns/digit
    pub per_digit_ratio: f64,
}

impl ScalingStep {
    /// Time ratio a linear-time algorithm would show
    pub fn ideal_time_ratio(&self) -> f64 {
        self.size_ratio
    }

    /// Per-digit ratio a linear-time algorithm would show
    pub fn ideal_per_digit_ratio(&self) -> f64 {
        1.0
    }

    /// How far the per-digit cost drifted from constant, as a fraction
    /// (0.1 = 10% more expensive per digit)
    pub fn per_digit_drift(&self) -> f64 {
        self.per_digit_ratio - 1.0
    }
}

/// Compute one [`ScalingStep`] per consecutive pair.
///
/// Fewer than two results yield an empty sequence.
///
/// # Errors
///
/// - [`StatsError::NonIncreasingSizes`] if sizes are not strictly increasing
/// - [`StatsError::UnresolvedTiming`] if a step would divide by a median under
///   the timer resolution
pub fn analyze_scaling(results: &[AggregatedResult]) -> Result<Vec<ScalingStep>, StatsError> {
    results
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            if curr.digits() <= prev.digits() {
                return Err(StatsError::NonIncreasingSizes {
                    previous: prev.digits(),
                    current: curr.digits(),
                });
            }
            if prev.median_s() < MIN_RESOLVABLE_SECS {
                return Err(StatsError::UnresolvedTiming {
                    digits: prev.digits(),
                    median_s: prev.median_s(),
                });
            }

            Ok(ScalingStep {
                from_digits: prev.digits(),
                to_digits: curr.digits(),
                size_ratio: curr.digits() as f64 / prev.digits() as f64,
                time_ratio: curr.median_s() / prev.median_s(),
                per_digit_ratio: curr.ns_per_digit() / prev.ns_per_digit(),
            })
        })
        .collect()
}
