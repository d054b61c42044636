//! Statistics errors

use thiserror::Error;

/// Contract violations raised by aggregation, comparison and scaling.
///
/// All of these are programming or precondition errors; none of them is
/// recovered from locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("cannot aggregate {digits} digits: no samples were recorded")]
    EmptySampleSet { digits: u64 },

    #[error("input size must be positive")]
    ZeroInputSize,

    #[error("invalid elapsed time {value} s for {digits} digits")]
    InvalidSample { digits: u64, value: f64 },

    #[error("cannot compare results of different sizes: subject {subject} digits, baseline {baseline} digits")]
    SizeMismatch { subject: u64, baseline: u64 },

    #[error("scaling input must be strictly increasing in size: {previous} digits followed by {current}")]
    NonIncreasingSizes { previous: u64, current: u64 },

    #[error("median for {digits} digits ({median_s} s) is below the timer resolution")]
    UnresolvedTiming { digits: u64, median_s: f64 },
}
