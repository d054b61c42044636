//! Outlier Fencing
//!
//! Tukey fences over timing samples. Outliers are only counted, never removed:
//! the aggregate median is already robust to them, and the count is kept so
//! that a noisy host shows up in the audit trail.

use crate::median::percentile;

/// Default fence multiplier (1.5 × IQR).
pub const DEFAULT_FENCE_K: f64 = 1.5;

/// Lower and upper Tukey fences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fences {
    /// Values strictly below are low outliers
    pub lower: f64,
    /// Values strictly above are high outliers
    pub upper: f64,
}

/// Outlier counts for one sample set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlierCount {
    /// Samples below the lower fence
    pub low: usize,
    /// Samples above the upper fence
    pub high: usize,
}

impl OutlierCount {
    /// Total outliers on both sides
    pub fn total(&self) -> usize {
        self.low + self.high
    }
}

/// Compute `[Q1 - k·IQR, Q3 + k·IQR]`. `None` when there are no samples.
pub fn tukey_fences(samples: &[f64], k: f64) -> Option<Fences> {
    let q1 = percentile(samples, 25.0)?;
    let q3 = percentile(samples, 75.0)?;
    let iqr = q3 - q1;
    Some(Fences {
        lower: q1 - k * iqr,
        upper: q3 + k * iqr,
    })
}

/// Count samples outside the Tukey fences.
///
/// Fewer than four samples give quartiles too coarse to fence anything, so
/// they always report zero outliers.
pub fn count_outliers(samples: &[f64], k: f64) -> OutlierCount {
    if samples.len() < 4 {
        return OutlierCount::default();
    }
    let Some(fences) = tukey_fences(samples, k) else {
        return OutlierCount::default();
    };

    samples
        .iter()
        .fold(OutlierCount::default(), |mut count, &sample| {
            if sample < fences.lower {
                count.low += 1;
            } else if sample > fences.upper {
                count.high += 1;
            }
            count
        })
}
