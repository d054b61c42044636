//! Subject vs Baseline Comparison
//!
//! Speedup of the measured program over a competitor at the same input size.
//! A speedup above 1.0 means the subject is faster.

use crate::MIN_RESOLVABLE_SECS;
use crate::aggregate::AggregatedResult;
use crate::error::StatsError;

/// Timing problems that make a comparison untrustworthy without being errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingAnomaly {
    /// Subject median is under [`MIN_RESOLVABLE_SECS`]; the speedup would be
    /// dominated by clock resolution, so it is left unset.
    BelowResolution {
        /// The offending subject median in seconds
        median_s: f64,
    },
}

impl std::fmt::Display for TimingAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingAnomaly::BelowResolution { median_s } => write!(
                f,
                "subject median {:.3e} s is below the {:.0e} s resolution floor",
                median_s, MIN_RESOLVABLE_SECS
            ),
        }
    }
}

/// Comparison of two aggregates for the same input size
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    subject: AggregatedResult,
    baseline: AggregatedResult,
    speedup: Option<f64>,
    anomaly: Option<TimingAnomaly>,
}

impl ComparisonResult {
    /// Shared input size
    pub fn digits(&self) -> u64 {
        self.subject.digits()
    }

    /// Aggregate of the measured program
    pub fn subject(&self) -> &AggregatedResult {
        &self.subject
    }

    /// Aggregate of the competitor
    pub fn baseline(&self) -> &AggregatedResult {
        &self.baseline
    }

    /// Baseline median ÷ subject median; `None` when the subject timing is unresolved
    pub fn speedup(&self) -> Option<f64> {
        self.speedup
    }

    /// Timing anomaly, if any
    pub fn anomaly(&self) -> Option<TimingAnomaly> {
        self.anomaly
    }
}

/// Compare `subject` against `baseline`.
///
/// # Errors
///
/// [`StatsError::SizeMismatch`] when the two results were measured at
/// different input sizes.
pub fn compare(
    subject: &AggregatedResult,
    baseline: &AggregatedResult,
) -> Result<ComparisonResult, StatsError> {
    if subject.digits() != baseline.digits() {
        return Err(StatsError::SizeMismatch {
            subject: subject.digits(),
            baseline: baseline.digits(),
        });
    }

    let (speedup, anomaly) = if subject.median_s() < MIN_RESOLVABLE_SECS {
        (
            None,
            Some(TimingAnomaly::BelowResolution {
                median_s: subject.median_s(),
            }),
        )
    } else {
        (Some(baseline.median_s() / subject.median_s()), None)
    };

    Ok(ComparisonResult {
        subject: subject.clone(),
        baseline: baseline.clone(),
        speedup,
        anomaly,
    })
}
