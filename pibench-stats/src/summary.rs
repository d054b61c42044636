//! Descriptive Spread
//!
//! Mean, sample standard deviation and extremes for a set of values. Used for
//! the audit fields of an aggregate and for the ns/digit overview of a report.

use crate::outliers::{DEFAULT_FENCE_K, OutlierCount, count_outliers};
use std::cmp::Ordering;

/// Spread of a non-empty sample set
#[derive(Debug, Clone, PartialEq)]
pub struct Spread {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1); zero for a single value
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Values outside the Tukey fences
    pub outliers: OutlierCount,
}

/// Describe a sample set. `None` when `values` is empty.
pub fn describe(values: &[f64]) -> Option<Spread> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std_dev = if count < 2 {
        0.0
    } else {
        let variance =
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    let min = values
        .iter()
        .copied()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(mean);
    let max = values
        .iter()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(mean);

    Some(Spread {
        count,
        mean,
        std_dev,
        min,
        max,
        outliers: count_outliers(values, DEFAULT_FENCE_K),
    })
}

impl Spread {
    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }

    /// Whether the relative spread is under `cv_threshold` percent
    pub fn is_stable(&self, cv_threshold: f64) -> bool {
        self.coefficient_of_variation() < cv_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_spread() {
        let spread = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(spread.count, 5);
        assert!((spread.mean - 3.0).abs() < 1e-12);
        assert!((spread.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(spread.min, 1.0);
        assert_eq!(spread.max, 5.0);
    }

    #[test]
    fn test_single_value_has_zero_std_dev() {
        let spread = describe(&[0.25]).unwrap();
        assert_eq!(spread.std_dev, 0.0);
        assert_eq!(spread.min, 0.25);
        assert_eq!(spread.max, 0.25);
    }

    #[test]
    fn test_constant_values_are_stable() {
        let spread = describe(&[2.0; 6]).unwrap();
        assert!(spread.coefficient_of_variation().abs() < f64::EPSILON);
        assert!(spread.is_stable(1.0));
    }

    #[test]
    fn test_empty() {
        assert!(describe(&[]).is_none());
    }
}
