//! Order Statistics
//!
//! Median and percentile helpers over timing samples. Callers' slices are never
//! reordered; every function sorts a private copy.

use std::cmp::Ordering;

/// Median using the odd/even rule.
///
/// Odd length: the middle value after sorting. Even length: the mean of the two
/// middle values. Returns `None` for an empty slice so that callers cannot
/// mistake "no data" for a zero timing.
///
/// # Examples
///
/// ```
/// # use pibench_stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let sorted = sorted_copy(samples);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentile with linear interpolation between nearest ranks.
///
/// `pct` is in `[0, 100]`. Used for quartiles when fencing outliers.
pub fn percentile(samples: &[f64], pct: f64) -> Option<f64> {
    match samples.len() {
        0 => None,
        1 => Some(samples[0]),
        n => {
            let sorted = sorted_copy(samples);
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(n - 1);
            let fraction = rank - lower as f64;
            Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
        }
    }
}

fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn test_median_even_is_mean_of_middle_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 10.0]), Some(2.5));
    }

    #[test]
    fn test_median_identical_values() {
        for n in 1..=8 {
            let samples = vec![0.125; n];
            assert_eq!(median(&samples), Some(0.125), "n = {}", n);
        }
    }

    #[test]
    fn test_median_order_independent() {
        let a = [0.9, 0.3, 0.7, 0.1, 0.5, 0.2];
        let b = [0.1, 0.2, 0.3, 0.5, 0.7, 0.9];
        let c = [0.5, 0.9, 0.1, 0.7, 0.2, 0.3];
        assert_eq!(median(&a), median(&b));
        assert_eq!(median(&b), median(&c));
        assert!((median(&a).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_median_does_not_mutate_input() {
        let samples = vec![3.0, 1.0, 2.0];
        let _ = median(&samples);
        assert_eq!(samples, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_quartiles() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let q1 = percentile(&samples, 25.0).unwrap();
        let q3 = percentile(&samples, 75.0).unwrap();
        assert!((q1 - 25.75).abs() < 1e-9);
        assert!((q3 - 75.25).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_single_sample() {
        assert_eq!(percentile(&[42.0], 99.0), Some(42.0));
        assert_eq!(percentile(&[], 50.0), None);
    }
}
