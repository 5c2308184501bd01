//! Mean and standard error across replicates

use statrs::statistics::Statistics;

use crate::f64_from_usize;

/// Mean and standard error of the mean of one value across replicates
///
/// Only the replicates that actually produced a value are counted, both
/// for the standard deviation and for the `sqrt(n)` denominator. The
/// standard deviation is the population standard deviation of the values.
///
/// # Examples
///
/// ```
/// use genewalk::stats::Summary;
///
/// let summary = Summary::from_values(&[0.9, 0.88]).unwrap();
/// assert_eq!(summary.count(), 2);
/// assert!((summary.mean() - 0.89).abs() < 1e-12);
/// assert!((summary.sem() - 0.01 / 2f64.sqrt()).abs() < 1e-12);
///
/// let single = Summary::from_values(&[0.9]).unwrap();
/// assert_eq!(single.sem(), 0.0);
///
/// assert!(Summary::from_values(&[]).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    count: usize,
    mean: f64,
    sem: f64,
}

impl Summary {
    /// Summarizes the values, returns `None` if there are no values
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().mean();
        let sem = values.iter().population_std_dev() / f64_from_usize(count).sqrt();
        Some(Self { count, mean, sem })
    }

    /// The number of values
    pub fn count(&self) -> usize {
        self.count
    }

    /// The arithmetic mean
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The standard error of the mean
    pub fn sem(&self) -> f64 {
        self.sem
    }
}
