//! Empirical null distributions of similarity values
//!
//! Similarities of random node pairs are grouped into connectivity buckets.
//! The bucket of a pair is `floor(log2(min(degree_a, degree_b)))`, so that
//! an observed similarity is always compared against random pairs with a
//! comparable number of connections.
use core::fmt::Debug;
use std::collections::HashMap;

use tracing::debug;

use crate::{f64_from_usize, GeneWalkError, GeneWalkResult};

/// Sorted null similarity samples, stratified by connectivity bucket
///
/// # Examples
///
/// ```
/// use genewalk::NullDistribution;
///
/// let mut null = NullDistribution::default();
/// null.insert(1, vec![0.4, 0.1, 0.3, 0.2]).unwrap();
///
/// let bucket = NullDistribution::bucket_key(3, 5).unwrap();
/// assert_eq!(bucket, 1);
///
/// // 2 of the 4 null values are lower than 0.3
/// assert_eq!(null.p_value(bucket, 0.3).unwrap(), 0.5);
/// ```
#[derive(Default, Clone)]
pub struct NullDistribution {
    buckets: HashMap<u32, Vec<f64>>,
}

impl Debug for NullDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NullDistribution with {} buckets", self.buckets.len())
    }
}

impl NullDistribution {
    /// Returns the connectivity bucket of a node pair
    ///
    /// The bucket is `floor(log2(min(degree_a, degree_b)))`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::ZeroDegree`] if either degree is 0
    ///
    /// # Examples
    ///
    /// ```
    /// use genewalk::NullDistribution;
    ///
    /// assert_eq!(NullDistribution::bucket_key(4, 8).unwrap(), 2);
    /// assert_eq!(NullDistribution::bucket_key(4, 2).unwrap(), 1);
    /// assert_eq!(NullDistribution::bucket_key(1, 100).unwrap(), 0);
    /// assert!(NullDistribution::bucket_key(0, 100).is_err());
    /// ```
    pub fn bucket_key(degree_a: usize, degree_b: usize) -> GeneWalkResult<u32> {
        let degree = degree_a.min(degree_b);
        if degree == 0 {
            return Err(GeneWalkError::ZeroDegree);
        }
        Ok(degree.ilog2())
    }

    /// Builds the null distribution from raw null-model observations
    ///
    /// Each observation is a pair of node degrees and the similarity of
    /// the two (randomly paired) nodes.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::ZeroDegree`] if an observation has a degree of 0
    /// - [`GeneWalkError::InvalidInput`] if a similarity is `NaN`
    pub fn from_observations<I: IntoIterator<Item = (usize, usize, f64)>>(
        observations: I,
    ) -> GeneWalkResult<Self> {
        let mut buckets: HashMap<u32, Vec<f64>> = HashMap::new();
        for (degree_a, degree_b, similarity) in observations {
            let bucket = Self::bucket_key(degree_a, degree_b)?;
            buckets.entry(bucket).or_default().push(similarity);
        }
        let mut null = Self::default();
        for (bucket, values) in buckets {
            null.insert(bucket, values)?;
        }
        Ok(null)
    }

    /// Adds null similarity values to a bucket
    ///
    /// The values do not need to be sorted. If the bucket already
    /// has a sample, the values are merged into it.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::InvalidInput`] if any value is `NaN`
    pub fn insert(&mut self, bucket: u32, mut values: Vec<f64>) -> GeneWalkResult<()> {
        if values.iter().any(|v| v.is_nan()) {
            return Err(GeneWalkError::InvalidInput(format!(
                "null distribution bucket {bucket} contains NaN"
            )));
        }
        let sample = self.buckets.entry(bucket).or_default();
        sample.append(&mut values);
        sample.sort_by(f64::total_cmp);
        debug!("Null bucket {} has {} values", bucket, sample.len());
        Ok(())
    }

    /// The sorted sample of a bucket
    pub fn sample(&self, bucket: u32) -> Option<&[f64]> {
        self.buckets.get(&bucket).map(Vec::as_slice)
    }

    /// All bucket keys, in ascending order
    pub fn buckets(&self) -> Vec<u32> {
        let mut keys: Vec<u32> = self.buckets.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if there are no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The one-sided empirical p-value of an observed similarity
    ///
    /// `p = 1 - rank / n`, where `rank` is the number of null values in
    /// the bucket that are strictly lower than `similarity` and `n` is
    /// the size of the sample.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::MissingBucket`] if the bucket has no sample
    /// - [`GeneWalkError::InvalidInput`] if `similarity` is `NaN`
    pub fn p_value(&self, bucket: u32, similarity: f64) -> GeneWalkResult<f64> {
        if similarity.is_nan() {
            return Err(GeneWalkError::InvalidInput(
                "similarity must not be NaN".to_string(),
            ));
        }
        let sample = self
            .buckets
            .get(&bucket)
            .filter(|sample| !sample.is_empty())
            .ok_or(GeneWalkError::MissingBucket(bucket))?;

        let rank = sample.partition_point(|value| *value < similarity);
        Ok(1.0 - f64_from_usize(rank) / f64_from_usize(sample.len()))
    }
}
