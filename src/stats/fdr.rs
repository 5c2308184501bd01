//! False discovery rate control
//!
//! GeneWalk corrects the p-values of every gene separately, using only the
//! GO terms that are connected to that gene. Genes differ a lot in their
//! number of GO annotations and a single correction across all genes would
//! be dominated by the highly annotated ones.

use crate::f64_from_usize;

/// Adjusts p-values with the Benjamini - Hochberg step-up procedure
///
/// Returns the q-values in the same order as the input p-values.
///
/// The p-values are ranked in ascending order (`i = 1..m`) and adjusted
/// to `p_i * m / i`. Starting from the largest rank, each q-value is
/// capped by the q-value of the next larger rank, so that q-values never
/// decrease with increasing p-values. All q-values are clipped to `[0, 1]`.
///
/// # Examples
///
/// ```
/// use genewalk::stats::benjamini_hochberg;
///
/// let qvalues = benjamini_hochberg(&[0.5, 0.02]);
/// assert!((qvalues[0] - 0.5).abs() < 1e-12);
/// assert!((qvalues[1] - 0.04).abs() < 1e-12);
/// ```
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let m = f64_from_usize(pvalues.len());
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|a, b| pvalues[*a].total_cmp(&pvalues[*b]));

    let mut qvalues = vec![0.0; pvalues.len()];
    let mut running_min = 1.0f64;
    for (rank, idx) in order.iter().enumerate().rev() {
        let adjusted = pvalues[*idx] * m / f64_from_usize(rank + 1);
        running_min = running_min.min(adjusted);
        qvalues[*idx] = running_min.max(0.0);
    }
    qvalues
}
