//! Fixed-length block averaging.
//!
//! Curves recorded at different durations or frame rates are brought to a
//! common length before comparison. Every input sample lands in exactly one
//! output bucket and the last bucket absorbs the tail.

use crate::error::{PoseError, Result};

/// Block-average `values` down to exactly `target_length` samples.
///
/// With `step = n / target_length`, samples are accumulated until the count
/// consumed reaches the next multiple of `step`, at which point the bucket
/// mean is emitted. The final bucket takes whatever remains.
///
/// # Errors
///
/// Returns [`PoseError::SampleSizeExceedsInput`] if `target_length` is
/// larger than the input, or an invalid input error if it is zero.
///
/// # Example
///
/// ```
/// use pose_compare::math::resample;
///
/// let out = resample(&[1.0, 3.0, 5.0, 7.0], 2)?;
/// assert_eq!(out, vec![2.0, 6.0]);
/// # Ok::<(), pose_compare::PoseError>(())
/// ```
pub fn resample(values: &[f64], target_length: usize) -> Result<Vec<f64>> {
    let n = values.len();
    if target_length > n {
        return Err(PoseError::sample_size_exceeds_input(target_length, n));
    }
    if target_length == 0 {
        return Err(PoseError::invalid_input("target length must be at least 1"));
    }

    let step = n as f64 / target_length as f64;
    let mut out = Vec::with_capacity(target_length);
    let mut sum = 0.0;
    let mut count = 0usize;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        count += 1;

        let boundary = (out.len() + 1) as f64 * step;
        if out.len() + 1 < target_length && (i + 1) as f64 >= boundary {
            out.push(sum / count as f64);
            sum = 0.0;
            count = 0;
        }
    }

    // step >= 1 leaves at least one sample for the tail bucket
    out.push(sum / count as f64);
    Ok(out)
}
