//! Summary statistics over comparison distances.

use crate::error::{PoseError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Average, minimum and maximum of a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummaryStatistics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStatistics {
    /// Summarize `values`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::EmptySequence`] when `values` is empty.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        Ok(Self {
            average: average(values)?,
            min: min(values)?,
            max: max(values)?,
        })
    }
}

/// Arithmetic mean.
///
/// # Errors
///
/// Returns [`PoseError::EmptySequence`] when `values` is empty.
pub fn average(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(PoseError::empty_sequence("average of no values"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Smallest value.
///
/// # Errors
///
/// Returns [`PoseError::EmptySequence`] when `values` is empty.
pub fn min(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or_else(|| PoseError::empty_sequence("min of no values"))
}

/// Largest value.
///
/// # Errors
///
/// Returns [`PoseError::EmptySequence`] when `values` is empty.
pub fn max(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or_else(|| PoseError::empty_sequence("max of no values"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary() {
        let s = SummaryStatistics::from_values(&[4.0, 1.0, 7.0]).unwrap();
        assert_relative_eq!(s.average, 4.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 7.0);
    }

    #[test]
    fn test_empty() {
        assert!(matches!(average(&[]), Err(PoseError::EmptySequence { .. })));
        assert!(matches!(min(&[]), Err(PoseError::EmptySequence { .. })));
        assert!(matches!(max(&[]), Err(PoseError::EmptySequence { .. })));
        assert!(SummaryStatistics::from_values(&[]).is_err());
    }
}
