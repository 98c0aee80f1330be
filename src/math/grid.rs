//! Ordinal bucketing of a continuous value range.

use crate::error::{PoseError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Partition of `[min_value, max_value]` into `grid_count` equal buckets,
/// numbered `1..=grid_count`.
///
/// # Example
///
/// ```
/// use pose_compare::math::ComparisonGrid;
///
/// let grid = ComparisonGrid::new(0.0, 10.0, 10)?;
/// assert_eq!(grid.index(0.0), Some(1));
/// assert_eq!(grid.index(10.0), Some(10));
/// assert_eq!(grid.index(10.5), None);
/// # Ok::<(), pose_compare::PoseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonGrid {
    min_value: f64,
    max_value: f64,
    grid_count: usize,
    step: f64,
}

impl ComparisonGrid {
    /// Create a grid over `[min_value, max_value]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `grid_count` is zero, a bound is not finite, or
    /// `max_value < min_value`.
    pub fn new(min_value: f64, max_value: f64, grid_count: usize) -> Result<Self> {
        if grid_count == 0 {
            return Err(PoseError::invalid_config("grid_count must be at least 1"));
        }
        if !min_value.is_finite() || !max_value.is_finite() {
            return Err(PoseError::invalid_input("grid bounds must be finite"));
        }
        if max_value < min_value {
            return Err(PoseError::invalid_input(format!(
                "grid max {max_value} is below min {min_value}"
            )));
        }
        Ok(Self {
            min_value,
            max_value,
            grid_count,
            step: (max_value - min_value) / grid_count as f64,
        })
    }

    /// Grid spanning the combined range of both series.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::EmptySequence`] when both series are empty.
    pub fn spanning(a: &[f64], b: &[f64], grid_count: usize) -> Result<Self> {
        let (min, max) = a
            .iter()
            .chain(b)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return Err(PoseError::empty_sequence("grid range of two empty series"));
        }
        Self::new(min, max, grid_count)
    }

    #[must_use]
    pub const fn min_value(&self) -> f64 {
        self.min_value
    }

    #[must_use]
    pub const fn max_value(&self) -> f64 {
        self.max_value
    }

    #[must_use]
    pub const fn grid_count(&self) -> usize {
        self.grid_count
    }

    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Bucket of `value`, `None` when it lies above `max_value`.
    ///
    /// `max_value` itself falls in the last bucket; anything below
    /// `min_value` falls in the first.
    #[must_use]
    pub fn index(&self, value: f64) -> Option<usize> {
        if value == self.max_value {
            return Some(self.grid_count);
        }
        (1..=self.grid_count).find(|&k| value < self.min_value + k as f64 * self.step)
    }

    /// Bucket of `value` after clamping it into the grid range.
    ///
    /// `value` must not be NaN.
    #[must_use]
    pub fn clamped_index(&self, value: f64) -> usize {
        debug_assert!(!value.is_nan(), "NaN has no grid bucket");
        self.index(value.clamp(self.min_value, self.max_value))
            .unwrap_or(self.grid_count)
    }
}
