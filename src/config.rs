//! Configuration for comparing recorded motions.
//!
//! This module provides the [`ComparisonConfig`] struct which centralizes the
//! tunable parameters of the comparison pipeline, along with sport presets.
//!
//! # Example
//!
//! ```
//! use pose_compare::{ComparisonConfig, ComparisonStrategy};
//!
//! let config = ComparisonConfig::default();
//! assert_eq!(config.strategy, ComparisonStrategy::Dtw);
//!
//! let cycling = ComparisonConfig::cycling().with_grid_count(20);
//! assert!(cycling.validate().is_ok());
//! ```

use crate::error::{PoseError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How two angle curves are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComparisonStrategy {
    /// Dynamic time warping over resampled curves; tolerates tempo changes.
    #[default]
    Dtw,
    /// Mean bucket difference over time-aligned curves.
    Grid,
}

/// Which values define the range of the comparison grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GridRange {
    /// Span the values of both curves.
    #[default]
    Union,
    /// Span only the reference curve; sample values outside it are clamped.
    Reference,
}

/// Configuration for motion comparison.
///
/// # Parameters
///
/// - `strategy`: DTW (default) or grid comparison.
/// - `sample_length`: fixed length both curves are resampled to. `None`
///   uses the length of the shorter curve.
/// - `grid_count`: number of buckets for grid comparison.
/// - `grid_range`: union of both curves (default) or reference only.
/// - `min_likelihood`: poses with a lower average keypoint likelihood are
///   treated as undetected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonConfig {
    pub strategy: ComparisonStrategy,
    pub sample_length: Option<usize>,
    pub grid_count: usize,
    pub grid_range: GridRange,
    pub min_likelihood: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            strategy: ComparisonStrategy::Dtw,
            sample_length: None,
            grid_count: 10,
            grid_range: GridRange::Union,
            min_likelihood: 0.0,
        }
    }
}

impl ComparisonConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.grid_count < 1 {
            return Err(PoseError::invalid_config("grid_count must be at least 1"));
        }
        if self.sample_length == Some(0) {
            return Err(PoseError::invalid_config(
                "sample_length must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_likelihood) {
            return Err(PoseError::invalid_config(
                "min_likelihood must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Preset for pedalling cycles: short repetitive curves, confident
    /// side-view detections.
    #[must_use]
    pub fn cycling() -> Self {
        Self {
            sample_length: Some(30),
            min_likelihood: 0.5,
            ..Self::default()
        }
    }

    /// Preset for tennis strokes: longer single motions, occluded limbs are
    /// common so the likelihood bar is lower.
    #[must_use]
    pub fn tennis() -> Self {
        Self {
            sample_length: Some(60),
            min_likelihood: 0.3,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: ComparisonStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_sample_length(mut self, sample_length: Option<usize>) -> Self {
        self.sample_length = sample_length;
        self
    }

    #[must_use]
    pub const fn with_grid_count(mut self, grid_count: usize) -> Self {
        self.grid_count = grid_count;
        self
    }

    #[must_use]
    pub const fn with_grid_range(mut self, grid_range: GridRange) -> Self {
        self.grid_range = grid_range;
        self
    }

    #[must_use]
    pub const fn with_min_likelihood(mut self, min_likelihood: f64) -> Self {
        self.min_likelihood = min_likelihood;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComparisonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_count, 10);
        assert_eq!(config.sample_length, None);
        assert_eq!(config.grid_range, GridRange::Union);
    }

    #[test]
    fn test_presets() {
        let cycling = ComparisonConfig::cycling();
        assert!(cycling.validate().is_ok());
        assert_eq!(cycling.sample_length, Some(30));

        let tennis = ComparisonConfig::tennis();
        assert!(tennis.validate().is_ok());
        assert_eq!(tennis.min_likelihood, 0.3);
    }

    #[test]
    fn test_validation() {
        let mut config = ComparisonConfig::default();

        config.grid_count = 0;
        assert!(config.validate().is_err());

        config.grid_count = 10;
        config.sample_length = Some(0);
        assert!(config.validate().is_err());

        config.sample_length = None;
        config.min_likelihood = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ComparisonConfig::new()
            .with_strategy(ComparisonStrategy::Grid)
            .with_grid_count(16)
            .with_grid_range(GridRange::Reference)
            .with_sample_length(Some(12));
        assert_eq!(config.strategy, ComparisonStrategy::Grid);
        assert_eq!(config.grid_count, 16);
        assert_eq!(config.grid_range, GridRange::Reference);
        assert_eq!(config.sample_length, Some(12));
    }
}
