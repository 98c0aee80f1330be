//! Distances between motion curves.
//!
//! Two strategies are provided over [`ComparableLine`]s:
//!
//! - **Grid comparison** ([`grid_score`]): both curves are resampled to the
//!   shorter length and bucketed on a shared [`ComparisonGrid`]; the score is
//!   the summed bucket difference per sample of the longer curve. Requires
//!   curves that are already time-aligned.
//! - **DTW** ([`dtw_distance`]): elastic alignment that tolerates differences
//!   in tempo between a sample and a template performance.
//!
//! [`compare_videos`] applies the configured strategy to every tracked angle
//! and summarizes the result.

use nalgebra::DMatrix;

use crate::config::{ComparisonConfig, ComparisonStrategy, GridRange};
use crate::error::{PoseError, Result};
use crate::math::grid::ComparisonGrid;
use crate::math::resample::resample;
use crate::math::stats::SummaryStatistics;
use crate::video::NormalizedPoseVideo;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A flat sequence of scalar samples, e.g. one angle over time.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparableLine(Vec<f64>);

impl ComparableLine {
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Block-average to exactly `target_length` samples.
    ///
    /// # Errors
    ///
    /// See [`resample`].
    pub fn resample(&self, target_length: usize) -> Result<Self> {
        resample(&self.0, target_length).map(Self)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ComparableLine {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for ComparableLine {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Grid comparison score between a sample and a reference curve.
///
/// Both curves are resampled to the shorter length and quantized on a grid
/// of `grid_count` buckets whose range is chosen by `range`. The absolute
/// bucket differences are summed and divided by the length of the longer
/// input, so `0` means every aligned sample shares a bucket.
///
/// # Errors
///
/// Returns [`PoseError::EmptySequence`] if either curve is empty, an invalid
/// input error if a value is not finite, or an invalid configuration error if
/// `grid_count` is zero.
///
/// # Example
///
/// ```
/// use pose_compare::{grid_score, ComparableLine, GridRange};
///
/// let swinging: ComparableLine = (0..20).map(|i| if i % 2 == 0 { 0.0 } else { 10.0 }).collect();
/// let steady = ComparableLine::new(vec![5.0; 10]);
/// assert_eq!(grid_score(&swinging, &steady, 10, GridRange::Union)?, 0.0);
/// # Ok::<(), pose_compare::PoseError>(())
/// ```
pub fn grid_score(
    sample: &ComparableLine,
    reference: &ComparableLine,
    grid_count: usize,
    range: GridRange,
) -> Result<f64> {
    check_curves(sample.values(), reference.values(), "grid comparison")?;
    let length = sample.len().min(reference.len());
    let a = sample.resample(length)?;
    let b = reference.resample(length)?;

    let grid = match range {
        GridRange::Union => ComparisonGrid::spanning(a.values(), b.values(), grid_count)?,
        GridRange::Reference => ComparisonGrid::spanning(b.values(), &[], grid_count)?,
    };

    let total: usize = a
        .values()
        .iter()
        .zip(b.values())
        .map(|(&x, &y)| grid.clamped_index(x).abs_diff(grid.clamped_index(y)))
        .sum();

    Ok(total as f64 / sample.len().max(reference.len()) as f64)
}

/// Cumulative DTW cost matrix of size `(n + 1) x (m + 1)`.
fn cost_matrix(a: &[f64], b: &[f64]) -> DMatrix<f64> {
    let (n, m) = (a.len(), b.len());
    let mut cost = DMatrix::from_element(n + 1, m + 1, f64::INFINITY);
    cost[(0, 0)] = 0.0;

    for i in 1..=n {
        for j in 1..=m {
            let best = cost[(i - 1, j)]
                .min(cost[(i, j - 1)])
                .min(cost[(i - 1, j - 1)]);
            cost[(i, j)] = (a[i - 1] - b[j - 1]).abs() + best;
        }
    }
    cost
}

fn check_curves(a: &[f64], b: &[f64], context: &str) -> Result<()> {
    if a.is_empty() || b.is_empty() {
        return Err(PoseError::empty_sequence(format!("{context} of an empty curve")));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(PoseError::invalid_input(format!(
            "{context} of a curve with non-finite values"
        )));
    }
    Ok(())
}

/// Dynamic time warping distance with absolute-difference local cost.
///
/// # Errors
///
/// Returns [`PoseError::EmptySequence`] if either sequence is empty.
///
/// # Example
///
/// ```
/// use pose_compare::dtw_distance;
///
/// // same shape, second one held twice as long at the start
/// let d = dtw_distance(&[0.0, 1.0, 2.0], &[0.0, 0.0, 1.0, 2.0])?;
/// assert_eq!(d, 0.0);
/// # Ok::<(), pose_compare::PoseError>(())
/// ```
pub fn dtw_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_curves(a, b, "DTW")?;
    Ok(cost_matrix(a, b)[(a.len(), b.len())])
}

/// DTW distance together with an optimal warping path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DtwAlignment {
    pub distance: f64,
    /// Matched `(index_in_a, index_in_b)` pairs from `(0, 0)` to the last
    /// samples of both sequences.
    pub path: Vec<(usize, usize)>,
}

/// Compute DTW and backtrack the warping path.
///
/// Ties prefer the diagonal step, then advancing in `a`.
///
/// # Errors
///
/// Returns [`PoseError::EmptySequence`] if either sequence is empty.
pub fn dtw_align(a: &[f64], b: &[f64]) -> Result<DtwAlignment> {
    check_curves(a, b, "DTW")?;
    let cost = cost_matrix(a, b);
    let (mut i, mut j) = (a.len(), b.len());
    let mut path = vec![(i - 1, j - 1)];

    while i > 1 || j > 1 {
        if i == 1 {
            j -= 1;
        } else if j == 1 {
            i -= 1;
        } else {
            let diagonal = cost[(i - 1, j - 1)];
            let up = cost[(i - 1, j)];
            let left = cost[(i, j - 1)];
            if diagonal <= up && diagonal <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push((i - 1, j - 1));
    }
    path.reverse();

    Ok(DtwAlignment {
        distance: cost[(a.len(), b.len())],
        path,
    })
}

/// Compare two curves with the configured strategy.
///
/// # Errors
///
/// Returns [`PoseError::SampleSizeExceedsInput`] if a fixed sample length is
/// longer than either curve, or [`PoseError::EmptySequence`] for empty curves.
pub fn compare_lines(
    sample: &ComparableLine,
    reference: &ComparableLine,
    config: &ComparisonConfig,
) -> Result<f64> {
    match config.strategy {
        ComparisonStrategy::Grid => {
            grid_score(sample, reference, config.grid_count, config.grid_range)
        }
        ComparisonStrategy::Dtw => {
            check_curves(sample.values(), reference.values(), "DTW")?;
            let length = config
                .sample_length
                .unwrap_or_else(|| sample.len().min(reference.len()));
            let a = sample.resample(length)?;
            let b = reference.resample(length)?;
            dtw_distance(a.values(), b.values())
        }
    }
}

/// Distance for one tracked angle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AngleDistance {
    pub tag: String,
    pub distance: f64,
}

/// Per-angle distances between a sample and a template recording.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonReport {
    pub strategy: ComparisonStrategy,
    /// One entry per tracked angle, in the template's configuration order.
    pub distances: Vec<AngleDistance>,
    pub summary: SummaryStatistics,
}

impl ComparisonReport {
    /// # Errors
    ///
    /// Returns [`PoseError::AngleNotFound`] if `tag` was not compared.
    pub fn distance(&self, tag: &str) -> Result<f64> {
        self.distances
            .iter()
            .find(|d| d.tag == tag)
            .map(|d| d.distance)
            .ok_or_else(|| PoseError::angle_not_found(tag))
    }
}

/// Compare every angle tracked by `template` against the same angle in
/// `sample`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the template tracks no
/// angles, `sample` lacks one of them, or a curve cannot be compared.
pub fn compare_videos(
    sample: &NormalizedPoseVideo,
    template: &NormalizedPoseVideo,
    config: &ComparisonConfig,
) -> Result<ComparisonReport> {
    config.validate()?;
    if let Some(configuration) = template.configuration() {
        configuration.validate()?;
    }
    let tags = template.tracked_angle_tags();

    let distances = tags
        .into_iter()
        .map(|tag| {
            let a = sample.angle_curve(&tag)?;
            let b = template.angle_curve(&tag)?;
            let distance = compare_lines(&a, &b, config)?;
            tracing::debug!(
                "Angle '{}': {:?} distance {:.4} ({} vs {} samples)",
                tag,
                config.strategy,
                distance,
                a.len(),
                b.len()
            );
            Ok(AngleDistance { tag, distance })
        })
        .collect::<Result<Vec<_>>>()?;

    let values: Vec<f64> = distances.iter().map(|d| d.distance).collect();
    let summary = SummaryStatistics::from_values(&values)?;
    tracing::debug!(
        "Compared {} against {}: avg={:.4} min={:.4} max={:.4}",
        sample.source_uri(),
        template.source_uri(),
        summary.average,
        summary.min,
        summary.max
    );

    Ok(ComparisonReport {
        strategy: config.strategy,
        distances,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn alternating(n: usize) -> ComparableLine {
        (0..n).map(|i| if i % 2 == 0 { 0.0 } else { 10.0 }).collect()
    }

    #[test]
    fn test_grid_constant_curves() {
        let a = ComparableLine::new(vec![5.0; 20]);
        let b = ComparableLine::new(vec![5.0; 10]);
        assert_eq!(grid_score(&a, &b, 10, GridRange::Union).unwrap(), 0.0);
    }

    #[test]
    fn test_grid_alternating_even_blocks() {
        let b = ComparableLine::new(vec![5.0; 10]);
        assert_eq!(grid_score(&alternating(20), &b, 10, GridRange::Union).unwrap(), 0.0);
    }

    #[test]
    fn test_grid_alternating_uneven_blocks() {
        let b = ComparableLine::new(vec![5.0; 10]);
        assert_relative_eq!(
            grid_score(&alternating(16), &b, 10, GridRange::Union).unwrap(),
            1.125,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_grid_reference_range() {
        let sample = ComparableLine::new(vec![0.0, 50.0, 100.0]);
        let reference = ComparableLine::new(vec![40.0, 50.0, 60.0]);
        // reference grid [40, 60]: the sample clamps onto the same buckets
        let score = grid_score(&sample, &reference, 4, GridRange::Reference).unwrap();
        assert_relative_eq!(score, 0.0, epsilon = 1e-12);
        // union grid [0, 100]: buckets 1,3,4 against 2,3,3
        let union = grid_score(&sample, &reference, 4, GridRange::Union).unwrap();
        assert_relative_eq!(union, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_empty() {
        let a = ComparableLine::default();
        let b = ComparableLine::new(vec![1.0]);
        assert!(matches!(
            grid_score(&a, &b, 10, GridRange::Union),
            Err(PoseError::EmptySequence { .. })
        ));
    }

    #[test]
    fn test_dtw_identity_and_symmetry() {
        let a = [10.0, 40.0, 90.0, 120.0, 90.0, 40.0];
        let b = [12.0, 35.0, 95.0, 110.0, 70.0];
        assert_eq!(dtw_distance(&a, &a).unwrap(), 0.0);
        assert_relative_eq!(
            dtw_distance(&a, &b).unwrap(),
            dtw_distance(&b, &a).unwrap(),
            epsilon = 1e-12
        );
        assert!(dtw_distance(&a, &b).unwrap() > 0.0);
    }

    #[test]
    fn test_dtw_known_value() {
        // |1-2| + |2-2| + |3-4|
        assert_relative_eq!(dtw_distance(&[1.0, 2.0, 3.0], &[2.0, 2.0, 4.0]).unwrap(), 2.0);
        assert_relative_eq!(dtw_distance(&[1.0], &[4.0, 6.0]).unwrap(), 8.0);
    }

    #[test]
    fn test_dtw_tempo_tolerance() {
        let fast = [0.0, 45.0, 90.0, 45.0, 0.0];
        let slow = [0.0, 0.0, 45.0, 45.0, 90.0, 90.0, 45.0, 45.0, 0.0, 0.0];
        assert_eq!(dtw_distance(&fast, &slow).unwrap(), 0.0);
    }

    #[test]
    fn test_dtw_empty() {
        assert!(dtw_distance(&[], &[1.0]).is_err());
        assert!(dtw_align(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_dtw_path() {
        let alignment = dtw_align(&[0.0, 1.0, 2.0], &[0.0, 0.0, 1.0, 2.0]).unwrap();
        assert_eq!(alignment.distance, 0.0);
        assert_eq!(alignment.path, vec![(0, 0), (0, 1), (1, 2), (2, 3)]);

        let single = dtw_align(&[3.0], &[1.0]).unwrap();
        assert_eq!(single.path, vec![(0, 0)]);
        assert_eq!(single.distance, 2.0);
    }

    #[test]
    fn test_compare_lines_strategies() {
        let a = ComparableLine::new(vec![0.0, 10.0, 20.0, 30.0]);
        let b = ComparableLine::new(vec![0.0, 0.0, 10.0, 10.0, 20.0, 20.0, 30.0, 30.0]);

        let dtw = compare_lines(&a, &b, &ComparisonConfig::default()).unwrap();
        assert_eq!(dtw, 0.0);

        let fixed = ComparisonConfig::default().with_sample_length(Some(6));
        assert_eq!(
            compare_lines(&a, &b, &fixed),
            Err(PoseError::SampleSizeExceedsInput {
                requested: 6,
                available: 4
            })
        );

        let grid = ComparisonConfig::default().with_strategy(ComparisonStrategy::Grid);
        assert_eq!(compare_lines(&a, &b, &grid).unwrap(), 0.0);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let broken = ComparableLine::new(vec![0.0, f64::NAN, 20.0]);
        let full = ComparableLine::new(vec![0.0, 10.0, 20.0]);
        let grid = ComparisonConfig::default().with_strategy(ComparisonStrategy::Grid);

        for config in [ComparisonConfig::default(), grid] {
            assert!(matches!(
                compare_lines(&broken, &full, &config),
                Err(PoseError::InvalidInput(_))
            ));
        }
        assert!(dtw_align(full.values(), &[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_compare_lines_empty_curve() {
        let empty = ComparableLine::new(Vec::new());
        let full = ComparableLine::new(vec![0.0, 10.0, 20.0]);
        let fixed = ComparisonConfig::default().with_sample_length(Some(2));
        let grid = ComparisonConfig::default().with_strategy(ComparisonStrategy::Grid);

        for config in [ComparisonConfig::default(), fixed, grid] {
            assert!(matches!(
                compare_lines(&empty, &full, &config),
                Err(PoseError::EmptySequence { .. })
            ));
            assert!(matches!(
                compare_lines(&full, &empty, &config),
                Err(PoseError::EmptySequence { .. })
            ));
        }
    }
}
