//! Scale- and translation-invariant pose representation.
//!
//! A pose is mapped onto a fixed 100x100 canvas: the smallest square
//! centered on the pose center that contains every point is stretched to
//! fill the canvas, so the center always lands on `(50, 50)`.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use pose_compare::{normalize, Keypoint, Pose, PoseConfiguration, PoseView, PointConfiguration};
//!
//! let config = Arc::new(
//!     PoseConfiguration::new("pair").with_points([1, 2].map(PointConfiguration::new)),
//! );
//! let detection = HashMap::from([
//!     (1, Keypoint::new(100.0, 200.0, 0.9)),
//!     (2, Keypoint::new(300.0, 200.0, 0.9)),
//! ]);
//! let pose = Pose::assemble(config, &detection, 640, 480);
//! let normalized = normalize(&pose)?;
//! assert_eq!(normalized.point(1)?.position.x, 0.0);
//! assert_eq!(normalized.point(2)?.position.x, 100.0);
//! # Ok::<(), pose_compare::PoseError>(())
//! ```

use std::sync::Arc;

use crate::configuration::PoseConfiguration;
use crate::error::{PoseError, Result};
use crate::math::geometry::{BoundingBox, PointF};
use crate::pose::{compute_angles, compute_center, Angle, Point, Pose, PoseView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side length of the canonical canvas.
pub const CANVAS_SIZE: f64 = 100.0;

/// Center of the canonical canvas.
pub const CANVAS_CENTER: PointF = PointF::new(CANVAS_SIZE / 2.0, CANVAS_SIZE / 2.0);

/// A pose expressed on the 100x100 canonical canvas.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "NormalizedPoseRecord"))]
pub struct NormalizedPose {
    configuration: Arc<PoseConfiguration>,
    points: Vec<Point>,
    angles: Vec<Angle>,
    center_point: PointF,
}

impl NormalizedPose {
    fn from_canvas_points(configuration: Arc<PoseConfiguration>, points: Vec<Point>) -> Self {
        let angles = compute_angles(&configuration.angles, &points);
        let center_point = compute_center(&configuration, &points);
        Self {
            configuration,
            points,
            angles,
            center_point,
        }
    }

    /// Logical canvas width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        CANVAS_SIZE
    }

    /// Logical canvas height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        CANVAS_SIZE
    }
}

impl PoseView for NormalizedPose {
    fn configuration(&self) -> &Arc<PoseConfiguration> {
        &self.configuration
    }

    fn points(&self) -> &[Point] {
        &self.points
    }

    fn angles(&self) -> &[Angle] {
        &self.angles
    }

    fn center_point(&self) -> PointF {
        self.center_point
    }
}

/// Map a pixel-space pose onto the canonical canvas.
///
/// Angles are recomputed from the normalized coordinates.
///
/// # Errors
///
/// Returns [`PoseError::DegenerateBoundingBox`] if the pose has no points or
/// all of them coincide with the center.
pub fn normalize(pose: &Pose) -> Result<NormalizedPose> {
    let center = pose.center_point();
    let bounds = BoundingBox::enclosing(pose.points().iter().map(|p| &p.position))
        .ok_or(PoseError::DegenerateBoundingBox)?
        .including(&center);

    let half_width = (center.x - bounds.min_x).max(bounds.max_x - center.x);
    let half_height = (center.y - bounds.min_y).max(bounds.max_y - center.y);
    let half_side = half_width.max(half_height);
    if half_side <= 0.0 || !half_side.is_finite() {
        return Err(PoseError::DegenerateBoundingBox);
    }

    // shift into the positive quadrant, then scale the square onto the canvas
    let shift = |p: &PointF| PointF::new(p.x + half_side, p.y + half_side);
    let moved_center = shift(&center);
    let top_left = PointF::new(moved_center.x - half_side, moved_center.y - half_side);
    let side = 2.0 * half_side;
    let to_canvas = |p: &PointF| {
        let moved = shift(p);
        PointF::new(
            ((moved.x - top_left.x) / side * CANVAS_SIZE).max(0.0),
            ((moved.y - top_left.y) / side * CANVAS_SIZE).max(0.0),
        )
    };

    let points: Vec<Point> = pose
        .points()
        .iter()
        .map(|p| Point::new(p.configuration, to_canvas(&p.position), p.in_frame_likelihood))
        .collect();
    let normalized = NormalizedPose::from_canvas_points(Arc::clone(pose.configuration()), points);

    tracing::trace!(
        "Normalized pose '{}': half_side={:.3}, {} points, {} angles",
        normalized.configuration.tag,
        half_side,
        normalized.points.len(),
        normalized.angles.len()
    );

    Ok(normalized)
}

/// Stored form of a [`NormalizedPose`]; angles and center are recomputed.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct NormalizedPoseRecord {
    configuration: Arc<PoseConfiguration>,
    points: Vec<Point>,
}

#[cfg(feature = "serde")]
impl TryFrom<NormalizedPoseRecord> for NormalizedPose {
    type Error = PoseError;

    fn try_from(record: NormalizedPoseRecord) -> Result<Self> {
        record.configuration.validate()?;
        crate::pose::check_points(&record.configuration, &record.points)?;
        Ok(Self::from_canvas_points(record.configuration, record.points))
    }
}
