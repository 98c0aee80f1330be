//! Planar geometry on keypoint positions.
//!
//! Angles are *directed*: [`angle_degrees`] measures the sweep from the first
//! ray to the last ray around the vertex, so swapping the endpoints yields
//! `360 - angle`. Use [`interior_angle`] only where the unsigned magnitude is
//! wanted.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D position in image (y pointing down) or canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    #[inline]
    #[must_use]
    pub fn offset_from(&self, origin: &Self) -> Vector2<f64> {
        Vector2::new(self.x - origin.x, self.y - origin.y)
    }

    /// Both coordinates finite and non-negative.
    #[must_use]
    pub fn is_valid_position(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Bounds of `points`, or `None` when the iterator is empty.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a PointF>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    min_x: p.x,
                    min_y: p.y,
                    max_x: p.x,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Grow the bounds to contain `point`.
    #[must_use]
    pub fn including(self, point: &PointF) -> Self {
        Self {
            min_x: self.min_x.min(point.x),
            min_y: self.min_y.min(point.y),
            max_x: self.max_x.max(point.x),
            max_y: self.max_y.max(point.y),
        }
    }

    #[must_use]
    pub fn midpoint(&self) -> PointF {
        PointF::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Directed angle at `vertex` sweeping from `first` to `last`, in `[0, 360)`.
///
/// Computed as the difference of the two rays' `atan2` headings.
///
/// # Example
///
/// ```
/// use pose_compare::math::{angle_degrees, PointF};
///
/// let vertex = PointF::new(0.0, 0.0);
/// let a = angle_degrees(&PointF::new(1.0, 0.0), &vertex, &PointF::new(0.0, 1.0));
/// assert!((a - 90.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn angle_degrees(first: &PointF, vertex: &PointF, last: &PointF) -> f64 {
    let from = first.offset_from(vertex);
    let to = last.offset_from(vertex);
    let mut degrees = (to.y.atan2(to.x) - from.y.atan2(from.x)).to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    // -ε + 360 rounds up to exactly 360.0
    if degrees >= 360.0 {
        degrees -= 360.0;
    }
    degrees
}

/// Euclidean distance between two points.
#[inline]
#[must_use]
pub fn distance(p: &PointF, q: &PointF) -> f64 {
    p.offset_from(q).norm()
}

/// Heading of the ray `reference -> from`, clockwise from straight up.
///
/// Image coordinates grow downwards, so "up" is `-y`: a ray pointing up is
/// `0`, right is `90`, down is `180` and left is `270`.
#[must_use]
pub fn clockwise_angle(from: &PointF, reference: &PointF) -> f64 {
    let above = PointF::new(reference.x, reference.y - 1.0);
    angle_degrees(&above, reference, from)
}

/// Fold a directed angle into its unsigned magnitude in `[0, 180]`.
///
/// Range thresholds written for directed angles do not carry over to
/// folded values.
#[inline]
#[must_use]
pub fn interior_angle(directed_degrees: f64) -> f64 {
    if directed_degrees > 180.0 {
        360.0 - directed_degrees
    } else {
        directed_degrees
    }
}
