//! Resolved poses assembled from detector output.
//!
//! A [`Pose`] is an immutable value: editing a point produces a new pose via
//! [`Pose::with_point_moved`], with angles and center recomputed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::configuration::{AngleConfiguration, PointConfiguration, PointId, PoseConfiguration};
use crate::error::{PoseError, Result};
use crate::math::geometry::{angle_degrees, clockwise_angle, distance, interior_angle, BoundingBox, PointF};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One keypoint as reported by the detection collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub position: PointF,
    pub confidence: f64,
}

impl Keypoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self {
            position: PointF::new(x, y),
            confidence,
        }
    }

    fn is_valid(&self) -> bool {
        is_valid_detection(&self.position, self.confidence)
    }
}

fn is_valid_detection(position: &PointF, confidence: f64) -> bool {
    position.is_valid_position() && (0.0..=1.0).contains(&confidence)
}

/// Detector output for one image: keypoint id to detection. Undetected
/// keypoints are simply absent.
pub type Detection = HashMap<PointId, Keypoint>;

/// A configured keypoint bound to a position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub configuration: PointConfiguration,
    pub position: PointF,
    pub in_frame_likelihood: f64,
}

impl Point {
    #[must_use]
    pub const fn new(configuration: PointConfiguration, position: PointF, in_frame_likelihood: f64) -> Self {
        Self {
            configuration,
            position,
            in_frame_likelihood,
        }
    }

    #[must_use]
    pub const fn id(&self) -> PointId {
        self.configuration.id
    }
}

/// A computed angle value, in degrees within `[0, 360)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Angle {
    pub tag: String,
    pub value: f64,
    pub start: PointId,
    pub vertex: PointId,
    pub end: PointId,
}

impl Angle {
    /// Unsigned magnitude of the angle in `[0, 180]`.
    #[must_use]
    pub fn interior(&self) -> f64 {
        interior_angle(self.value)
    }
}

/// Read access shared by raw and normalized poses.
pub trait PoseView {
    fn configuration(&self) -> &Arc<PoseConfiguration>;

    fn points(&self) -> &[Point];

    fn angles(&self) -> &[Angle];

    fn center_point(&self) -> PointF;

    /// # Errors
    ///
    /// Returns [`PoseError::PointNotFound`] if the point was not resolved.
    fn point(&self, id: PointId) -> Result<&Point> {
        self.points()
            .iter()
            .find(|p| p.id() == id)
            .ok_or(PoseError::point_not_found(id))
    }

    /// # Errors
    ///
    /// Returns [`PoseError::AngleNotFound`] if the angle was not computed.
    fn angle(&self, tag: &str) -> Result<&Angle> {
        self.angles()
            .iter()
            .find(|a| a.tag == tag)
            .ok_or_else(|| PoseError::angle_not_found(tag))
    }

    /// Length of the configured line `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not configured or an endpoint is missing.
    fn line_length(&self, tag: &str) -> Result<f64> {
        let line = self.configuration().line(tag)?;
        Ok(distance(
            &self.point(line.start)?.position,
            &self.point(line.end)?.position,
        ))
    }

    /// Heading of the configured line `tag` from its start to its end point,
    /// clockwise from straight up.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not configured or an endpoint is missing.
    fn line_direction(&self, tag: &str) -> Result<f64> {
        let line = self.configuration().line(tag)?;
        Ok(clockwise_angle(
            &self.point(line.end)?.position,
            &self.point(line.start)?.position,
        ))
    }
}

/// A detected pose in image pixel space.
///
/// Deserializing goes through [`Pose::from_points`]: stored angles, center
/// and likelihood are recomputed from the points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PoseRecord"))]
pub struct Pose {
    configuration: Arc<PoseConfiguration>,
    points: Vec<Point>,
    width: u32,
    height: u32,
    angles: Vec<Angle>,
    center_point: PointF,
    average_likelihood: f64,
    missing_points: bool,
}

impl Pose {
    /// Assemble a pose from detector output.
    ///
    /// Only configured ids with a non-negative position and a confidence in
    /// `[0, 1]` become points. Anything else marks the pose as missing points;
    /// angles that depend on an absent point are omitted.
    #[must_use]
    pub fn assemble(
        configuration: Arc<PoseConfiguration>,
        detection: &Detection,
        width: u32,
        height: u32,
    ) -> Self {
        let points = configuration
            .points
            .iter()
            .filter_map(|pc| {
                detection
                    .get(&pc.id)
                    .filter(|k| k.is_valid())
                    .map(|k| Point::new(*pc, k.position, k.confidence))
            })
            .collect();
        Self::build(configuration, points, width, height)
    }

    /// Build a pose from already resolved points.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::PointNotFound`] if a point is not part of
    /// `configuration`, or an invalid input error on duplicate points, a
    /// negative or non-finite position, or a likelihood outside `[0, 1]`.
    pub fn from_points(
        configuration: Arc<PoseConfiguration>,
        points: Vec<Point>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        check_points(&configuration, &points)?;
        Ok(Self::build(configuration, points, width, height))
    }

    fn build(configuration: Arc<PoseConfiguration>, points: Vec<Point>, width: u32, height: u32) -> Self {
        let angles = compute_angles(&configuration.angles, &points);
        let center_point = compute_center(&configuration, &points);
        let average_likelihood = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.in_frame_likelihood).sum::<f64>() / points.len() as f64
        };
        let missing_points = configuration
            .point_ids()
            .any(|id| !points.iter().any(|p| p.id() == id));

        Self {
            configuration,
            points,
            width,
            height,
            angles,
            center_point,
            average_likelihood,
            missing_points,
        }
    }

    /// A copy of this pose with point `id` moved to `position`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::PointNotFound`] if the point is not resolved, or an
    /// invalid input error if `position` is negative or not finite.
    pub fn with_point_moved(&self, id: PointId, position: PointF) -> Result<Self> {
        if !position.is_valid_position() {
            return Err(PoseError::invalid_input(format!(
                "point {id} cannot move to ({}, {})",
                position.x, position.y
            )));
        }
        let mut points = self.points.clone();
        let point = points
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(PoseError::point_not_found(id))?;
        point.position = position;
        Ok(Self::build(
            Arc::clone(&self.configuration),
            points,
            self.width,
            self.height,
        ))
    }

    /// Source image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Source image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn average_likelihood(&self) -> f64 {
        self.average_likelihood
    }

    /// Whether detection failed to produce every configured point.
    #[must_use]
    pub const fn missing_points(&self) -> bool {
        self.missing_points
    }
}

impl PoseView for Pose {
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

/// Stored form of a [`Pose`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct PoseRecord {
    configuration: Arc<PoseConfiguration>,
    points: Vec<Point>,
    width: u32,
    height: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<PoseRecord> for Pose {
    type Error = PoseError;

    fn try_from(record: PoseRecord) -> Result<Self> {
        record.configuration.validate()?;
        Self::from_points(record.configuration, record.points, record.width, record.height)
    }
}

/// Every point configured, valid, and given once.
pub(crate) fn check_points(configuration: &PoseConfiguration, points: &[Point]) -> Result<()> {
    for (i, point) in points.iter().enumerate() {
        if !configuration.contains_point(point.id()) {
            return Err(PoseError::point_not_found(point.id()));
        }
        if points[..i].iter().any(|p| p.id() == point.id()) {
            return Err(PoseError::invalid_input(format!(
                "point {} given twice",
                point.id()
            )));
        }
        if !is_valid_detection(&point.position, point.in_frame_likelihood) {
            return Err(PoseError::invalid_input(format!(
                "point {} has an invalid position or likelihood",
                point.id()
            )));
        }
    }
    Ok(())
}

fn position_of(points: &[Point], id: PointId) -> Option<PointF> {
    points.iter().find(|p| p.id() == id).map(|p| p.position)
}

/// Angles whose three points are all present, in configuration order.
pub(crate) fn compute_angles(configs: &[AngleConfiguration], points: &[Point]) -> Vec<Angle> {
    configs
        .iter()
        .filter_map(|ac| {
            let start = position_of(points, ac.start)?;
            let vertex = position_of(points, ac.vertex)?;
            let end = position_of(points, ac.end)?;
            Some(Angle {
                tag: ac.tag.clone(),
                value: angle_degrees(&start, &vertex, &end),
                start: ac.start,
                vertex: ac.vertex,
                end: ac.end,
            })
        })
        .collect()
}

/// Midpoint of the bounding box of the resolved center targets, falling
/// back to all resolved points.
pub(crate) fn compute_center(configuration: &PoseConfiguration, points: &[Point]) -> PointF {
    let targets = points
        .iter()
        .filter(|p| configuration.center_targets.contains(&p.id()))
        .map(|p| &p.position);
    BoundingBox::enclosing(targets)
        .or_else(|| BoundingBox::enclosing(points.iter().map(|p| &p.position)))
        .map_or(PointF::ORIGIN, |b| b.midpoint())
}
