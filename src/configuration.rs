//! Pose configurations: which keypoints to track, which segments to draw
//! and measure, and which angles to compute.
//!
//! A [`PoseConfiguration`] is shared by every pose of a recording, so it is
//! handed around as `Arc<PoseConfiguration>`.
//!
//! # Example
//!
//! ```
//! use pose_compare::{Landmark, PoseConfiguration};
//!
//! let config = PoseConfiguration::cycling();
//! assert!(config.validate().is_ok());
//! assert!(config.angle("knee").is_ok());
//! assert!(config.point(Landmark::RightKnee.id()).is_ok());
//! ```

use std::collections::HashSet;

use crate::error::{PoseError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keypoint identifier as reported by the detection collaborator.
pub type PointId = u32;

/// Packed ARGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const RED: Self = Self(0xFFFF_0000);
    pub const GREEN: Self = Self(0xFF00_FF00);
    pub const BLUE: Self = Self(0xFF00_00FF);
    pub const YELLOW: Self = Self(0xFFFF_FF00);

    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }
}

/// Body landmarks of the 33-keypoint detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum Landmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    LeftMouth = 9,
    RightMouth = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Landmark {
    #[must_use]
    pub const fn id(self) -> PointId {
        self as PointId
    }
}

/// A tracked keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointConfiguration {
    pub id: PointId,
    pub default_color: Color,
    pub selected_color: Color,
}

impl PointConfiguration {
    #[must_use]
    pub const fn new(id: PointId) -> Self {
        Self {
            id,
            default_color: Color::WHITE,
            selected_color: Color::YELLOW,
        }
    }

    #[must_use]
    pub const fn with_colors(mut self, default_color: Color, selected_color: Color) -> Self {
        self.default_color = default_color;
        self.selected_color = selected_color;
        self
    }
}

impl From<Landmark> for PointConfiguration {
    fn from(landmark: Landmark) -> Self {
        Self::new(landmark.id())
    }
}

/// A body segment between two keypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineConfiguration {
    pub tag: String,
    pub start: PointId,
    pub end: PointId,
    pub color: Color,
}

impl LineConfiguration {
    #[must_use]
    pub fn new(tag: impl Into<String>, start: PointId, end: PointId) -> Self {
        Self {
            tag: tag.into(),
            start,
            end,
            color: Color::WHITE,
        }
    }
}

/// Validation attached to an angle definition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AngleRule {
    /// Any value is acceptable.
    #[default]
    Plain,
    /// Directed values outside `[min_angle, max_angle]` are flagged.
    Ranged {
        min_angle: f64,
        max_angle: f64,
        error_color: Color,
    },
}

/// An angle measured at `vertex`, sweeping from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AngleConfiguration {
    pub tag: String,
    pub start: PointId,
    pub vertex: PointId,
    pub end: PointId,
    pub color: Color,
    pub rule: AngleRule,
}

impl AngleConfiguration {
    #[must_use]
    pub fn new(tag: impl Into<String>, start: PointId, vertex: PointId, end: PointId) -> Self {
        Self {
            tag: tag.into(),
            start,
            vertex,
            end,
            color: Color::GREEN,
            rule: AngleRule::Plain,
        }
    }

    /// Restrict the acceptable directed value to `[min_angle, max_angle]`.
    #[must_use]
    pub fn with_range(mut self, min_angle: f64, max_angle: f64, error_color: Color) -> Self {
        self.rule = AngleRule::Ranged {
            min_angle,
            max_angle,
            error_color,
        };
        self
    }

    #[must_use]
    pub const fn point_ids(&self) -> [PointId; 3] {
        [self.start, self.vertex, self.end]
    }

    /// Whether `value` satisfies this angle's rule.
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        match self.rule {
            AngleRule::Plain => true,
            AngleRule::Ranged {
                min_angle,
                max_angle,
                ..
            } => (min_angle..=max_angle).contains(&value),
        }
    }

    /// Color to draw `value` with.
    #[must_use]
    pub fn display_color(&self, value: f64) -> Color {
        match self.rule {
            AngleRule::Ranged { error_color, .. } if !self.accepts(value) => error_color,
            _ => self.color,
        }
    }
}

/// A named bundle of points, lines and angles.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseConfiguration {
    pub tag: String,
    pub points: Vec<PointConfiguration>,
    pub lines: Vec<LineConfiguration>,
    pub angles: Vec<AngleConfiguration>,
    /// Points whose bounding box defines the pose center; empty means all.
    pub center_targets: Vec<PointId>,
}

impl PoseConfiguration {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_points(mut self, points: impl IntoIterator<Item = PointConfiguration>) -> Self {
        self.points.extend(points);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: LineConfiguration) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_angle(mut self, angle: AngleConfiguration) -> Self {
        self.angles.push(angle);
        self
    }

    #[must_use]
    pub fn with_center_targets(mut self, targets: impl IntoIterator<Item = PointId>) -> Self {
        self.center_targets.extend(targets);
        self
    }

    /// Iterator over the configured point ids, in configuration order.
    pub fn point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.points.iter().map(|p| p.id)
    }

    #[must_use]
    pub fn contains_point(&self, id: PointId) -> bool {
        self.points.iter().any(|p| p.id == id)
    }

    /// # Errors
    ///
    /// Returns [`PoseError::PointNotFound`] if `id` is not configured.
    pub fn point(&self, id: PointId) -> Result<&PointConfiguration> {
        self.points
            .iter()
            .find(|p| p.id == id)
            .ok_or(PoseError::point_not_found(id))
    }

    /// # Errors
    ///
    /// Returns [`PoseError::LineNotFound`] if no line has `tag`.
    pub fn line(&self, tag: &str) -> Result<&LineConfiguration> {
        self.lines
            .iter()
            .find(|l| l.tag == tag)
            .ok_or_else(|| PoseError::line_not_found(tag))
    }

    /// # Errors
    ///
    /// Returns [`PoseError::AngleNotFound`] if no angle has `tag`.
    pub fn angle(&self, tag: &str) -> Result<&AngleConfiguration> {
        self.angles
            .iter()
            .find(|a| a.tag == tag)
            .ok_or_else(|| PoseError::angle_not_found(tag))
    }

    /// Check that ids and tags are unique and every line, angle and center
    /// target refers to a configured point.
    ///
    /// # Errors
    ///
    /// Returns an invalid configuration error describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for point in &self.points {
            if !ids.insert(point.id) {
                return Err(PoseError::invalid_config(format!(
                    "point {} configured twice",
                    point.id
                )));
            }
        }

        let check = |id: PointId, owner: &str| {
            if ids.contains(&id) {
                Ok(())
            } else {
                Err(PoseError::invalid_config(format!(
                    "{owner} refers to unconfigured point {id}"
                )))
            }
        };

        let mut tags = HashSet::new();
        for line in &self.lines {
            if !tags.insert(("line", line.tag.as_str())) {
                return Err(PoseError::invalid_config(format!(
                    "line '{}' configured twice",
                    line.tag
                )));
            }
            check(line.start, line.tag.as_str())?;
            check(line.end, line.tag.as_str())?;
        }
        for angle in &self.angles {
            if !tags.insert(("angle", angle.tag.as_str())) {
                return Err(PoseError::invalid_config(format!(
                    "angle '{}' configured twice",
                    angle.tag
                )));
            }
            for id in angle.point_ids() {
                check(id, angle.tag.as_str())?;
            }
            if let AngleRule::Ranged {
                min_angle,
                max_angle,
                ..
            } = angle.rule
            {
                if !(0.0..=360.0).contains(&min_angle) || min_angle > max_angle || max_angle > 360.0 {
                    return Err(PoseError::invalid_config(format!(
                        "angle '{}' has invalid range [{min_angle}, {max_angle}]",
                        angle.tag
                    )));
                }
            }
        }
        for &id in &self.center_targets {
            check(id, "center target")?;
        }
        Ok(())
    }

    /// Right-side view of a rider on a bike.
    #[must_use]
    pub fn cycling() -> Self {
        use Landmark::{RightAnkle, RightElbow, RightHip, RightKnee, RightShoulder, RightWrist};

        Self::new("cycling")
            .with_points(
                [RightShoulder, RightElbow, RightWrist, RightHip, RightKnee, RightAnkle]
                    .map(PointConfiguration::from),
            )
            .with_line(LineConfiguration::new("back", RightHip.id(), RightShoulder.id()))
            .with_line(LineConfiguration::new("thigh", RightHip.id(), RightKnee.id()))
            .with_line(LineConfiguration::new("shin", RightKnee.id(), RightAnkle.id()))
            .with_line(LineConfiguration::new("upper_arm", RightShoulder.id(), RightElbow.id()))
            .with_line(LineConfiguration::new("forearm", RightElbow.id(), RightWrist.id()))
            .with_angle(
                AngleConfiguration::new("knee", RightHip.id(), RightKnee.id(), RightAnkle.id())
                    .with_range(140.0, 330.0, Color::RED),
            )
            .with_angle(AngleConfiguration::new(
                "hip",
                RightShoulder.id(),
                RightHip.id(),
                RightKnee.id(),
            ))
            .with_angle(AngleConfiguration::new(
                "elbow",
                RightShoulder.id(),
                RightElbow.id(),
                RightWrist.id(),
            ))
            .with_center_targets([RightShoulder.id(), RightHip.id()])
    }

    /// Full-body front view of a tennis stroke.
    #[must_use]
    pub fn tennis() -> Self {
        use Landmark::{
            LeftAnkle, LeftElbow, LeftHip, LeftKnee, LeftShoulder, LeftWrist, RightAnkle,
            RightElbow, RightHip, RightKnee, RightShoulder, RightWrist,
        };

        Self::new("tennis")
            .with_points(
                [
                    LeftShoulder,
                    RightShoulder,
                    LeftElbow,
                    RightElbow,
                    LeftWrist,
                    RightWrist,
                    LeftHip,
                    RightHip,
                    LeftKnee,
                    RightKnee,
                    LeftAnkle,
                    RightAnkle,
                ]
                .map(PointConfiguration::from),
            )
            .with_line(LineConfiguration::new("shoulders", LeftShoulder.id(), RightShoulder.id()))
            .with_line(LineConfiguration::new("hips", LeftHip.id(), RightHip.id()))
            .with_line(LineConfiguration::new("right_forearm", RightElbow.id(), RightWrist.id()))
            .with_line(LineConfiguration::new("left_forearm", LeftElbow.id(), LeftWrist.id()))
            .with_angle(AngleConfiguration::new(
                "right_elbow",
                RightShoulder.id(),
                RightElbow.id(),
                RightWrist.id(),
            ))
            .with_angle(AngleConfiguration::new(
                "left_elbow",
                LeftShoulder.id(),
                LeftElbow.id(),
                LeftWrist.id(),
            ))
            .with_angle(AngleConfiguration::new(
                "right_shoulder",
                RightHip.id(),
                RightShoulder.id(),
                RightElbow.id(),
            ))
            .with_angle(AngleConfiguration::new(
                "right_knee",
                RightHip.id(),
                RightKnee.id(),
                RightAnkle.id(),
            ))
            .with_angle(AngleConfiguration::new(
                "left_knee",
                LeftHip.id(),
                LeftKnee.id(),
                LeftAnkle.id(),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(PoseConfiguration::cycling().validate().is_ok());
        assert!(PoseConfiguration::tennis().validate().is_ok());
    }

    #[test]
    fn test_lookup() {
        let config = PoseConfiguration::tennis();
        assert_eq!(config.point(Landmark::LeftKnee.id()).unwrap().id, 25);
        assert_eq!(
            config.point(Landmark::Nose.id()),
            Err(PoseError::PointNotFound { id: 0 })
        );
        assert!(config.angle("right_elbow").is_ok());
        assert!(matches!(
            config.angle("neck"),
            Err(PoseError::AngleNotFound { .. })
        ));
        assert!(matches!(
            config.line("spine"),
            Err(PoseError::LineNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_dangling_refs() {
        let config = PoseConfiguration::new("broken")
            .with_points([PointConfiguration::new(1), PointConfiguration::new(2)])
            .with_angle(AngleConfiguration::new("a", 1, 2, 3));
        assert!(matches!(config.validate(), Err(PoseError::InvalidConfig(_))));

        let config = PoseConfiguration::new("dup")
            .with_points([PointConfiguration::new(1), PointConfiguration::new(1)]);
        assert!(config.validate().is_err());

        let config = PoseConfiguration::new("center")
            .with_points([PointConfiguration::new(1)])
            .with_center_targets([9]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ranged_angle() {
        let plain = AngleConfiguration::new("knee", 1, 2, 3);
        assert!(plain.accepts(359.0));
        assert_eq!(plain.display_color(359.0), Color::GREEN);

        let ranged = plain.with_range(90.0, 180.0, Color::RED);
        assert!(ranged.accepts(90.0));
        assert!(ranged.accepts(180.0));
        assert!(!ranged.accepts(200.0));
        assert_eq!(ranged.display_color(120.0), Color::GREEN);
        assert_eq!(ranged.display_color(200.0), Color::RED);
    }

    #[test]
    fn test_color_packing() {
        assert_eq!(Color::from_argb(0xFF, 0xFF, 0, 0), Color::RED);
        assert_eq!(Color::from_argb(0xFF, 0, 0, 0xFF), Color::BLUE);
    }
}
