//! Range checks on computed angles.
//!
//! Angles configured with [`AngleRule::Ranged`]
//! carry an acceptable interval for their *directed* value. This module
//! reports the angles of a pose that fall outside it.

use crate::configuration::{AngleRule, Color};
use crate::pose::PoseView;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An angle whose value lies outside its configured range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AngleViolation {
    pub tag: String,
    pub value: f64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub error_color: Color,
}

/// Every ranged angle of `pose` whose value violates its range, in
/// configuration order. Angles that could not be computed are skipped.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use pose_compare::{
///     validate_angles, AngleConfiguration, Color, Keypoint, PointConfiguration, Pose,
///     PoseConfiguration,
/// };
///
/// let config = Arc::new(
///     PoseConfiguration::new("arm")
///         .with_points([1, 2, 3].map(PointConfiguration::new))
///         .with_angle(AngleConfiguration::new("elbow", 1, 2, 3).with_range(0.0, 200.0, Color::RED)),
/// );
/// let detection = HashMap::from([
///     (1, Keypoint::new(0.0, 0.0, 1.0)),
///     (2, Keypoint::new(10.0, 0.0, 1.0)),
///     (3, Keypoint::new(10.0, 10.0, 1.0)),
/// ]);
/// let pose = Pose::assemble(config, &detection, 100, 100);
/// let violations = validate_angles(&pose);
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].tag, "elbow");
/// ```
pub fn validate_angles(pose: &impl PoseView) -> Vec<AngleViolation> {
    pose.configuration()
        .angles
        .iter()
        .filter_map(|config| {
            let AngleRule::Ranged {
                min_angle,
                max_angle,
                error_color,
            } = config.rule
            else {
                return None;
            };
            let value = pose.angle(&config.tag).ok()?.value;
            (!config.accepts(value)).then(|| AngleViolation {
                tag: config.tag.clone(),
                value,
                min_angle,
                max_angle,
                error_color,
            })
        })
        .collect()
}
