//! Adjacent-frame motion deltas over a raw recording.
//!
//! For each consecutive pair of frames the analyzer records how far every
//! keypoint moved and how much every angle changed. It also records each
//! frame's angle values and line headings. Lookups by index or by frame
//! mark are provided on the resulting [`FrameAnalysis`].

use crate::compare::ComparableLine;
use crate::configuration::PointId;
use crate::error::{PoseError, Result};
use crate::math::geometry::distance;
use crate::pose::{Pose, PoseView};
use crate::video::{PoseVideo, Timestamp};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance a keypoint moved between two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointDistance {
    pub id: PointId,
    pub distance: f64,
}

/// Signed change of an angle between two frames (later minus earlier).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AngleDelta {
    pub tag: String,
    pub delta: f64,
}

/// A tagged scalar measured on a single frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedValue {
    pub tag: String,
    pub value: f64,
}

/// Motion between two consecutive frames.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameDifference {
    pub from_timestamp: Timestamp,
    pub to_timestamp: Timestamp,
    /// Mark of the later frame.
    pub pose_mark: Option<String>,
    /// Empty when either frame has no pose.
    pub point_distances: Vec<PointDistance>,
    /// Empty when either frame has no pose.
    pub angle_deltas: Vec<AngleDelta>,
}

/// Angle values and line headings of one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameMeasurement {
    pub timestamp: Timestamp,
    pub pose_mark: Option<String>,
    pub angle_values: Vec<TaggedValue>,
    /// Clockwise heading of each line from its start to its end point.
    pub line_directions: Vec<TaggedValue>,
}

/// Result of [`analyze_frames`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameAnalysis {
    differences: Vec<FrameDifference>,
    measurements: Vec<FrameMeasurement>,
}

impl FrameAnalysis {
    /// One record per consecutive frame pair.
    #[must_use]
    pub fn differences(&self) -> &[FrameDifference] {
        &self.differences
    }

    /// One record per frame.
    #[must_use]
    pub fn measurements(&self) -> &[FrameMeasurement] {
        &self.measurements
    }

    #[must_use]
    pub fn difference(&self, index: usize) -> Option<&FrameDifference> {
        self.differences.get(index)
    }

    #[must_use]
    pub fn measurement(&self, index: usize) -> Option<&FrameMeasurement> {
        self.measurements.get(index)
    }

    /// First difference leading into a frame marked `mark`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::MarkNotFound`] if no such difference exists.
    pub fn difference_at_mark(&self, mark: &str) -> Result<&FrameDifference> {
        self.differences
            .iter()
            .find(|d| d.pose_mark.as_deref() == Some(mark))
            .ok_or_else(|| PoseError::mark_not_found(mark))
    }

    /// Measurement of the first frame marked `mark`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::MarkNotFound`] if no frame has that mark.
    pub fn measurement_at_mark(&self, mark: &str) -> Result<&FrameMeasurement> {
        self.measurements
            .iter()
            .find(|m| m.pose_mark.as_deref() == Some(mark))
            .ok_or_else(|| PoseError::mark_not_found(mark))
    }

    /// Per-pair movement of keypoint `id`, skipping pairs where it is absent.
    #[must_use]
    pub fn point_distance_curve(&self, id: PointId) -> ComparableLine {
        self.differences
            .iter()
            .filter_map(|d| d.point_distances.iter().find(|p| p.id == id))
            .map(|p| p.distance)
            .collect()
    }

    /// Per-pair change of angle `tag`, skipping pairs where it is absent.
    #[must_use]
    pub fn angle_delta_curve(&self, tag: &str) -> ComparableLine {
        self.differences
            .iter()
            .filter_map(|d| d.angle_deltas.iter().find(|a| a.tag == tag))
            .map(|a| a.delta)
            .collect()
    }
}

fn point_distances(prev: &Pose, next: &Pose) -> Vec<PointDistance> {
    prev.configuration()
        .point_ids()
        .filter_map(|id| {
            let a = prev.point(id).ok()?;
            let b = next.point(id).ok()?;
            Some(PointDistance {
                id,
                distance: distance(&a.position, &b.position),
            })
        })
        .collect()
}

fn angle_deltas(prev: &Pose, next: &Pose) -> Vec<AngleDelta> {
    prev.angles()
        .iter()
        .filter_map(|a| {
            let b = next.angle(&a.tag).ok()?;
            Some(AngleDelta {
                tag: a.tag.clone(),
                delta: b.value - a.value,
            })
        })
        .collect()
}

fn measure(pose: &Pose) -> (Vec<TaggedValue>, Vec<TaggedValue>) {
    let angle_values = pose
        .angles()
        .iter()
        .map(|a| TaggedValue {
            tag: a.tag.clone(),
            value: a.value,
        })
        .collect();
    let line_directions = pose
        .configuration()
        .lines
        .iter()
        .filter_map(|line| {
            pose.line_direction(&line.tag).ok().map(|value| TaggedValue {
                tag: line.tag.clone(),
                value,
            })
        })
        .collect();
    (angle_values, line_directions)
}

/// Run the frame-difference pass over a raw recording.
///
/// A video of `N` frames yields `N - 1` differences and `N` measurements.
#[must_use]
pub fn analyze_frames(video: &PoseVideo) -> FrameAnalysis {
    let frames = video.frames();

    let differences: Vec<FrameDifference> = frames
        .windows(2)
        .map(|pair| {
            let (prev, next) = (&pair[0], &pair[1]);
            let (point_distances, angle_deltas) = match (&prev.pose, &next.pose) {
                (Some(a), Some(b)) => (point_distances(a, b), angle_deltas(a, b)),
                _ => (Vec::new(), Vec::new()),
            };
            FrameDifference {
                from_timestamp: prev.timestamp,
                to_timestamp: next.timestamp,
                pose_mark: next.pose_mark.clone(),
                point_distances,
                angle_deltas,
            }
        })
        .collect();

    let measurements: Vec<FrameMeasurement> = frames
        .iter()
        .map(|frame| {
            let (angle_values, line_directions) =
                frame.pose.as_ref().map(measure).unwrap_or_default();
            FrameMeasurement {
                timestamp: frame.timestamp,
                pose_mark: frame.pose_mark.clone(),
                angle_values,
                line_directions,
            }
        })
        .collect();

    tracing::debug!(
        "Analyzed {}: {} frames, {} differences",
        video.source_uri(),
        measurements.len(),
        differences.len()
    );

    FrameAnalysis {
        differences,
        measurements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{AngleConfiguration, LineConfiguration, PointConfiguration, PoseConfiguration};
    use crate::pose::{Detection, Keypoint};
    use crate::video::PoseFrame;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn config() -> Arc<PoseConfiguration> {
        Arc::new(
            PoseConfiguration::new("arm")
                .with_points([1, 2, 3].map(PointConfiguration::new))
                .with_line(LineConfiguration::new("forearm", 2, 3))
                .with_angle(AngleConfiguration::new("elbow", 1, 2, 3)),
        )
    }

    fn pose(wrist: (f64, f64)) -> Pose {
        let detection = Detection::from([
            (1, Keypoint::new(0.0, 0.0, 0.9)),
            (2, Keypoint::new(100.0, 0.0, 0.9)),
            (3, Keypoint::new(wrist.0, wrist.1, 0.9)),
        ]);
        Pose::assemble(config(), &detection, 640, 480)
    }

    fn video() -> PoseVideo {
        PoseVideo::from_frames(
            "file://curl.mp4",
            33,
            vec![
                PoseFrame::new(0, Some(pose((200.0, 0.0)))),
                PoseFrame::new(33, Some(pose((100.0, 100.0)))).with_mark("bent"),
                PoseFrame::new(66, None),
                PoseFrame::new(99, Some(pose((200.0, 0.0)))).with_mark("straight"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_difference_count_and_timestamps() {
        let analysis = analyze_frames(&video());
        assert_eq!(analysis.differences().len(), 3);
        assert_eq!(analysis.measurements().len(), 4);
        for (i, d) in analysis.differences().iter().enumerate() {
            assert_eq!(d.from_timestamp, 33 * i as u64);
            assert_eq!(d.to_timestamp, 33 * (i as u64 + 1));
        }
    }

    #[test]
    fn test_deltas() {
        let analysis = analyze_frames(&video());
        let first = analysis.difference(0).unwrap();
        assert_eq!(first.point_distances.len(), 3);
        assert_relative_eq!(first.point_distances[0].distance, 0.0);
        let wrist = first.point_distances.iter().find(|p| p.id == 3).unwrap();
        assert_relative_eq!(wrist.distance, 2.0_f64.sqrt() * 100.0, epsilon = 1e-9);
        assert_eq!(first.angle_deltas.len(), 1);
        assert_relative_eq!(first.angle_deltas[0].delta, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_pose_gives_empty_difference() {
        let analysis = analyze_frames(&video());
        for index in [1, 2] {
            let d = analysis.difference(index).unwrap();
            assert!(d.point_distances.is_empty());
            assert!(d.angle_deltas.is_empty());
        }
        let measurement = analysis.measurement(2).unwrap();
        assert!(measurement.angle_values.is_empty());
        assert!(measurement.line_directions.is_empty());
    }

    #[test]
    fn test_measurements() {
        let analysis = analyze_frames(&video());
        let bent = analysis.measurement_at_mark("bent").unwrap();
        assert_eq!(bent.timestamp, 33);
        assert_relative_eq!(bent.angle_values[0].value, 270.0, epsilon = 1e-9);
        // forearm points straight down
        assert_eq!(bent.line_directions[0].tag, "forearm");
        assert_relative_eq!(bent.line_directions[0].value, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mark_lookup() {
        let analysis = analyze_frames(&video());
        assert_eq!(analysis.difference_at_mark("straight").unwrap().to_timestamp, 99);
        assert_eq!(analysis.difference_at_mark("bent").unwrap().from_timestamp, 0);
        assert!(matches!(
            analysis.difference_at_mark("follow-through"),
            Err(PoseError::MarkNotFound { .. })
        ));
        assert!(analysis.measurement_at_mark("follow-through").is_err());
    }

    #[test]
    fn test_curves() {
        let analysis = analyze_frames(&video());
        assert_eq!(analysis.angle_delta_curve("elbow").len(), 1);
        assert_eq!(analysis.point_distance_curve(3).len(), 1);
        assert!(analysis.point_distance_curve(9).is_empty());
    }

    #[test]
    fn test_single_and_empty_videos() {
        let empty = PoseVideo::new("empty", 33).unwrap();
        let analysis = analyze_frames(&empty);
        assert!(analysis.differences().is_empty());
        assert!(analysis.measurements().is_empty());

        let single = PoseVideo::from_frames("one", 33, vec![PoseFrame::new(0, Some(pose((1.0, 1.0))))]).unwrap();
        let analysis = analyze_frames(&single);
        assert!(analysis.differences().is_empty());
        assert_eq!(analysis.measurements().len(), 1);
    }
}
