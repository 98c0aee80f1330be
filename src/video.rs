//! Recorded pose sequences.
//!
//! A [`PoseVideo`] accumulates [`PoseFrame`]s in strictly increasing
//! timestamp order while a recording is processed. Once complete it can be
//! normalized frame by frame into a [`NormalizedPoseVideo`], from which
//! per-angle curves are extracted for comparison.

use std::sync::Arc;

use crate::compare::ComparableLine;
use crate::config::ComparisonConfig;
use crate::configuration::PoseConfiguration;
use crate::error::{PoseError, Result};
use crate::normalize::{normalize, NormalizedPose};
use crate::pose::{Pose, PoseView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds from the start of the video.
pub type Timestamp = u64;

/// One sampled instant of a recording.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseFrame {
    pub timestamp: Timestamp,
    /// `None` when detection failed for this instant.
    pub pose: Option<Pose>,
    pub pose_mark: Option<String>,
}

impl PoseFrame {
    #[must_use]
    pub const fn new(timestamp: Timestamp, pose: Option<Pose>) -> Self {
        Self {
            timestamp,
            pose,
            pose_mark: None,
        }
    }

    #[must_use]
    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.pose_mark = Some(mark.into());
        self
    }
}

/// A normalized counterpart of [`PoseFrame`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalizedPoseFrame {
    pub timestamp: Timestamp,
    pub pose: Option<NormalizedPose>,
    pub pose_mark: Option<String>,
}

/// Instants at which to request frames from a video of `duration_ms`,
/// every `step_ms` starting at zero.
///
/// # Errors
///
/// Returns an invalid input error if `step_ms` is zero.
pub fn sample_timestamps(duration_ms: Timestamp, step_ms: Timestamp) -> Result<Vec<Timestamp>> {
    check_step(step_ms)?;
    Ok((0..duration_ms).step_by(usize::try_from(step_ms).unwrap_or(usize::MAX)).collect())
}

fn check_increasing(timestamps: impl Iterator<Item = Timestamp>) -> Result<()> {
    let mut last = None;
    for (index, ts) in timestamps.enumerate() {
        if last.is_some_and(|prev| ts <= prev) {
            return Err(PoseError::NonMonotonicTimestamps { index });
        }
        last = Some(ts);
    }
    Ok(())
}

fn check_step(timestamp_step_ms: Timestamp) -> Result<()> {
    if timestamp_step_ms == 0 {
        return Err(PoseError::invalid_input("timestamp step must be positive"));
    }
    Ok(())
}

/// Stored form of a recording.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct VideoRecord<F> {
    source_uri: String,
    timestamp_step_ms: Timestamp,
    frames: Vec<F>,
}

#[cfg(feature = "serde")]
impl TryFrom<VideoRecord<PoseFrame>> for PoseVideo {
    type Error = PoseError;

    fn try_from(record: VideoRecord<PoseFrame>) -> Result<Self> {
        Self::from_frames(record.source_uri, record.timestamp_step_ms, record.frames)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<VideoRecord<NormalizedPoseFrame>> for NormalizedPoseVideo {
    type Error = PoseError;

    fn try_from(record: VideoRecord<NormalizedPoseFrame>) -> Result<Self> {
        check_step(record.timestamp_step_ms)?;
        check_increasing(record.frames.iter().map(|f| f.timestamp))?;
        Ok(Self {
            source_uri: record.source_uri,
            timestamp_step_ms: record.timestamp_step_ms,
            frames: record.frames,
        })
    }
}

fn find_mark<'a, T>(
    items: &'a [T],
    mark: &str,
    mark_of: impl Fn(&T) -> Option<&str>,
) -> Result<(usize, &'a T)> {
    items
        .iter()
        .enumerate()
        .find(|(_, item)| mark_of(item) == Some(mark))
        .ok_or_else(|| PoseError::mark_not_found(mark))
}

/// A recorded sequence of poses.
///
/// Stored recordings are loaded through [`PoseVideo::from_frames`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "VideoRecord<PoseFrame>"))]
pub struct PoseVideo {
    source_uri: String,
    timestamp_step_ms: Timestamp,
    frames: Vec<PoseFrame>,
}

impl PoseVideo {
    /// Start an empty recording of `source_uri`.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if `timestamp_step_ms` is zero.
    pub fn new(source_uri: impl Into<String>, timestamp_step_ms: Timestamp) -> Result<Self> {
        Self::from_frames(source_uri, timestamp_step_ms, Vec::new())
    }

    /// Build a recording from frames already in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the step is zero or timestamps do not strictly increase.
    pub fn from_frames(
        source_uri: impl Into<String>,
        timestamp_step_ms: Timestamp,
        frames: Vec<PoseFrame>,
    ) -> Result<Self> {
        check_step(timestamp_step_ms)?;
        check_increasing(frames.iter().map(|f| f.timestamp))?;
        Ok(Self {
            source_uri: source_uri.into(),
            timestamp_step_ms,
            frames,
        })
    }

    /// Append a frame.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::NonMonotonicTimestamps`] if the frame is not
    /// strictly later than the last one.
    pub fn push_frame(&mut self, frame: PoseFrame) -> Result<()> {
        if let Some(last) = self.frames.last() {
            if frame.timestamp <= last.timestamp {
                return Err(PoseError::NonMonotonicTimestamps {
                    index: self.frames.len(),
                });
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    #[must_use]
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    #[must_use]
    pub const fn timestamp_step_ms(&self) -> Timestamp {
        self.timestamp_step_ms
    }

    #[must_use]
    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First frame carrying `mark`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::MarkNotFound`] if no frame has that mark.
    pub fn frame_at_mark(&self, mark: &str) -> Result<&PoseFrame> {
        self.index_of_mark(mark).map(|i| &self.frames[i])
    }

    /// Position of the first frame carrying `mark`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::MarkNotFound`] if no frame has that mark.
    pub fn index_of_mark(&self, mark: &str) -> Result<usize> {
        find_mark(&self.frames, mark, |f| f.pose_mark.as_deref()).map(|(i, _)| i)
    }

    /// Frame nearest to `timestamp`, if one lies within half a step of it.
    #[must_use]
    pub fn frame_at_timestamp(&self, timestamp: Timestamp) -> Option<&PoseFrame> {
        let tolerance = self.timestamp_step_ms / 2;
        self.frames
            .iter()
            .min_by_key(|f| f.timestamp.abs_diff(timestamp))
            .filter(|f| f.timestamp.abs_diff(timestamp) <= tolerance)
    }

    /// Normalize every frame.
    ///
    /// Poses that miss configured points or whose average likelihood falls
    /// below `config.min_likelihood` become `None`.
    ///
    /// # Errors
    ///
    /// Propagates normalization failures such as
    /// [`PoseError::DegenerateBoundingBox`].
    pub fn to_normalized(&self, config: &ComparisonConfig) -> Result<NormalizedPoseVideo> {
        let mut discarded = 0usize;
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                let pose = match &frame.pose {
                    Some(pose)
                        if !pose.missing_points()
                            && pose.average_likelihood() >= config.min_likelihood =>
                    {
                        Some(normalize(pose)?)
                    }
                    Some(_) => {
                        discarded += 1;
                        None
                    }
                    None => None,
                };
                Ok(NormalizedPoseFrame {
                    timestamp: frame.timestamp,
                    pose,
                    pose_mark: frame.pose_mark.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if discarded > 0 {
            tracing::debug!(
                "Discarded {} of {} poses from {} while normalizing",
                discarded,
                self.frames.len(),
                self.source_uri
            );
        }

        Ok(NormalizedPoseVideo {
            source_uri: self.source_uri.clone(),
            timestamp_step_ms: self.timestamp_step_ms,
            frames,
        })
    }
}

/// A [`PoseVideo`] with every pose on the canonical canvas.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "VideoRecord<NormalizedPoseFrame>")
)]
pub struct NormalizedPoseVideo {
    source_uri: String,
    timestamp_step_ms: Timestamp,
    frames: Vec<NormalizedPoseFrame>,
}

impl NormalizedPoseVideo {
    #[must_use]
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    #[must_use]
    pub const fn timestamp_step_ms(&self) -> Timestamp {
        self.timestamp_step_ms
    }

    #[must_use]
    pub fn frames(&self) -> &[NormalizedPoseFrame] {
        &self.frames
    }

    /// Iterator over the poses that were detected, in frame order.
    pub fn poses(&self) -> impl Iterator<Item = &NormalizedPose> {
        self.frames.iter().filter_map(|f| f.pose.as_ref())
    }

    /// Configuration of the first detected pose.
    #[must_use]
    pub fn configuration(&self) -> Option<&Arc<PoseConfiguration>> {
        self.poses().next().map(PoseView::configuration)
    }

    /// Angle tags tracked by this recording, in configuration order.
    #[must_use]
    pub fn tracked_angle_tags(&self) -> Vec<String> {
        self.configuration()
            .map(|c| c.angles.iter().map(|a| a.tag.clone()).collect())
            .unwrap_or_default()
    }

    /// First frame carrying `mark`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::MarkNotFound`] if no frame has that mark.
    pub fn frame_at_mark(&self, mark: &str) -> Result<&NormalizedPoseFrame> {
        find_mark(&self.frames, mark, |f| f.pose_mark.as_deref()).map(|(_, f)| f)
    }

    /// Values of angle `tag` over every detected pose.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::AngleNotFound`] if `tag` is not configured.
    pub fn angle_curve(&self, tag: &str) -> Result<ComparableLine> {
        if let Some(config) = self.configuration() {
            config.angle(tag)?;
        }
        Ok(self
            .poses()
            .filter_map(|p| p.angle(tag).ok().map(|a| a.value))
            .collect())
    }

    /// Lengths of line `tag` over every detected pose.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::LineNotFound`] if `tag` is not configured.
    pub fn line_length_curve(&self, tag: &str) -> Result<ComparableLine> {
        if let Some(config) = self.configuration() {
            config.line(tag)?;
        }
        Ok(self
            .poses()
            .filter_map(|p| p.line_length(tag).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{AngleConfiguration, LineConfiguration, PointConfiguration};
    use crate::pose::{Detection, Keypoint};
    use approx::assert_relative_eq;

    fn config() -> Arc<PoseConfiguration> {
        Arc::new(
            PoseConfiguration::new("arm")
                .with_points([1, 2, 3].map(PointConfiguration::new))
                .with_line(LineConfiguration::new("forearm", 2, 3))
                .with_angle(AngleConfiguration::new("elbow", 1, 2, 3)),
        )
    }

    fn arm_pose(wrist: (f64, f64), likelihood: f64) -> Pose {
        let detection = Detection::from([
            (1, Keypoint::new(0.0, 0.0, likelihood)),
            (2, Keypoint::new(100.0, 0.0, likelihood)),
            (3, Keypoint::new(wrist.0, wrist.1, likelihood)),
        ]);
        Pose::assemble(config(), &detection, 640, 480)
    }

    fn video() -> PoseVideo {
        PoseVideo::from_frames(
            "file://serve.mp4",
            100,
            vec![
                PoseFrame::new(0, Some(arm_pose((200.0, 0.0), 0.9))),
                PoseFrame::new(100, None).with_mark("gap"),
                PoseFrame::new(200, Some(arm_pose((100.0, 100.0), 0.9))).with_mark("bend"),
                PoseFrame::new(300, Some(arm_pose((200.0, 0.0), 0.2))).with_mark("bend"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ordering_enforced() {
        let mut video = PoseVideo::new("v", 40).unwrap();
        video.push_frame(PoseFrame::new(0, None)).unwrap();
        video.push_frame(PoseFrame::new(40, None)).unwrap();
        assert_eq!(
            video.push_frame(PoseFrame::new(40, None)),
            Err(PoseError::NonMonotonicTimestamps { index: 2 })
        );
        assert_eq!(video.len(), 2);

        let result = PoseVideo::from_frames(
            "v",
            40,
            vec![PoseFrame::new(80, None), PoseFrame::new(40, None)],
        );
        assert_eq!(result, Err(PoseError::NonMonotonicTimestamps { index: 1 }));
        assert!(PoseVideo::new("v", 0).is_err());
    }

    #[test]
    fn test_marks() {
        let video = video();
        assert_eq!(video.frame_at_mark("bend").unwrap().timestamp, 200);
        assert_eq!(video.index_of_mark("gap").unwrap(), 1);
        assert_eq!(
            video.frame_at_mark("finish"),
            Err(PoseError::MarkNotFound {
                mark: "finish".to_string()
            })
        );
    }

    #[test]
    fn test_frame_at_timestamp() {
        let video = video();
        assert_eq!(video.frame_at_timestamp(210).unwrap().timestamp, 200);
        assert_eq!(video.frame_at_timestamp(250).unwrap().timestamp, 200);
        assert_eq!(video.frame_at_timestamp(260).unwrap().timestamp, 300);
        assert!(video.frame_at_timestamp(400).is_none());
    }

    #[test]
    fn test_sample_timestamps() {
        assert_eq!(sample_timestamps(250, 100).unwrap(), vec![0, 100, 200]);
        assert!(sample_timestamps(250, 0).is_err());
        assert!(sample_timestamps(0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_normalized_curves() {
        let video = video();
        let normalized = video.to_normalized(&ComparisonConfig::default()).unwrap();
        assert_eq!(normalized.frames().len(), 4);
        assert_eq!(normalized.poses().count(), 3);
        assert_eq!(normalized.tracked_angle_tags(), vec!["elbow".to_string()]);

        let curve = normalized.angle_curve("elbow").unwrap();
        assert_eq!(curve.len(), 3);
        assert_relative_eq!(curve.values()[0], 180.0, epsilon = 1e-9);
        assert_relative_eq!(curve.values()[1], 270.0, epsilon = 1e-9);

        assert_eq!(normalized.line_length_curve("forearm").unwrap().len(), 3);
        assert!(normalized.angle_curve("knee").is_err());
        assert!(normalized.line_length_curve("shin").is_err());
        assert_eq!(normalized.frame_at_mark("bend").unwrap().timestamp, 200);
    }

    #[test]
    fn test_normalize_drops_unlikely_poses() {
        let config = ComparisonConfig::default().with_min_likelihood(0.5);
        let normalized = video().to_normalized(&config).unwrap();
        assert_eq!(normalized.poses().count(), 2);
        assert!(normalized.frames()[3].pose.is_none());
        assert_eq!(normalized.frames()[3].pose_mark.as_deref(), Some("bend"));
    }
}
