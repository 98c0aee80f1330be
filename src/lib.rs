//! Pose Comparison Library
//!
//! Quantitative comparison of 2D human motion against a reference recording.
//!
//! Keypoints come from an external pose detector, one set per video frame.
//! This library turns them into a comparable representation and measures
//! how far a sample performance is from a template one, even when the two
//! run at different speeds or durations.
//!
//! # Pipeline
//!
//! 1. Assemble a [`Pose`] from detector output ([`Pose::assemble`])
//! 2. Normalize it onto a 100x100 canvas ([`normalize`])
//! 3. Collect poses over time in a [`PoseVideo`] and normalize it
//! 4. Extract one [`ComparableLine`] per tracked angle
//! 5. Resample and compare with DTW or a comparison grid ([`compare_videos`])
//!
//! Independently, [`analyze_frames`] computes adjacent-frame deltas on the
//! raw recording.
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use pose_compare::{
//!     compare_videos, AngleConfiguration, ComparisonConfig, Keypoint, PointConfiguration,
//!     Pose, PoseConfiguration, PoseFrame, PoseVideo,
//! };
//!
//! let config = Arc::new(
//!     PoseConfiguration::new("arm")
//!         .with_points([1, 2, 3].map(PointConfiguration::new))
//!         .with_angle(AngleConfiguration::new("elbow", 1, 2, 3)),
//! );
//!
//! let record = |wrist_y: &[f64]| -> pose_compare::Result<PoseVideo> {
//!     let mut video = PoseVideo::new("memory://arm", 40)?;
//!     for (i, &y) in wrist_y.iter().enumerate() {
//!         let detection = HashMap::from([
//!             (1, Keypoint::new(0.0, 100.0, 0.9)),
//!             (2, Keypoint::new(100.0, 100.0, 0.9)),
//!             (3, Keypoint::new(200.0, y, 0.9)),
//!         ]);
//!         let pose = Pose::assemble(Arc::clone(&config), &detection, 640, 480);
//!         video.push_frame(PoseFrame::new(i as u64 * 40, Some(pose)))?;
//!     }
//!     Ok(video)
//! };
//!
//! let template = record(&[100.0, 80.0, 60.0, 80.0, 100.0])?;
//! let sample = record(&[100.0, 100.0, 80.0, 80.0, 60.0, 60.0, 80.0, 80.0, 100.0, 100.0])?;
//!
//! let settings = ComparisonConfig::default();
//! let report = compare_videos(
//!     &sample.to_normalized(&settings)?,
//!     &template.to_normalized(&settings)?,
//!     &settings,
//! )?;
//! assert!(report.distance("elbow")? < 1e-6);
//! # Ok::<(), pose_compare::PoseError>(())
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod compare;
pub mod config;
pub mod configuration;
pub mod error;
pub mod frame_diff;
pub mod math;
pub mod normalize;
pub mod pose;
pub mod validation;
pub mod video;

// Re-exports for convenient access
pub use compare::{
    compare_lines, compare_videos, dtw_align, dtw_distance, grid_score, AngleDistance,
    ComparableLine, ComparisonReport, DtwAlignment,
};
pub use config::{ComparisonConfig, ComparisonStrategy, GridRange};
pub use configuration::{
    AngleConfiguration, AngleRule, Color, Landmark, LineConfiguration, PointConfiguration,
    PointId, PoseConfiguration,
};
pub use error::{PoseError, Result};
pub use frame_diff::{
    analyze_frames, AngleDelta, FrameAnalysis, FrameDifference, FrameMeasurement, PointDistance,
    TaggedValue,
};
pub use math::{ComparisonGrid, PointF, SummaryStatistics};
pub use normalize::{normalize, NormalizedPose, CANVAS_CENTER, CANVAS_SIZE};
pub use pose::{Angle, Detection, Keypoint, Point, Pose, PoseView};
pub use validation::{validate_angles, AngleViolation};
pub use video::{
    sample_timestamps, NormalizedPoseFrame, NormalizedPoseVideo, PoseFrame, PoseVideo, Timestamp,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
