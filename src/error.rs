//! Error types for pose comparison operations.
//!
//! Lookups by id, tag or mark, resampling and normalization all fail fast
//! with a [`PoseError`]. A pose that is missing detected points is *not* an
//! error; it is flagged on the [`Pose`](crate::Pose) itself.

use thiserror::Error;

use crate::configuration::PointId;

/// Main error type for pose comparison operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    /// Requested point id is absent from a pose or configuration.
    #[error("Point {id} not found")]
    PointNotFound { id: PointId },

    /// Requested angle tag is absent.
    #[error("Angle '{tag}' not found")]
    AngleNotFound { tag: String },

    /// Requested line tag is absent.
    #[error("Line '{tag}' not found")]
    LineNotFound { tag: String },

    /// No frame carries the requested mark.
    #[error("No frame marked '{mark}'")]
    MarkNotFound { mark: String },

    /// Resampling asked for more values than the input holds.
    #[error("Sample size {requested} exceeds input length {available}")]
    SampleSizeExceedsInput { requested: usize, available: usize },

    /// Normalization of a pose whose bounding square has zero size.
    #[error("Degenerate bounding box: all points coincide")]
    DegenerateBoundingBox,

    /// Aggregate requested over an empty sequence.
    #[error("Empty sequence: {context}")]
    EmptySequence { context: String },

    /// Frame timestamps are not strictly increasing.
    #[error("Timestamps must be strictly increasing at index {index}")]
    NonMonotonicTimestamps { index: usize },

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for pose comparison operations.
pub type Result<T> = std::result::Result<T, PoseError>;

impl PoseError {
    /// Create a point not found error.
    #[must_use]
    pub const fn point_not_found(id: PointId) -> Self {
        Self::PointNotFound { id }
    }

    /// Create an angle not found error.
    #[must_use]
    pub fn angle_not_found(tag: impl Into<String>) -> Self {
        Self::AngleNotFound { tag: tag.into() }
    }

    /// Create a line not found error.
    #[must_use]
    pub fn line_not_found(tag: impl Into<String>) -> Self {
        Self::LineNotFound { tag: tag.into() }
    }

    /// Create a mark not found error.
    #[must_use]
    pub fn mark_not_found(mark: impl Into<String>) -> Self {
        Self::MarkNotFound { mark: mark.into() }
    }

    /// Create a sample size error.
    #[must_use]
    pub const fn sample_size_exceeds_input(requested: usize, available: usize) -> Self {
        Self::SampleSizeExceedsInput {
            requested,
            available,
        }
    }

    /// Create an empty sequence error.
    #[must_use]
    pub fn empty_sequence(context: impl Into<String>) -> Self {
        Self::EmptySequence {
            context: context.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoseError::sample_size_exceeds_input(12, 5);
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("5"));

        let err = PoseError::mark_not_found("top of stroke");
        assert!(err.to_string().contains("top of stroke"));
    }

    #[test]
    fn test_error_constructors() {
        assert_eq!(
            PoseError::point_not_found(25),
            PoseError::PointNotFound { id: 25 }
        );
        assert_eq!(
            PoseError::angle_not_found("knee"),
            PoseError::AngleNotFound {
                tag: "knee".to_string()
            }
        );
        assert_eq!(
            PoseError::invalid_input("bad"),
            PoseError::InvalidInput("bad".to_string())
        );

        assert!(PoseError::line_not_found("torso").to_string().contains("torso"));
        assert!(PoseError::empty_sequence("no distances")
            .to_string()
            .contains("no distances"));
        assert!(PoseError::invalid_config("grid_count must be at least 1")
            .to_string()
            .contains("grid_count must be at least 1"));
    }
}
