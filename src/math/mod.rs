//! Numeric building blocks for pose comparison.
//!
//! This module provides:
//! - [`geometry`]: directed angles, distances and headings on 2D points
//! - [`grid`]: ordinal bucketing of a value range
//! - [`resample`]: fixed-length block averaging
//! - [`stats`]: average/min/max summaries

pub mod geometry;
pub mod grid;
pub mod resample;
pub mod stats;

pub use geometry::{angle_degrees, clockwise_angle, distance, interior_angle, BoundingBox, PointF};
pub use grid::ComparisonGrid;
pub use resample::resample;
pub use stats::SummaryStatistics;
