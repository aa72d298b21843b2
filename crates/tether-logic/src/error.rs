//! Error taxonomy for configuration and content intake.
//!
//! Configuration errors are fatal and surface before the scene starts.
//! Data errors are local: the offending item is dropped from the page and
//! everything else keeps running.

use thiserror::Error;

/// Invalid scene configuration. The scene refuses to start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("floor size must be positive and finite, got {width}×{depth}")]
    FloorSize { width: f32, depth: f32 },

    #[error("margin fraction {0} must lie in [0, 0.5)")]
    MarginFraction(f32),

    #[error("ceiling y {ceiling} must be above floor y {floor}")]
    CeilingBelowFloor { floor: f32, ceiling: f32 },

    #[error("page size must be at least 1")]
    PageSize,

    #[error("{field}: range [{min}, {max}] is empty or non-finite")]
    Range {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be non-negative and finite, got {value}")]
    Tuning { field: &'static str, value: f32 },

    #[error("config parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// A malformed content record. The item is excluded from the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("content item at position {index} has no id")]
    MissingId { index: usize },

    #[error("content item at position {index} repeats id {id:?}")]
    DuplicateId { index: usize, id: String },
}

/// Check that a tuning value is finite and `>= 0`.
pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Tuning { field, value })
    }
}

/// Check that `[min, max]` is a finite, non-empty range.
pub(crate) fn ordered_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::Range { field, min, max })
    }
}
