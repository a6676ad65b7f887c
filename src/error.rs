//! Error types for regrid.
//!
//! Every failure of index or weight construction, and of applying a built
//! interpolator to a value field, is reported through [`RegridError`].
//! Nothing is retried or silently patched up.

use thiserror::Error;

/// The main error type for regrid operations.
#[derive(Error, Debug)]
pub enum RegridError {
    /// The source grid cannot support an interpolator
    #[error("Degenerate input: {message}")]
    DegenerateInput { message: String },

    /// A target point is too far from its nearest source point
    #[error("Point is too far away from nearest point: {distance} m (max distance = {max_distance} m)")]
    OutOfRange { distance: f64, max_distance: f64 },

    /// A target point lies outside the convex hull of the source grid
    #[error("Target point {index} ({lon}, {lat}) is outside the convex hull of the source grid")]
    OutsideHull { index: usize, lon: f64, lat: f64 },

    /// Array shapes disagree
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },
}

/// Convenience type alias for Results with RegridError
pub type Result<T> = std::result::Result<T, RegridError>;
