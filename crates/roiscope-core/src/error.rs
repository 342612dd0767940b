use crate::Real;
use thiserror::Error;

/// Recoverable errors raised by the geometry and calibration engine.
///
/// Every error is detected before any state is mutated, so the component
/// that returned it is still in its previous, consistent state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoiError {
    /// A new edge would cross a non-adjacent edge of the polygon.
    #[error("edge would cross an existing non-adjacent edge")]
    SelfIntersectingPolygon,
    /// A captured point is too close to an existing vertex.
    #[error("point is within {min_distance} px of an existing vertex")]
    PointTooClose { min_distance: Real },
    /// The polygon is already closed and accepts no more points.
    #[error("polygon is already closed")]
    CaptureClosed,
    /// Calibration corners collapse (duplicate or collinear points).
    #[error("calibration rectangle is degenerate: {0}")]
    DegenerateCalibrationRectangle(String),
    /// A width, height, radius or length is non-positive or not finite.
    #[error("invalid {name}: {value} (must be a positive finite number)")]
    InvalidDimension { name: &'static str, value: Real },
    /// A verification line could not be recorded.
    #[error("insufficient verification input: {0}")]
    InsufficientVerificationInput(String),
    /// A boundary action violates the notify/counter rules.
    #[error("invalid boundary action: {0}")]
    InvalidBoundaryAction(String),
    /// Too few points for the requested operation.
    #[error("need at least {needed} points, got {got}")]
    NotEnoughPoints { needed: usize, got: usize },
    /// A point or index is outside the valid range.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// A linear solver failed to produce a finite result.
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Result alias used by all library crates of the workspace.
pub type Result<T> = std::result::Result<T, RoiError>;

/// Check that `value` is a positive, finite number.
///
/// Used for real-world dimensions and for configuration radii.
pub fn ensure_positive(name: &'static str, value: Real) -> Result<Real> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RoiError::InvalidDimension { name, value })
    }
}
