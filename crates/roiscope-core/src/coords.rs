//! Conversion between natural-resolution pixels and normalized `[0,1]`
//! storage coordinates.
//!
//! Normalized values are rounded to 6 decimals and denormalized values to
//! the nearest integer pixel, so a round trip is lossy below one pixel.

use crate::{Pt2, Real, Result, RoiError};
use serde::{Deserialize, Serialize};

/// Decimal places kept for normalized coordinates.
pub const NORMALIZED_DECIMALS: i32 = 6;

/// Natural (unscaled) image resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Construct a size, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 {
            return Err(RoiError::InvalidDimension {
                name: "image width",
                value: 0.0,
            });
        }
        if height == 0 {
            return Err(RoiError::InvalidDimension {
                name: "image height",
                value: 0.0,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width_f(&self) -> Real {
        self.width as Real
    }

    pub fn height_f(&self) -> Real {
        self.height as Real
    }
}

/// A point serialized as `{ "x": .., "y": .. }`, the shape used by
/// persistence records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointXY {
    pub x: Real,
    pub y: Real,
}

impl From<Pt2> for PointXY {
    fn from(p: Pt2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointXY> for Pt2 {
    fn from(p: PointXY) -> Self {
        Pt2::new(p.x, p.y)
    }
}

fn round_to(value: Real, decimals: i32) -> Real {
    let f = 10f64.powi(decimals);
    (value * f).round() / f
}

/// Map a pixel point into `[0,1]²`, rounded to 6 decimals.
///
/// Points slightly outside the image (e.g. a click on the border) are
/// clamped so the stored value always satisfies `0 ≤ x, y ≤ 1`.
pub fn normalize(point: &Pt2, size: ImageSize) -> Pt2 {
    let x = round_to(point.x / size.width_f(), NORMALIZED_DECIMALS).clamp(0.0, 1.0);
    let y = round_to(point.y / size.height_f(), NORMALIZED_DECIMALS).clamp(0.0, 1.0);
    Pt2::new(x, y)
}

/// Map a normalized point back to integer pixels.
///
/// Returns [`RoiError::OutOfRange`] if the input is not in `[0,1]²`.
pub fn denormalize(point: &Pt2, size: ImageSize) -> Result<Pt2> {
    let in_unit = |v: Real| (0.0..=1.0).contains(&v);
    if !in_unit(point.x) || !in_unit(point.y) {
        return Err(RoiError::OutOfRange(format!(
            "normalized point ({}, {}) outside [0,1]",
            point.x, point.y
        )));
    }
    Ok(Pt2::new(
        (point.x * size.width_f()).round(),
        (point.y * size.height_f()).round(),
    ))
}

/// Normalize every vertex of a polygon.
pub fn normalize_polygon(points: &[Pt2], size: ImageSize) -> Vec<Pt2> {
    points.iter().map(|p| normalize(p, size)).collect()
}

/// Denormalize every vertex of a polygon.
pub fn denormalize_polygon(points: &[Pt2], size: ImageSize) -> Result<Vec<Pt2>> {
    points.iter().map(|p| denormalize(p, size)).collect()
}
