//! Image-to-ground calibration from a physical rectangle of known size.
//!
//! The operator clicks the four corners of a real rectangle lying on the
//! ground plane and types its width and height in meters. The corners are
//! ordered once ([`order_points_once`]) into `[A, B, C, D]` and mapped to
//!
//! ```text
//! A -> (0, 0)   B -> (0, height)   C -> (width, height)   D -> (width, 0)
//! ```
//!
//! so A–D is the "width" side and A–B the "height" side. A [`Calibration`]
//! is a pure function of its [`Rectangle`]: any edit produces a new
//! rectangle and a fresh calibration.

use crate::{dlt_homography, order_points_once, Homography};
use log::debug;
use roiscope_core::{distance, ensure_positive, PointXY, Pt2, Real, Result, RoiError};
use serde::{Deserialize, Serialize};

/// Pixel lengths at or below this are treated as collapsed.
pub const MIN_PIXEL_EDGE: Real = 1e-6;

/// Four ordered image corners plus the real-world size they represent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    points: [Pt2; 4],
    width: Real,
    height: Real,
}

impl Rectangle {
    /// Build from raw clicks, ordering the corners exactly once.
    ///
    /// # Errors
    ///
    /// [`RoiError::InvalidDimension`] if `width` or `height` is not a
    /// positive finite number.
    pub fn new(raw_points: [Pt2; 4], width: Real, height: Real) -> Result<Self> {
        ensure_positive("width", width)?;
        ensure_positive("height", height)?;
        Ok(Self {
            points: order_points_once(&raw_points),
            width,
            height,
        })
    }

    /// Build from corners that are already in `[A, B, C, D]` order, e.g.
    /// when restoring a stored calibration. No reordering happens.
    pub fn from_ordered(points: [Pt2; 4], width: Real, height: Real) -> Result<Self> {
        ensure_positive("width", width)?;
        ensure_positive("height", height)?;
        Ok(Self {
            points,
            width,
            height,
        })
    }

    /// Same corners, new dimensions.
    pub fn with_dimensions(&self, width: Real, height: Real) -> Result<Self> {
        Self::from_ordered(self.points, width, height)
    }

    /// Same order and dimensions with corner `index` moved.
    pub fn with_point(&self, index: usize, point: Pt2) -> Result<Self> {
        if index >= 4 {
            return Err(RoiError::OutOfRange(format!("corner index {index}")));
        }
        let mut points = self.points;
        points[index] = point;
        Self::from_ordered(points, self.width, self.height)
    }

    pub fn points(&self) -> &[Pt2; 4] {
        &self.points
    }

    pub fn width(&self) -> Real {
        self.width
    }

    pub fn height(&self) -> Real {
        self.height
    }

    /// Real-world targets for `[A, B, C, D]`.
    pub fn target_points(&self) -> [Pt2; 4] {
        [
            Pt2::new(0.0, 0.0),
            Pt2::new(0.0, self.height),
            Pt2::new(self.width, self.height),
            Pt2::new(self.width, 0.0),
        ]
    }

    /// Pixel length of the width side (A–D).
    pub fn pixel_width(&self) -> Real {
        distance(&self.points[0], &self.points[3])
    }

    /// Pixel length of the height side (A–B).
    pub fn pixel_height(&self) -> Real {
        distance(&self.points[0], &self.points[1])
    }

    fn check_degenerate(&self) -> Result<()> {
        let (pw, ph) = (self.pixel_width(), self.pixel_height());
        if pw <= MIN_PIXEL_EDGE {
            return Err(RoiError::DegenerateCalibrationRectangle(
                "width side A-D has zero pixel length".into(),
            ));
        }
        if ph <= MIN_PIXEL_EDGE {
            return Err(RoiError::DegenerateCalibrationRectangle(
                "height side A-B has zero pixel length".into(),
            ));
        }

        // Any three collinear corners leave the homography undetermined.
        let p = &self.points;
        let scale = p
            .iter()
            .flat_map(|a| p.iter().map(move |b| distance(a, b)))
            .fold(0.0, Real::max);
        for skip in 0..4 {
            let tri: Vec<&Pt2> = (0..4).filter(|&i| i != skip).map(|i| &p[i]).collect();
            let cross = (tri[1] - tri[0]).perp(&(tri[2] - tri[0]));
            if cross.abs() <= 1e-9 * scale * scale {
                return Err(RoiError::DegenerateCalibrationRectangle(
                    "three corners are collinear".into(),
                ));
            }
        }
        Ok(())
    }
}

/// A solved calibration: the rectangle it came from, its homography and
/// the derived meters-per-pixel scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub rectangle: Rectangle,
    pub homography: Homography,
    pub meters_per_pixel: Real,
}

impl Calibration {
    /// Solve the homography and scale for `rectangle`.
    ///
    /// # Errors
    ///
    /// [`RoiError::DegenerateCalibrationRectangle`] for duplicate or
    /// collinear corners, [`RoiError::Numerical`] if the solver fails.
    pub fn compute(rectangle: &Rectangle) -> Result<Self> {
        if let Err(err) = rectangle.check_degenerate() {
            debug!("calibration rejected: {err}");
            return Err(err);
        }

        let homography = dlt_homography(rectangle.points(), &rectangle.target_points())?;

        let meters_per_pixel = 0.5
            * (rectangle.width() / rectangle.pixel_width()
                + rectangle.height() / rectangle.pixel_height());

        let cal = Self {
            rectangle: rectangle.clone(),
            homography,
            meters_per_pixel,
        };
        debug!(
            "calibrated {}x{} m rectangle: {:.6} m/px, corner residual {:.3e} m",
            rectangle.width(),
            rectangle.height(),
            meters_per_pixel,
            cal.reprojection_residual()
        );
        Ok(cal)
    }

    pub fn transform_point(&self, p: &Pt2) -> Option<Pt2> {
        self.homography.transform_point(p)
    }

    /// Ground-plane length in meters of the image segment `p1`–`p2`.
    pub fn real_world_distance(&self, p1: &Pt2, p2: &Pt2) -> Option<Real> {
        self.homography.transformed_distance(p1, p2)
    }

    /// Largest distance (meters) between a transformed corner and its target.
    pub fn reprojection_residual(&self) -> Real {
        self.rectangle
            .points()
            .iter()
            .zip(self.rectangle.target_points().iter())
            .map(|(p, t)| {
                self.transform_point(p)
                    .map(|q| distance(&q, t))
                    .unwrap_or(Real::INFINITY)
            })
            .fold(0.0, Real::max)
    }

    /// Outline of the calibrated rectangle mapped back to pixels, sampled
    /// with `divisions` segments per side, for drawing a metric grid.
    pub fn ground_grid(&self, divisions: usize) -> Option<Vec<(Pt2, Pt2)>> {
        let inv = self.homography.inverse()?;
        let divisions = divisions.max(1);
        let (w, h) = (self.rectangle.width(), self.rectangle.height());
        let mut lines = Vec::with_capacity(2 * (divisions + 1));
        for k in 0..=divisions {
            let s = k as Real / divisions as Real;
            lines.push((
                inv.transform_point(&Pt2::new(s * w, 0.0))?,
                inv.transform_point(&Pt2::new(s * w, h))?,
            ));
            lines.push((
                inv.transform_point(&Pt2::new(0.0, s * h))?,
                inv.transform_point(&Pt2::new(w, s * h))?,
            ));
        }
        Some(lines)
    }

    /// Persistence form of this calibration.
    pub fn to_record(&self) -> CalibrationRecord {
        let p = self.rectangle.points();
        CalibrationRecord {
            rectangle: RectangleRecord {
                points: [p[0].into(), p[1].into(), p[2].into(), p[3].into()],
                width: self.rectangle.width(),
                height: self.rectangle.height(),
            },
            homography_matrix: self.homography.to_rows(),
            meters_per_pixel: self.meters_per_pixel,
        }
    }
}

/// Order four raw clicks and solve the calibration in one step.
pub fn calibrate(raw_points: [Pt2; 4], width: Real, height: Real) -> Result<Calibration> {
    let rectangle = Rectangle::new(raw_points, width, height)?;
    Calibration::compute(&rectangle)
}

/// Rectangle part of a [`CalibrationRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleRecord {
    /// Ordered corners `[A, B, C, D]` in raw pixel coordinates.
    pub points: [PointXY; 4],
    pub width: Real,
    pub height: Real,
}

/// Opaque calibration blob attached to a camera record.
///
/// Stored as-is and fed back for verification without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub rectangle: RectangleRecord,
    pub homography_matrix: [[Real; 3]; 3],
    pub meters_per_pixel: Real,
}

impl CalibrationRecord {
    /// The stored homography, used directly.
    pub fn homography(&self) -> Homography {
        Homography::from_rows(self.homography_matrix)
    }

    /// The stored rectangle, keeping its corner order.
    pub fn rectangle(&self) -> Result<Rectangle> {
        let p = &self.rectangle.points;
        Rectangle::from_ordered(
            [p[0].into(), p[1].into(), p[2].into(), p[3].into()],
            self.rectangle.width,
            self.rectangle.height,
        )
    }

    /// Rebuild the in-memory calibration from the stored values.
    pub fn to_calibration(&self) -> Result<Calibration> {
        let homography = self.homography();
        if !homography.is_finite() {
            return Err(RoiError::Numerical("stored homography is not finite".into()));
        }
        ensure_positive("meters_per_pixel", self.meters_per_pixel)?;
        Ok(Calibration {
            rectangle: self.rectangle()?,
            homography,
            meters_per_pixel: self.meters_per_pixel,
        })
    }
}
