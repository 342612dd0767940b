//! Four-click calibration intake.
//!
//! Collects the rectangle corners, then solves a [`Calibration`] once the
//! operator enters the real-world size. A failed solve never replaces the
//! previous calibration.

use log::debug;
use roiscope_core::{Pt2, Real, Result, RoiError};
use roiscope_linear::{Calibration, CalibrationRecord, Rectangle};

/// Corner collection plus the last successful calibration.
#[derive(Debug, Clone, Default)]
pub struct CalibrationIntake {
    corners: Vec<Pt2>,
    calibration: Option<Calibration>,
}

impl CalibrationIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a stored calibration, e.g. to verify or edit it.
    pub fn from_record(record: &CalibrationRecord) -> Result<Self> {
        Ok(Self {
            corners: Vec::new(),
            calibration: Some(record.to_calibration()?),
        })
    }

    /// Place the next corner. Returns how many corners are placed.
    pub fn add_corner(&mut self, point: Pt2) -> Result<usize> {
        if self.is_complete() {
            return Err(RoiError::OutOfRange(
                "all four calibration corners are already placed".into(),
            ));
        }
        self.corners.push(point);
        Ok(self.corners.len())
    }

    pub fn undo_last(&mut self) -> bool {
        self.corners.pop().is_some()
    }

    /// Drop the placed corners. The current calibration is kept until a new
    /// one succeeds.
    pub fn reset(&mut self) {
        self.corners.clear();
    }

    pub fn corners(&self) -> &[Pt2] {
        &self.corners
    }

    pub fn is_complete(&self) -> bool {
        self.corners.len() == 4
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    fn install(&mut self, rectangle: Rectangle) -> Result<&Calibration> {
        let calibration = Calibration::compute(&rectangle)?;
        Ok(&*self.calibration.insert(calibration))
    }

    /// Solve from the four placed corners and the entered size (meters).
    ///
    /// Dimensions are checked before anything else; corners are ordered
    /// once here and kept in that order for later edits.
    pub fn calibrate(&mut self, width: Real, height: Real) -> Result<&Calibration> {
        let corners: [Pt2; 4] = self.corners.as_slice().try_into().map_err(|_| {
            RoiError::NotEnoughPoints {
                needed: 4,
                got: self.corners.len(),
            }
        })?;
        let rectangle = Rectangle::new(corners, width, height)?;
        debug!("calibrating from corners {:?}", rectangle.points());
        self.install(rectangle)
    }

    fn current_rectangle(&self) -> Result<&Rectangle> {
        self.calibration
            .as_ref()
            .map(|c| &c.rectangle)
            .ok_or_else(|| RoiError::OutOfRange("no calibration to edit".into()))
    }

    /// Recompute with new dimensions, keeping the corner order.
    pub fn set_dimensions(&mut self, width: Real, height: Real) -> Result<&Calibration> {
        let rectangle = self.current_rectangle()?.with_dimensions(width, height)?;
        self.install(rectangle)
    }

    /// Recompute after dragging corner `index` to `point`.
    pub fn move_corner(&mut self, index: usize, point: Pt2) -> Result<&Calibration> {
        let rectangle = self.current_rectangle()?.with_point(index, point)?;
        self.install(rectangle)
    }
}
