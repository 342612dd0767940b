//! Accuracy verification of an existing calibration.
//!
//! The operator draws a few segments of known length on the ground plane;
//! each is measured through the calibration homography and compared with
//! the typed length. The verifier only reads the homography, so running a
//! verification can never alter the calibration it checks.

use log::debug;
use roiscope_core::{distance, Pt2, Real, Result, RoiError};
use roiscope_linear::{Calibration, CalibrationRecord, Homography};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierOptions {
    /// Completed lines kept per session.
    pub max_lines: usize,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self { max_lines: 3 }
    }
}

impl VerifierOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_lines == 0 {
            return Err(RoiError::InvalidDimension {
                name: "max_lines",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Ratio score in percent: `min / max * 100`, clamped to `[0, 100]`.
///
/// Symmetric in its arguments. Returns 0 when either length is not a
/// positive finite number.
pub fn accuracy(actual: Real, predicted: Real) -> Real {
    let (lo, hi) = if actual <= predicted {
        (actual, predicted)
    } else {
        (predicted, actual)
    };
    if !(lo.is_finite() && hi.is_finite()) || hi <= 0.0 || lo < 0.0 {
        return 0.0;
    }
    (lo / hi * 100.0).clamp(0.0, 100.0)
}

/// One measured segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationLine {
    pub start: Pt2,
    pub end: Pt2,
    /// Operator-entered length, meters.
    pub actual_length: Real,
    /// Length through the homography, meters.
    pub predicted_length: Real,
    /// Percent agreement, see [`accuracy`].
    pub accuracy: Real,
}

/// A drawn segment waiting for its actual length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingLine {
    pub start: Pt2,
    pub end: Pt2,
    pub predicted_length: Real,
}

/// Verification session bound to one homography.
#[derive(Debug, Clone)]
pub struct MetricVerifier {
    options: VerifierOptions,
    homography: Homography,
    start: Option<Pt2>,
    pending: Option<PendingLine>,
    lines: Vec<VerificationLine>,
}

impl MetricVerifier {
    pub fn new(homography: Homography, options: VerifierOptions) -> Self {
        Self {
            options,
            homography,
            start: None,
            pending: None,
            lines: Vec::new(),
        }
    }

    pub fn for_calibration(calibration: &Calibration, options: VerifierOptions) -> Self {
        Self::new(calibration.homography, options)
    }

    /// Verify a stored calibration blob as-is, without recomputing it.
    pub fn for_record(record: &CalibrationRecord, options: VerifierOptions) -> Result<Self> {
        let homography = record.homography();
        if !homography.is_finite() {
            return Err(RoiError::Numerical("stored homography is not finite".into()));
        }
        Ok(Self::new(homography, options))
    }

    pub fn homography(&self) -> &Homography {
        &self.homography
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.options.max_lines
    }

    /// First click of a new segment. Replaces any unfinished segment.
    pub fn start_line(&mut self, point: Pt2) -> Result<()> {
        if self.is_full() {
            return Err(RoiError::OutOfRange(format!(
                "at most {} verification lines per session",
                self.options.max_lines
            )));
        }
        self.pending = None;
        self.start = Some(point);
        Ok(())
    }

    /// Predicted length from the started point to `point`, for live
    /// feedback while the pointer moves.
    pub fn preview_length(&self, point: &Pt2) -> Option<Real> {
        let start = self.start?;
        self.homography.transformed_distance(&start, point)
    }

    /// Second click: fixes the segment and returns its predicted length.
    ///
    /// A rejected click leaves the started point in place.
    pub fn complete_line(&mut self, point: Pt2) -> Result<Real> {
        let start = self.start.ok_or_else(|| {
            RoiError::InsufficientVerificationInput("no verification line started".into())
        })?;
        if distance(&start, &point) <= f64::EPSILON {
            return Err(RoiError::InsufficientVerificationInput(
                "verification line has zero length".into(),
            ));
        }
        let predicted_length = self
            .homography
            .transformed_distance(&start, &point)
            .ok_or_else(|| RoiError::Numerical("segment maps to infinity".into()))?;
        self.pending = Some(PendingLine {
            start,
            end: point,
            predicted_length,
        });
        self.start = None;
        Ok(predicted_length)
    }

    /// Record the operator's length for the completed segment.
    ///
    /// A missing or non-positive length discards the segment.
    pub fn submit_actual_length(&mut self, actual_length: Real) -> Result<&VerificationLine> {
        let pending = self.pending.take().ok_or_else(|| {
            RoiError::InsufficientVerificationInput("no completed line awaiting a length".into())
        })?;
        if !(actual_length.is_finite() && actual_length > 0.0) {
            debug!("discarding line with actual length {actual_length}");
            return Err(RoiError::InsufficientVerificationInput(format!(
                "actual length must be a positive number, got {actual_length}"
            )));
        }
        let line = VerificationLine {
            start: pending.start,
            end: pending.end,
            actual_length,
            predicted_length: pending.predicted_length,
            accuracy: accuracy(actual_length, pending.predicted_length),
        };
        debug!(
            "verification line {}: predicted {:.3} m, actual {:.3} m, accuracy {:.1}%",
            self.lines.len() + 1,
            line.predicted_length,
            line.actual_length,
            line.accuracy
        );
        self.lines.push(line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Draw and submit a whole segment at once.
    pub fn add_line(
        &mut self,
        start: Pt2,
        end: Pt2,
        actual_length: Real,
    ) -> Result<&VerificationLine> {
        self.start_line(start)?;
        self.complete_line(end)?;
        self.submit_actual_length(actual_length)
    }

    /// Escape handling: drop the unfinished segment, if any.
    pub fn cancel_line(&mut self) -> bool {
        let had = self.start.is_some() || self.pending.is_some();
        self.start = None;
        self.pending = None;
        had
    }

    pub fn pending_start(&self) -> Option<&Pt2> {
        self.start.as_ref()
    }

    pub fn pending_line(&self) -> Option<&PendingLine> {
        self.pending.as_ref()
    }

    pub fn lines(&self) -> &[VerificationLine] {
        &self.lines
    }

    /// Mean accuracy of completed lines, `None` when there are none.
    pub fn aggregate_accuracy(&self) -> Option<Real> {
        if self.lines.is_empty() {
            return None;
        }
        let sum: Real = self.lines.iter().map(|l| l.accuracy).sum();
        Some(sum / self.lines.len() as Real)
    }

    /// Clear all lines. The homography is left untouched.
    pub fn reset(&mut self) {
        self.start = None;
        self.pending = None;
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roiscope_linear::calibrate;

    fn square_verifier() -> MetricVerifier {
        let cal = calibrate(
            [
                Pt2::new(0.0, 0.0),
                Pt2::new(0.0, 100.0),
                Pt2::new(100.0, 100.0),
                Pt2::new(100.0, 0.0),
            ],
            2.0,
            2.0,
        )
        .unwrap();
        MetricVerifier::for_calibration(&cal, VerifierOptions::default())
    }

    #[test]
    fn accuracy_is_symmetric() {
        assert_eq!(accuracy(10.0, 9.0), accuracy(9.0, 10.0));
        assert!((accuracy(10.0, 9.0) - 90.0).abs() < 1e-12);
        assert_eq!(accuracy(5.0, 5.0), 100.0);
        assert_eq!(accuracy(0.0, 0.0), 0.0);
        assert_eq!(accuracy(Real::NAN, 1.0), 0.0);
    }

    #[test]
    fn two_clicks_then_length() {
        let mut v = square_verifier();
        v.start_line(Pt2::new(0.0, 0.0)).unwrap();
        let predicted = v.complete_line(Pt2::new(100.0, 0.0)).unwrap();
        assert!((predicted - 2.0).abs() < 1e-6);

        let line = v.submit_actual_length(2.5).unwrap();
        assert!((line.accuracy - 80.0).abs() < 1e-4);
        assert_eq!(v.lines().len(), 1);
        assert!((v.aggregate_accuracy().unwrap() - 80.0).abs() < 1e-4);
    }

    #[test]
    fn invalid_length_discards_line() {
        let mut v = square_verifier();
        v.start_line(Pt2::new(0.0, 0.0)).unwrap();
        v.complete_line(Pt2::new(0.0, 50.0)).unwrap();
        assert!(matches!(
            v.submit_actual_length(0.0),
            Err(RoiError::InsufficientVerificationInput(_))
        ));
        assert!(v.lines().is_empty());
        assert!(v.pending_line().is_none());
        assert!(v.submit_actual_length(1.0).is_err());
    }

    #[test]
    fn rejected_second_click_keeps_started_line() {
        let mut v = square_verifier();
        v.start_line(Pt2::new(10.0, 10.0)).unwrap();
        assert!(matches!(
            v.complete_line(Pt2::new(10.0, 10.0)),
            Err(RoiError::InsufficientVerificationInput(_))
        ));
        assert_eq!(v.pending_start(), Some(&Pt2::new(10.0, 10.0)));
        assert!(v.pending_line().is_none());

        let predicted = v.complete_line(Pt2::new(10.0, 60.0)).unwrap();
        assert!((predicted - 1.0).abs() < 1e-6);
        assert!(v.pending_start().is_none());
    }

    #[test]
    fn session_is_bounded_and_resettable() {
        let mut v = square_verifier();
        for x in [20.0, 40.0, 60.0] {
            v.add_line(Pt2::new(0.0, 0.0), Pt2::new(x, 0.0), x / 50.0)
                .unwrap();
        }
        assert!(v.is_full());
        assert!(v.start_line(Pt2::new(1.0, 1.0)).is_err());
        assert!((v.aggregate_accuracy().unwrap() - 100.0).abs() < 1e-4);

        let h = *v.homography();
        v.reset();
        assert!(v.aggregate_accuracy().is_none());
        assert_eq!(*v.homography(), h);
    }

    #[test]
    fn cancel_drops_unfinished_segment() {
        let mut v = square_verifier();
        assert!(!v.cancel_line());
        v.start_line(Pt2::new(0.0, 0.0)).unwrap();
        let preview = v.preview_length(&Pt2::new(0.0, 100.0)).unwrap();
        assert!((preview - 2.0).abs() < 1e-6);
        assert!(v.cancel_line());
        assert!(v.complete_line(Pt2::new(5.0, 5.0)).is_err());
    }

    #[test]
    fn stored_record_verifies_without_recompute() {
        let cal = square_verifier();
        let record = calibrate(
            [
                Pt2::new(0.0, 0.0),
                Pt2::new(0.0, 100.0),
                Pt2::new(100.0, 100.0),
                Pt2::new(100.0, 0.0),
            ],
            2.0,
            2.0,
        )
        .unwrap()
        .to_record();
        let mut v = MetricVerifier::for_record(&record, VerifierOptions::default()).unwrap();
        assert_eq!(v.homography(), cal.homography());
        let diagonal = 2.0 * 2f64.sqrt();
        let (a, c) = (Pt2::new(0.0, 0.0), Pt2::new(100.0, 100.0));
        let line = v.add_line(a, c, diagonal).unwrap();
        assert!(line.accuracy > 99.999);
    }
}
