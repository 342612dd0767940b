//! Routing of raw pointer and keyboard events to the active session.

use crate::{
    CalibrationIntake, CaptureOptions, CaptureOutcome, MetricVerifier, PolygonCapture,
    VerifierOptions,
};
use log::debug;
use roiscope_core::{Pt2, Real, Result, RoiError};
use roiscope_linear::Calibration;
use serde::{Deserialize, Serialize};

/// Input from the UI layer, in natural-resolution pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "point")]
pub enum InputEvent {
    PointerClick(Pt2),
    PointerMove(Pt2),
    Escape,
}

/// Which session receives events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTool {
    #[default]
    Capture,
    Calibration,
    Verification,
}

/// What an event did, for the caller to render or report.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionFeedback {
    /// A click offered to the polygon capture.
    Capture(CaptureOutcome),
    /// Rubber-band check for the cursor position.
    Preview(CaptureOutcome),
    CornerPlaced { count: usize },
    LineStarted,
    /// Segment fixed; the caller should now ask for its actual length.
    LineCompleted { predicted_length: Real },
    LengthPreview { predicted_length: Real },
    /// Escape handled; `changed` is false when there was nothing to undo.
    Undone { changed: bool },
    Ignored,
    Rejected(RoiError),
}

/// Owns one session per tool and forwards events to the active one.
#[derive(Debug, Clone, Default)]
pub struct InteractionRouter {
    active: ActiveTool,
    capture: PolygonCapture,
    intake: CalibrationIntake,
    verifier: Option<MetricVerifier>,
    verifier_options: VerifierOptions,
}

impl InteractionRouter {
    pub fn new(capture: CaptureOptions, verifier: VerifierOptions) -> Self {
        Self {
            active: ActiveTool::Capture,
            capture: PolygonCapture::new(capture),
            intake: CalibrationIntake::new(),
            verifier: None,
            verifier_options: verifier,
        }
    }

    pub fn active(&self) -> ActiveTool {
        self.active
    }

    /// Switch tools. Verification needs a calibration to check.
    pub fn activate(&mut self, tool: ActiveTool) -> Result<()> {
        if tool == ActiveTool::Verification && self.verifier.is_none() {
            let calibration = self.intake.calibration().ok_or_else(|| {
                RoiError::InsufficientVerificationInput("no calibration to verify".into())
            })?;
            self.verifier = Some(MetricVerifier::for_calibration(
                calibration,
                self.verifier_options.clone(),
            ));
        }
        debug!("active tool: {:?}", tool);
        self.active = tool;
        Ok(())
    }

    pub fn capture(&self) -> &PolygonCapture {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut PolygonCapture {
        &mut self.capture
    }

    pub fn intake(&self) -> &CalibrationIntake {
        &self.intake
    }

    pub fn verifier(&self) -> Option<&MetricVerifier> {
        self.verifier.as_ref()
    }

    pub fn verifier_mut(&mut self) -> Option<&mut MetricVerifier> {
        self.verifier.as_mut()
    }

    /// Solve the calibration from the placed corners. A new calibration
    /// starts a fresh verification session.
    pub fn calibrate(&mut self, width: Real, height: Real) -> Result<&Calibration> {
        self.intake.calibrate(width, height)?;
        self.restart_verification()
    }

    /// Recompute with new real-world dimensions, keeping the corner order.
    pub fn set_dimensions(&mut self, width: Real, height: Real) -> Result<&Calibration> {
        self.intake.set_dimensions(width, height)?;
        self.restart_verification()
    }

    /// Recompute after dragging corner `index` to `point`.
    pub fn move_corner(&mut self, index: usize, point: Pt2) -> Result<&Calibration> {
        self.intake.move_corner(index, point)?;
        self.restart_verification()
    }

    /// Lines measured against the previous homography are dropped. An
    /// active verification tool continues on the new calibration.
    fn restart_verification(&mut self) -> Result<&Calibration> {
        let calibration = self
            .intake
            .calibration()
            .ok_or_else(|| RoiError::Numerical("calibration missing after solve".into()))?;
        self.verifier = (self.active == ActiveTool::Verification).then(|| {
            MetricVerifier::for_calibration(calibration, self.verifier_options.clone())
        });
        debug!("verification restarted for a new calibration");
        Ok(calibration)
    }

    /// Length entry for the last completed verification segment.
    pub fn submit_actual_length(&mut self, actual_length: Real) -> Result<Real> {
        let verifier = self.verifier.as_mut().ok_or_else(|| {
            RoiError::InsufficientVerificationInput("verification is not active".into())
        })?;
        Ok(verifier.submit_actual_length(actual_length)?.accuracy)
    }

    pub fn handle(&mut self, event: InputEvent) -> InteractionFeedback {
        match self.active {
            ActiveTool::Capture => self.handle_capture(event),
            ActiveTool::Calibration => self.handle_calibration(event),
            ActiveTool::Verification => self.handle_verification(event),
        }
    }

    fn handle_capture(&mut self, event: InputEvent) -> InteractionFeedback {
        match event {
            InputEvent::PointerClick(p) => InteractionFeedback::Capture(self.capture.add_point(p)),
            InputEvent::PointerMove(p) => InteractionFeedback::Preview(self.capture.preview(&p)),
            InputEvent::Escape => InteractionFeedback::Undone {
                changed: self.capture.undo_last(),
            },
        }
    }

    fn handle_calibration(&mut self, event: InputEvent) -> InteractionFeedback {
        match event {
            InputEvent::PointerClick(p) => match self.intake.add_corner(p) {
                Ok(count) => InteractionFeedback::CornerPlaced { count },
                Err(err) => InteractionFeedback::Rejected(err),
            },
            InputEvent::PointerMove(_) => InteractionFeedback::Ignored,
            InputEvent::Escape => InteractionFeedback::Undone {
                changed: self.intake.undo_last(),
            },
        }
    }

    fn handle_verification(&mut self, event: InputEvent) -> InteractionFeedback {
        let Some(verifier) = self.verifier.as_mut() else {
            return InteractionFeedback::Ignored;
        };
        match event {
            InputEvent::PointerClick(p) if verifier.pending_start().is_some() => {
                match verifier.complete_line(p) {
                    Ok(predicted_length) => InteractionFeedback::LineCompleted { predicted_length },
                    Err(err) => InteractionFeedback::Rejected(err),
                }
            }
            InputEvent::PointerClick(p) => match verifier.start_line(p) {
                Ok(()) => InteractionFeedback::LineStarted,
                Err(err) => InteractionFeedback::Rejected(err),
            },
            InputEvent::PointerMove(p) => match verifier.preview_length(&p) {
                Some(predicted_length) => InteractionFeedback::LengthPreview { predicted_length },
                None => InteractionFeedback::Ignored,
            },
            InputEvent::Escape => InteractionFeedback::Undone {
                changed: verifier.cancel_line(),
            },
        }
    }
}
