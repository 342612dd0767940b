//! Incremental ROI polygon capture.
//!
//! [`PolygonCapture`] consumes operator clicks one at a time and keeps the
//! open chain free of crossings. A click near the first vertex (once at
//! least three vertices exist) closes the polygon instead of appending.

use log::debug;
use roiscope_core::{
    distance, ensure_positive, segments_intersect, Polygon, Pt2, Real, Result, RoiError,
};
use serde::{Deserialize, Serialize};

/// Radii used by the capture guard, in natural-resolution pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// A click closer than this to any existing vertex is ignored.
    pub min_point_distance_px: Real,
    /// A click within this radius of the first vertex closes the polygon.
    pub closure_radius_px: Real,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            min_point_distance_px: 10.0,
            closure_radius_px: 15.0,
        }
    }
}

impl CaptureOptions {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("min_point_distance_px", self.min_point_distance_px)?;
        ensure_positive("closure_radius_px", self.closure_radius_px)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Empty,
    Drawing,
    Closed,
}

/// Why a click was not taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RejectReason {
    TooClose { min_distance: Real },
    SelfIntersecting,
    AlreadyClosed,
}

impl From<RejectReason> for RoiError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::TooClose { min_distance } => RoiError::PointTooClose { min_distance },
            RejectReason::SelfIntersecting => RoiError::SelfIntersectingPolygon,
            RejectReason::AlreadyClosed => RoiError::CaptureClosed,
        }
    }
}

/// Result of offering one click to the capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CaptureOutcome {
    Accepted,
    Closed,
    Rejected(RejectReason),
}

impl CaptureOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, CaptureOutcome::Rejected(_))
    }

    /// Turn a rejection into the matching [`RoiError`].
    pub fn into_result(self) -> Result<CaptureOutcome> {
        match self {
            CaptureOutcome::Rejected(reason) => Err(reason.into()),
            other => Ok(other),
        }
    }
}

/// Point-by-point polygon builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonCapture {
    options: CaptureOptions,
    points: Vec<Pt2>,
    closed: bool,
}

impl PolygonCapture {
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            points: Vec::new(),
            closed: false,
        }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    pub fn state(&self) -> CaptureState {
        if self.closed {
            CaptureState::Closed
        } else if self.points.is_empty() {
            CaptureState::Empty
        } else {
            CaptureState::Drawing
        }
    }

    /// Vertices captured so far. A closed polygon stores each vertex once.
    pub fn points(&self) -> &[Pt2] {
        &self.points
    }

    /// Whether `candidate` would close the polygon.
    fn closes(&self, candidate: &Pt2) -> bool {
        self.points.len() >= 3
            && distance(candidate, &self.points[0]) <= self.options.closure_radius_px
    }

    /// Whether segment `a`–`b` crosses chain edge `k` (vertex `k` to `k + 1`)
    /// for any `k` in `range`.
    fn crosses_chain(&self, a: &Pt2, b: &Pt2, mut range: std::ops::Range<usize>) -> bool {
        range.any(|k| segments_intersect(a, b, &self.points[k], &self.points[k + 1]))
    }

    /// What [`add_point`](Self::add_point) would do with `candidate`,
    /// without changing anything. Used for rubber-band feedback on pointer
    /// moves.
    pub fn evaluate(&self, candidate: &Pt2) -> CaptureOutcome {
        if self.closed {
            return CaptureOutcome::Rejected(RejectReason::AlreadyClosed);
        }
        let n = self.points.len();

        if self.closes(candidate) {
            // The closing edge runs from the last vertex to the first and
            // shares a vertex with chain edges 0 and n - 2.
            let (last, first) = (&self.points[n - 1], &self.points[0]);
            return if self.crosses_chain(last, first, 1..n - 2) {
                CaptureOutcome::Rejected(RejectReason::SelfIntersecting)
            } else {
                CaptureOutcome::Closed
            };
        }

        let min_distance = self.options.min_point_distance_px;
        if self
            .points
            .iter()
            .any(|p| distance(p, candidate) < min_distance)
        {
            return CaptureOutcome::Rejected(RejectReason::TooClose { min_distance });
        }

        // The new edge shares a vertex with the preceding chain edge only.
        if n >= 3 && self.crosses_chain(&self.points[n - 1], candidate, 0..n - 2) {
            return CaptureOutcome::Rejected(RejectReason::SelfIntersecting);
        }

        CaptureOutcome::Accepted
    }

    /// Alias of [`evaluate`](Self::evaluate) for pointer-move previews.
    pub fn preview(&self, cursor: &Pt2) -> CaptureOutcome {
        self.evaluate(cursor)
    }

    /// Offer one click. Rejected clicks leave the capture unchanged.
    pub fn add_point(&mut self, candidate: Pt2) -> CaptureOutcome {
        let outcome = self.evaluate(&candidate);
        match outcome {
            CaptureOutcome::Accepted => self.points.push(candidate),
            CaptureOutcome::Closed => {
                self.closed = true;
                debug!("polygon closed with {} vertices", self.points.len());
            }
            CaptureOutcome::Rejected(reason) => {
                debug!(
                    "rejected point ({:.1}, {:.1}): {:?}",
                    candidate.x, candidate.y, reason
                );
            }
        }
        outcome
    }

    /// Escape handling: reopen a closed polygon, otherwise drop the last
    /// vertex. Returns `false` when there was nothing to undo.
    pub fn undo_last(&mut self) -> bool {
        if self.closed {
            self.closed = false;
            true
        } else {
            self.points.pop().is_some()
        }
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// The finished polygon, once closed.
    pub fn finish(&self) -> Option<Polygon> {
        if !self.closed {
            return None;
        }
        match Polygon::new(self.points.clone()) {
            Ok(polygon) => Some(polygon),
            Err(err) => {
                debug!("closed capture does not form a valid polygon: {err}");
                None
            }
        }
    }
}
