//! Interactive sessions for the ROI and calibration console.
//!
//! Each session is a plain state object driven by discrete input events:
//!
//! - [`PolygonCapture`]: click-by-click ROI polygon capture,
//! - [`CalibrationIntake`]: four-corner calibration entry,
//! - [`MetricVerifier`]: accuracy check of a calibration,
//! - [`InteractionRouter`]: forwards [`InputEvent`]s to the active one.
//!
//! [`edge_config_records`] and [`RoiRecord`] build the bodies handed to
//! the persistence layer.
//!
//! ```
//! use roiscope_core::Pt2;
//! use roiscope_pipeline::{CaptureOutcome, PolygonCapture};
//!
//! let mut capture = PolygonCapture::default();
//! for (x, y) in [(0.0, 0.0), (120.0, 0.0), (60.0, 90.0)] {
//!     assert_eq!(capture.add_point(Pt2::new(x, y)), CaptureOutcome::Accepted);
//! }
//! assert_eq!(capture.add_point(Pt2::new(3.0, 2.0)), CaptureOutcome::Closed);
//! assert_eq!(capture.finish().unwrap().len(), 3);
//! ```

mod capture;
mod config;
mod intake;
mod records;
mod router;
mod verify;

pub use capture::*;
pub use config::*;
pub use intake::*;
pub use records::*;
pub use router::*;
pub use verify::*;
