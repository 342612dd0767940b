//! High-level entry crate for the `roiscope` toolbox.
//!
//! `roiscope` covers the image-plane work behind a camera monitoring
//! console: drawing ROI polygons without self-intersections, placing
//! inward/outward arrows on their edges, and calibrating a camera against
//! a rectangle of known size so pixel segments can be measured in meters.
//!
//! ## Sessions
//!
//! ```
//! use roiscope::prelude::*;
//!
//! let mut router = InteractionRouter::default();
//! router.activate(ActiveTool::Calibration).unwrap();
//! for (x, y) in [(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)] {
//!     router.handle(InputEvent::PointerClick(Pt2::new(x, y)));
//! }
//! let cal = router.calibrate(2.0, 2.0).unwrap();
//! let center = cal.transform_point(&Pt2::new(50.0, 50.0)).unwrap();
//! assert!((center.x - 1.0).abs() < 1e-6);
//! ```
//!
//! ## Functions
//!
//! The building blocks are available directly through [`core`], [`linear`]
//! and [`pipeline`].

/// Geometry kernel, polygons, boundary actions and arrow placement.
pub mod core {
    pub use roiscope_core::*;
}

/// Homography estimation and rectangle calibration.
pub mod linear {
    pub use roiscope_linear::*;
}

/// Interactive sessions, options and persistence records.
pub mod pipeline {
    pub use roiscope_pipeline::*;
}

/// Import with `use roiscope::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        arrow_placement, arrow_placements, ActionKind, ArrowOptions, ArrowPlacement,
        BoundaryAction, Direction, ImageSize, Polygon, Pt2, Real, RoiError,
    };
    pub use crate::linear::{calibrate, Calibration, CalibrationRecord, Homography, Rectangle};
    pub use crate::pipeline::{
        edge_config_records, ActiveTool, CalibrationIntake, CaptureOptions, CaptureOutcome,
        ConsoleOptions, InputEvent, InteractionFeedback, InteractionRouter, MetricVerifier,
        PolygonCapture, RoiRecord, VerifierOptions,
    };
}
