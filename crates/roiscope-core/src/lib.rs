//! Core math and geometry primitives for `roiscope`.
//!
//! This crate provides the image-plane building blocks used by the other
//! crates in the workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, and friends),
//! - the geometry kernel (distances, centroids, orientation and
//!   segment-intersection predicates, ray casting),
//! - normalized `[0,1]` storage coordinates,
//! - closed ROI polygons and their letter-named edges,
//! - boundary actions attached to polygon edges,
//! - directional arrow placement for boundary visualization,
//! - the shared error taxonomy ([`RoiError`]).
//!
//! # Example
//!
//! ```
//! use roiscope_core::{arrow_placement, ArrowOptions, Direction, ImageSize, Polygon, Pt2};
//!
//! let polygon = Polygon::new(vec![
//!     Pt2::new(100.0, 100.0),
//!     Pt2::new(400.0, 100.0),
//!     Pt2::new(400.0, 300.0),
//!     Pt2::new(100.0, 300.0),
//! ])
//! .unwrap();
//! let size = ImageSize::new(1280, 720).unwrap();
//! let options = ArrowOptions::default();
//! let arrow = arrow_placement(&polygon, 0, Direction::Inward, size, &options).unwrap();
//! assert!(arrow.length > 0.0);
//! ```

/// Shared error taxonomy.
mod error;
/// Linear algebra type aliases and helpers.
mod math;

/// Directional arrow geometry for polygon edges.
pub mod arrow;
/// Boundary actions attached to edges.
pub mod boundary;
/// Normalized storage coordinates.
pub mod coords;
/// Pure geometric predicates and measurements.
pub mod geometry;
/// Closed ROI polygons and edge naming.
pub mod polygon;

pub use arrow::*;
pub use boundary::*;
pub use coords::*;
pub use error::*;
pub use geometry::*;
pub use math::*;
pub use polygon::*;
