//! Linear solvers for planar calibration.
//!
//! - [`solve_homogeneous_least_squares`]: null vector of `A h = 0` via SVD.
//! - [`dlt_homography`]: normalized Direct Linear Transform from ≥4
//!   correspondences.
//! - [`order_points_once`]: deterministic corner ordering for a clicked
//!   quadrilateral.
//! - [`Calibration`]: image-to-ground homography plus meters-per-pixel scale
//!   for a physical rectangle of known size.
//!
//! # Example
//!
//! ```
//! use roiscope_core::Pt2;
//! use roiscope_linear::calibrate;
//!
//! let corners = [
//!     Pt2::new(0.0, 0.0),
//!     Pt2::new(0.0, 100.0),
//!     Pt2::new(100.0, 100.0),
//!     Pt2::new(100.0, 0.0),
//! ];
//! let cal = calibrate(corners, 2.0, 2.0).unwrap();
//! let center = cal.transform_point(&Pt2::new(50.0, 50.0)).unwrap();
//! assert!((center.x - 1.0).abs() < 1e-6 && (center.y - 1.0).abs() < 1e-6);
//! ```

mod calibrator;
mod homography;
pub mod math;
mod ordering;

pub use calibrator::*;
pub use homography::*;
pub use math::solve_homogeneous_least_squares;
pub use ordering::*;
