//! Numerical helpers shared by the linear solvers.
//!
//! - **Hartley normalization** of 2D points for conditioning DLT systems.
//! - **Homogeneous least squares**: the unit vector `h` minimizing `‖A h‖`,
//!   taken from the SVD of `A`.
//!
//! The SVD backend is `nalgebra`; everything that needs it goes through
//! [`solve_homogeneous_least_squares`].

use nalgebra::{DMatrix, DVector};
use roiscope_core::{centroid, Mat3, Pt2, Result, RoiError};

/// Hartley normalization for 2D points.
///
/// Centers points at the origin and scales so that the mean distance from
/// the origin is `√2`.
///
/// Returns the normalized points and the 3×3 transform `T` with
/// `p_norm = T * p_homogeneous`, or `None` if the input is empty or all
/// points coincide.
///
/// Reference: Hartley & Zisserman, "Multiple View Geometry in Computer
/// Vision", 2nd ed., Algorithm 4.2.
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    let c = centroid(points)?;
    let mean_dist = points.iter().map(|p| (p - c).norm()).sum::<f64>() / points.len() as f64;
    if mean_dist <= f64::EPSILON {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    #[rustfmt::skip]
    let t = Mat3::new(
        s,   0.0, -s * c.x,
        0.0, s,   -s * c.y,
        0.0, 0.0, 1.0,
    );
    let normalized = points.iter().map(|p| Pt2::from((p - c) * s)).collect();
    Some((normalized, t))
}

/// Solve `A h = 0` in the least-squares sense with `‖h‖ = 1`.
///
/// Returns the right singular vector of `A` associated with the smallest
/// singular value. Systems with fewer rows than columns (e.g. the 8×9
/// four-point DLT) are zero-padded to square so the full right singular
/// basis is available.
///
/// # Errors
///
/// [`RoiError::Numerical`] if `A` is empty or the decomposition yields
/// non-finite values.
pub fn solve_homogeneous_least_squares(a: &DMatrix<f64>) -> Result<DVector<f64>> {
    if a.nrows() == 0 || a.ncols() == 0 {
        return Err(RoiError::Numerical("empty coefficient matrix".into()));
    }

    let work = if a.nrows() < a.ncols() {
        let mut padded = DMatrix::<f64>::zeros(a.ncols(), a.ncols());
        padded.view_mut((0, 0), (a.nrows(), a.ncols())).copy_from(a);
        padded
    } else {
        a.clone()
    };

    let svd = work.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| RoiError::Numerical("svd did not produce V^T".into()))?;
    let idx = svd.singular_values.imin();
    let h: DVector<f64> = v_t.row(idx).transpose();

    if h.iter().any(|v| !v.is_finite()) {
        return Err(RoiError::Numerical("svd produced non-finite values".into()));
    }
    Ok(h)
}
