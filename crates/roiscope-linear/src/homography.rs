//! Plane-to-plane homography estimation and application.
//!
//! The homography used for calibration maps **image pixels** to
//! **real-world ground-plane coordinates** (meters): `X ~ H x`.

use crate::math::{normalize_points_2d, solve_homogeneous_least_squares};
use nalgebra::DMatrix;
use roiscope_core::{from_homogeneous, to_homogeneous, Mat3, Pt2, Real, Result, RoiError};
use serde::{Deserialize, Serialize};

/// A 3×3 projective transform, normalized so `H[2,2] == 1` when that entry
/// is nonzero.
///
/// Serializes as a row-major `[[f64; 3]; 3]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[Real; 3]; 3]", into = "[[Real; 3]; 3]")]
pub struct Homography(Mat3);

impl Homography {
    /// Wrap a matrix, rescaling so the bottom-right entry is 1 if possible.
    pub fn from_matrix(m: Mat3) -> Self {
        let scale = m[(2, 2)];
        if scale.abs() > f64::EPSILON {
            Self(m / scale)
        } else {
            Self(m)
        }
    }

    pub fn identity() -> Self {
        Self(Mat3::identity())
    }

    pub fn matrix(&self) -> &Mat3 {
        &self.0
    }

    /// Row-major array form.
    pub fn to_rows(&self) -> [[Real; 3]; 3] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    pub fn from_rows(rows: [[Real; 3]; 3]) -> Self {
        Self::from_matrix(Mat3::new(
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ))
    }

    /// Apply the transform with perspective division.
    ///
    /// Returns `None` for points mapped to infinity (`w ≈ 0`).
    pub fn transform_point(&self, p: &Pt2) -> Option<Pt2> {
        from_homogeneous(&(self.0 * to_homogeneous(p)))
    }

    /// Distance between the images of two points.
    pub fn transformed_distance(&self, p1: &Pt2, p2: &Pt2) -> Option<Real> {
        let a = self.transform_point(p1)?;
        let b = self.transform_point(p2)?;
        Some((b - a).norm())
    }

    /// Inverse transform (ground plane back to pixels).
    pub fn inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self::from_matrix)
    }

    /// Map a real-world point back to pixels.
    pub fn inverse_transform(&self, p: &Pt2) -> Option<Pt2> {
        self.inverse()?.transform_point(p)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl From<[[Real; 3]; 3]> for Homography {
    fn from(rows: [[Real; 3]; 3]) -> Self {
        Homography::from_rows(rows)
    }
}

impl From<Homography> for [[Real; 3]; 3] {
    fn from(h: Homography) -> Self {
        h.to_rows()
    }
}

/// Map an image point through `h` (see [`Homography::transform_point`]).
pub fn transform_point(p: &Pt2, h: &Homography) -> Option<Pt2> {
    h.transform_point(p)
}

/// Real-world length of the image segment `p1`–`p2`.
pub fn real_world_distance(p1: &Pt2, p2: &Pt2, h: &Homography) -> Option<Real> {
    h.transformed_distance(p1, p2)
}

/// Estimate `H` such that `dst ~ H src` using the normalized DLT.
///
/// Builds the `2n × 9` coefficient matrix (an 8×9 system for the four-point
/// case) on Hartley-normalized points and takes its null vector from the
/// SVD, then undoes the normalization.
///
/// # Errors
///
/// - [`RoiError::NotEnoughPoints`] for fewer than 4 correspondences or
///   mismatched lengths.
/// - [`RoiError::Numerical`] for coincident points or a non-finite result.
pub fn dlt_homography(src: &[Pt2], dst: &[Pt2]) -> Result<Homography> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return Err(RoiError::NotEnoughPoints {
            needed: 4,
            got: n.min(dst.len()),
        });
    }

    let (src_n, t_src) = normalize_points_2d(src)
        .ok_or_else(|| RoiError::Numerical("degenerate source points".into()))?;
    let (dst_n, t_dst) = normalize_points_2d(dst)
        .ok_or_else(|| RoiError::Numerical("degenerate destination points".into()))?;

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for (i, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let ru = [-x, -y, -1.0, 0.0, 0.0, 0.0, u * x, u * y, u];
        let rv = [0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v];
        a.row_mut(2 * i).copy_from_slice(&ru);
        a.row_mut(2 * i + 1).copy_from_slice(&rv);
    }

    let h_vec = solve_homogeneous_least_squares(&a)?;
    let h_norm = Mat3::from_row_slice(h_vec.as_slice());

    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or_else(|| RoiError::Numerical("normalization transform not invertible".into()))?;
    let h = Homography::from_matrix(t_dst_inv * h_norm * t_src);
    if !h.is_finite() {
        return Err(RoiError::Numerical("homography has non-finite entries".into()));
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_homography() {
        let src = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
        ];
        let dst = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(2.0, 0.0),
            Pt2::new(2.0, 2.0),
            Pt2::new(0.0, 2.0),
        ];
        let h = dlt_homography(&src, &dst).unwrap();
        assert!((h.matrix()[(0, 0)] - 2.0).abs() < 1e-9);
        assert!((h.matrix()[(2, 2)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn recovers_projective_map() {
        let truth = Homography::from_rows([[1.2, 0.1, 5.0], [-0.05, 0.9, -3.0], [1e-3, 2e-3, 1.0]]);
        let src = vec![
            Pt2::new(10.0, 20.0),
            Pt2::new(300.0, 15.0),
            Pt2::new(320.0, 240.0),
            Pt2::new(5.0, 260.0),
            Pt2::new(150.0, 130.0),
        ];
        let dst: Vec<Pt2> = src.iter().map(|p| truth.transform_point(p).unwrap()).collect();
        let h = dlt_homography(&src, &dst).unwrap();
        for (r, row) in truth.to_rows().iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                assert!((h.matrix()[(r, c)] - v).abs() < 1e-8, "H[{r},{c}]");
            }
        }
    }

    #[test]
    fn too_few_points() {
        let pts = vec![Pt2::new(0.0, 0.0); 3];
        assert_eq!(
            dlt_homography(&pts, &pts),
            Err(RoiError::NotEnoughPoints { needed: 4, got: 3 })
        );
    }

    #[test]
    fn inverse_maps_back() {
        let h = Homography::from_rows([[2.0, 0.0, 1.0], [0.0, 3.0, -1.0], [0.0, 0.001, 1.0]]);
        let inv = h.inverse().unwrap();
        let p = Pt2::new(12.0, 34.0);
        let back = inv.transform_point(&h.transform_point(&p).unwrap()).unwrap();
        assert!((back - p).norm() < 1e-9);
        let again = h.inverse_transform(&h.transform_point(&p).unwrap()).unwrap();
        assert!((again - p).norm() < 1e-9);
    }

    #[test]
    fn serializes_as_nested_rows() {
        let h = Homography::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 1.0]]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "[[1.0,2.0,3.0],[4.0,5.0,6.0],[7.0,8.0,1.0]]");
        let back: Homography = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn from_rows_normalizes_bottom_right() {
        let h = Homography::from_rows([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]]);
        assert_eq!(h, Homography::identity());
        let z = Homography::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(z.matrix()[(2, 1)], 1.0);
    }
}
