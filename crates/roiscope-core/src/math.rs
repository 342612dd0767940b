use nalgebra::{Matrix3, Point2, Vector2, Vector3};

/// Scalar type used throughout the workspace (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates (image pixels or plane meters).
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
///
/// Given a point `p = (x, y)`, returns the homogeneous vector `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// Returns `None` when `w` is (numerically) zero, i.e. the point lies at
/// infinity.
pub fn from_homogeneous(v: &Vec3) -> Option<Pt2> {
    if v.z.abs() <= Real::EPSILON {
        return None;
    }
    Some(Pt2::new(v.x / v.z, v.y / v.z))
}

/// Unit direction vector for an angle in radians.
pub fn unit_from_angle(angle: Real) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: Real) -> Real {
    use std::f64::consts::PI;
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn homogeneous_roundtrip() {
        let p = Pt2::new(3.5, -2.0);
        let back = from_homogeneous(&(to_homogeneous(&p) * 4.0)).unwrap();
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn point_at_infinity_is_none() {
        assert!(from_homogeneous(&Vec3::new(1.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
    }
}
