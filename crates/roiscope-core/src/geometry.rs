//! Pure geometric predicates and measurements on image-plane points.
//!
//! All functions are stateless. Inputs are expected to be finite; slices
//! that must be non-empty return `Option` instead of panicking.
//!
//! The orientation convention is the classic computational-geometry one,
//! evaluated on raw coordinates. In image space (y pointing down) the
//! visual sense of "clockwise" is mirrored, which does not matter for the
//! intersection tests built on top of it.

use crate::{unit_from_angle, Pt2, Real, Vec2};
use serde::{Deserialize, Serialize};

/// Cross products with magnitude below this are treated as collinear.
pub const COLLINEAR_EPS: Real = 1e-9;

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Euclidean distance between two points.
pub fn distance(p1: &Pt2, p2: &Pt2) -> Real {
    (p2 - p1).norm()
}

/// Arithmetic mean of the points, or `None` for an empty slice.
pub fn centroid(points: &[Pt2]) -> Option<Pt2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as Real;
    let sum = points.iter().fold(Vec2::zeros(), |acc, p| acc + p.coords);
    Some(Pt2::from(sum / n))
}

/// Centroid rounded to integer pixels, for label placement.
pub fn rounded_centroid(points: &[Pt2]) -> Option<Pt2> {
    centroid(points).map(|c| Pt2::new(c.x.round(), c.y.round()))
}

/// Orientation of the triple `(p, q, r)` from the sign of `(q - p) × (r - q)`.
pub fn orientation(p: &Pt2, q: &Pt2, r: &Pt2) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val.abs() < COLLINEAR_EPS {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether `q` lies within the axis-aligned extent of segment `p`–`r`.
///
/// Only meaningful when the three points are collinear.
pub fn on_segment(p: &Pt2, q: &Pt2, r: &Pt2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

fn boxes_overlap(a1: &Pt2, a2: &Pt2, b1: &Pt2, b2: &Pt2) -> bool {
    a1.x.max(a2.x) >= b1.x.min(b2.x)
        && b1.x.max(b2.x) >= a1.x.min(a2.x)
        && a1.y.max(a2.y) >= b1.y.min(b2.y)
        && b1.y.max(b2.y) >= a1.y.min(a2.y)
}

/// Whether segments `a1`–`a2` and `b1`–`b2` share at least one point.
///
/// Touching endpoints and collinear overlaps count as intersections.
pub fn segments_intersect(a1: &Pt2, a2: &Pt2, b1: &Pt2, b2: &Pt2) -> bool {
    if !boxes_overlap(a1, a2, b1, b2) {
        return false;
    }

    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a1, b1, a2))
        || (o2 == Orientation::Collinear && on_segment(a1, b2, a2))
        || (o3 == Orientation::Collinear && on_segment(b1, a1, b2))
        || (o4 == Orientation::Collinear && on_segment(b1, a2, b2))
}

/// Distance along a ray from `origin` (direction `angle`, radians) to
/// segment `a`–`b`, if the ray hits it at a strictly positive distance.
///
/// Parallel rays never hit.
pub fn ray_segment_distance(origin: &Pt2, angle: Real, a: &Pt2, b: &Pt2) -> Option<Real> {
    let d = unit_from_angle(angle);
    let e = b - a;
    let denom = d.x * e.y - d.y * e.x;
    if denom.abs() < COLLINEAR_EPS {
        return None;
    }
    let w = a - origin;
    let t = (w.x * e.y - w.y * e.x) / denom;
    let u = (w.x * d.y - w.y * d.x) / denom;
    if t > COLLINEAR_EPS && (-COLLINEAR_EPS..=1.0 + COLLINEAR_EPS).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Pt2,
    pub max: Pt2,
}

impl BoundingBox {
    pub fn width(&self) -> Real {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Real {
        self.max.y - self.min.y
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> Real {
        self.width().hypot(self.height())
    }

    pub fn contains(&self, p: &Pt2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Bounding box of the points, or `None` for an empty slice.
pub fn bounding_box(points: &[Pt2]) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(BoundingBox { min, max })
}

/// Unsigned polygon area via the shoelace formula.
pub fn polygon_area(points: &[Pt2]) -> Real {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: Real = (0..n)
        .map(|i| {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum();
    twice.abs() * 0.5
}

/// Whether edges `i` and `j` of an `n`-gon share a vertex (or are the same edge).
pub fn edges_adjacent(i: usize, j: usize, n: usize) -> bool {
    i == j || (i + 1) % n == j || (j + 1) % n == i
}

/// Whether the closed polygon through `points` has no crossing non-adjacent edges.
pub fn is_simple(points: &[Pt2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (&points[i], &points[(i + 1) % n]);
        for j in (i + 1)..n {
            if edges_adjacent(i, j, n) {
                continue;
            }
            let (b1, b2) = (&points[j], &points[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn p(x: Real, y: Real) -> Pt2 {
        Pt2::new(x, y)
    }

    #[test]
    fn distance_is_euclidean() {
        assert!((distance(&p(0.0, 0.0), &p(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_square() {
        let c = centroid(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]).unwrap();
        assert_eq!(c, p(5.0, 5.0));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn rounded_centroid_rounds() {
        let c = rounded_centroid(&[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 2.0)]).unwrap();
        assert_eq!(c, p(0.0, 1.0));
    }

    #[test]
    fn orientation_classifies_turns() {
        assert_eq!(
            orientation(&p(0.0, 0.0), &p(1.0, 1.0), &p(2.0, 2.0)),
            Orientation::Collinear
        );
        // Raw-coordinate convention: a left turn with y pointing up.
        assert_eq!(
            orientation(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, -1.0)),
            Orientation::Clockwise
        );
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            &p(0.0, 0.0),
            &p(100.0, 100.0),
            &p(100.0, 0.0),
            &p(0.0, 100.0)
        ));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(
            &p(0.0, 0.0),
            &p(10.0, 0.0),
            &p(0.0, 5.0),
            &p(10.0, 5.0)
        ));
        // Bounding boxes overlap but the segments do not.
        assert!(!segments_intersect(
            &p(0.0, 0.0),
            &p(10.0, 10.0),
            &p(6.0, 4.0),
            &p(10.0, 0.0)
        ));
    }

    #[test]
    fn endpoint_on_other_segment_intersects() {
        assert!(segments_intersect(
            &p(0.0, 0.0),
            &p(10.0, 0.0),
            &p(5.0, 0.0),
            &p(5.0, 8.0)
        ));
    }

    #[test]
    fn collinear_overlap_and_gap() {
        assert!(segments_intersect(
            &p(0.0, 0.0),
            &p(10.0, 0.0),
            &p(5.0, 0.0),
            &p(15.0, 0.0)
        ));
        assert!(!segments_intersect(
            &p(0.0, 0.0),
            &p(4.0, 0.0),
            &p(5.0, 0.0),
            &p(15.0, 0.0)
        ));
    }

    #[test]
    fn ray_hits_segment_ahead_only() {
        let origin = p(0.0, 0.0);
        let (a, b) = (p(5.0, -1.0), p(5.0, 1.0));
        let d = ray_segment_distance(&origin, 0.0, &a, &b).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
        assert!(ray_segment_distance(&origin, PI, &a, &b).is_none());
        assert!(ray_segment_distance(&origin, FRAC_PI_2, &a, &b).is_none());
        // Parallel.
        let (c, e) = (p(1.0, 1.0), p(5.0, 1.0));
        assert!(ray_segment_distance(&origin, 0.0, &c, &e).is_none());
    }

    #[test]
    fn bounding_box_and_diagonal() {
        let bb = bounding_box(&[p(1.0, 2.0), p(4.0, 6.0), p(2.0, 3.0)]).unwrap();
        assert_eq!(bb.min, p(1.0, 2.0));
        assert_eq!(bb.max, p(4.0, 6.0));
        assert!((bb.diagonal() - 5.0).abs() < 1e-12);
        assert!(bb.contains(&p(2.0, 5.0)));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn shoelace_area() {
        let sq = [p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)];
        assert!((polygon_area(&sq) - 100.0).abs() < 1e-12);
        assert_eq!(polygon_area(&sq[..2]), 0.0);
    }

    #[test]
    fn simplicity_check() {
        let square = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0)];
        let bowtie = [p(0.0, 0.0), p(100.0, 100.0), p(100.0, 0.0), p(0.0, 100.0)];
        assert!(is_simple(&square));
        assert!(!is_simple(&bowtie));
    }

    #[test]
    fn non_adjacent_edges_of_simple_polygon_do_not_cross() {
        let pts = [
            p(0.0, 0.0),
            p(120.0, 10.0),
            p(150.0, 90.0),
            p(60.0, 60.0),
            p(10.0, 120.0),
        ];
        let n = pts.len();
        for i in 0..n {
            for j in 0..n {
                if edges_adjacent(i, j, n) {
                    continue;
                }
                assert!(!segments_intersect(
                    &pts[i],
                    &pts[(i + 1) % n],
                    &pts[j],
                    &pts[(j + 1) % n]
                ));
            }
        }
        assert!(is_simple(&pts));
    }
}
