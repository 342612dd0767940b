//! Deterministic ordering of four clicked calibration corners.

use roiscope_core::{centroid, Pt2};

/// Order four corners rotationally about their centroid, starting at the
/// top-left-most one.
///
/// Points are sorted by polar angle around the centroid, then rotated so
/// the point with the smallest `x + y` comes first. The result is a
/// consistent rotational order `[A, B, C, D]`; it is not guaranteed to be
/// clockwise on screen.
///
/// The corners are put in lexicographic order before anything else, so the
/// centroid and every tie (equal angles, equal `x + y`) are resolved the
/// same way whatever order the clicks came in. Applying the function to its
/// own output therefore returns the same order.
pub fn order_points_once(points: &[Pt2; 4]) -> [Pt2; 4] {
    let mut sorted = *points;
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let c = centroid(&sorted).unwrap_or_else(Pt2::origin);

    let angle = |p: &Pt2| (p.y - c.y).atan2(p.x - c.x);
    sorted.sort_by(|a, b| angle(a).total_cmp(&angle(b)));

    let start = sorted
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.x + a.y).total_cmp(&(b.x + b.y)))
        .map(|(i, _)| i)
        .unwrap_or(0);

    sorted.rotate_left(start);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Pt2 {
        Pt2::new(x, y)
    }

    #[test]
    fn axis_aligned_square_starts_top_left() {
        let ordered = order_points_once(&[
            p(100.0, 100.0),
            p(0.0, 100.0),
            p(100.0, 0.0),
            p(0.0, 0.0),
        ]);
        assert_eq!(
            ordered,
            [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0)]
        );
    }

    #[test]
    fn click_order_does_not_matter() {
        let a = [
            p(10.0, 12.0),
            p(210.0, 30.0),
            p(190.0, 160.0),
            p(20.0, 140.0),
        ];
        let b = [a[2], a[0], a[3], a[1]];
        assert_eq!(order_points_once(&a), order_points_once(&b));
        let a = order_points_once(&a);
        assert_eq!(a[0], p(10.0, 12.0));
    }

    #[test]
    fn idempotent() {
        let quads = [
            [p(10.0, 12.0), p(210.0, 30.0), p(190.0, 60.0), p(20.0, 40.0)],
            [p(50.0, 30.0), p(30.0, 50.0), p(10.0, 30.0), p(30.0, 10.0)],
            [p(0.0, 0.0), p(0.0, 100.0), p(100.0, 100.0), p(100.0, 0.0)],
            // Two corners on the same ray from the centroid.
            [p(-1.0, -1.0), p(-3.0, -3.0), p(4.0, -1.0), p(0.0, 5.0)],
        ];
        for quad in &quads {
            let once = order_points_once(quad);
            assert_eq!(order_points_once(&once), once);
        }
    }

    #[test]
    fn equal_angles_resolve_independently_of_click_order() {
        let quad = [p(-1.0, -1.0), p(-3.0, -3.0), p(4.0, -1.0), p(0.0, 5.0)];
        let swapped = [quad[1], quad[0], quad[2], quad[3]];
        let expected = [p(-3.0, -3.0), p(-1.0, -1.0), p(4.0, -1.0), p(0.0, 5.0)];
        assert_eq!(order_points_once(&quad), expected);
        assert_eq!(order_points_once(&swapped), expected);
    }

    #[test]
    fn order_is_a_rotation_of_the_angular_cycle() {
        // A rotated diamond: consecutive entries are neighbours on the hull.
        let ordered = order_points_once(&[
            p(300.0, 100.0),
            p(100.0, 300.0),
            p(500.0, 300.0),
            p(300.0, 500.0),
        ]);
        // min(x + y) ties at 400 between (300, 100) and (100, 300); the
        // first in angular order wins.
        assert_eq!(ordered[0], p(300.0, 100.0));
        assert_eq!(ordered[1], p(500.0, 300.0));
        assert_eq!(ordered[2], p(300.0, 500.0));
        assert_eq!(ordered[3], p(100.0, 300.0));
    }
}
