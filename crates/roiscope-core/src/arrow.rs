//! Directional arrow geometry for boundary visualization.
//!
//! For an edge of a closed polygon this module resolves which perpendicular
//! points away from the interior, turns an `inward`/`outward` request into a
//! single arrow angle, and places an arrow whose length never reaches the
//! opposite boundary.
//!
//! Everything here is recomputed from scratch on each call; no state is kept.

use crate::{
    distance, ensure_positive, ray_segment_distance, unit_from_angle, wrap_angle, Direction,
    EdgeRef, ImageSize, Polygon, Pt2, Real, Result, RoiError,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Tunables for arrow placement, all in natural-resolution pixels unless
/// stated otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowOptions {
    /// Step used to probe each perpendicular against the centroid.
    pub probe_distance_px: Real,
    /// Clearance assumed when a ray hits no other edge.
    pub fallback_clearance_px: Real,
    /// Base arrow length as a fraction of the bounding-box diagonal.
    pub length_fraction_of_diagonal: Real,
    pub min_length_px: Real,
    pub max_length_px: Real,
    /// Upper bound of arrow length relative to the clearance (0, 1].
    pub max_clearance_fraction: Real,
    /// Gap between edge and arrow for arrows drawn inside the polygon.
    pub inward_offset_px: Real,
    /// Gap between edge and arrow for arrows drawn outside the polygon.
    pub outward_offset_px: Real,
    /// Bounding-box to image ratio (both axes) above which outward arrows
    /// are drawn inside the polygon.
    pub full_frame_ratio: Real,
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self {
            probe_distance_px: 5.0,
            fallback_clearance_px: 100.0,
            length_fraction_of_diagonal: 0.08,
            min_length_px: 20.0,
            max_length_px: 80.0,
            max_clearance_fraction: 0.5,
            inward_offset_px: 12.0,
            outward_offset_px: 20.0,
            full_frame_ratio: 0.95,
        }
    }
}

impl ArrowOptions {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("probe_distance_px", self.probe_distance_px)?;
        ensure_positive("fallback_clearance_px", self.fallback_clearance_px)?;
        ensure_positive(
            "length_fraction_of_diagonal",
            self.length_fraction_of_diagonal,
        )?;
        ensure_positive("min_length_px", self.min_length_px)?;
        ensure_positive("max_length_px", self.max_length_px)?;
        ensure_positive("max_clearance_fraction", self.max_clearance_fraction)?;
        ensure_positive("full_frame_ratio", self.full_frame_ratio)?;
        if self.max_clearance_fraction > 1.0 {
            return Err(RoiError::InvalidDimension {
                name: "max_clearance_fraction",
                value: self.max_clearance_fraction,
            });
        }
        if self.min_length_px > self.max_length_px {
            return Err(RoiError::InvalidDimension {
                name: "min_length_px",
                value: self.min_length_px,
            });
        }
        if !(self.inward_offset_px >= 0.0 && self.outward_offset_px >= 0.0) {
            return Err(RoiError::InvalidDimension {
                name: "arrow offset",
                value: self.inward_offset_px.min(self.outward_offset_px),
            });
        }
        Ok(())
    }
}

/// Rendering geometry for one arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowPlacement {
    pub edge: EdgeRef,
    pub direction: Direction,
    /// Tail of the arrow.
    pub anchor: Pt2,
    /// Rotation in radians, in `(-π, π]`, measured in image coordinates.
    pub angle: Real,
    pub length: Real,
    /// Free distance from the edge midpoint along the side the arrow is drawn on.
    pub clearance: Real,
    /// Set when an outward arrow was drawn inside a full-frame polygon.
    pub pulled_inside: bool,
}

impl ArrowPlacement {
    /// Head of the arrow.
    pub fn tip(&self) -> Pt2 {
        self.anchor + unit_from_angle(self.angle) * self.length
    }

    pub fn angle_degrees(&self) -> Real {
        self.angle.to_degrees()
    }
}

fn midpoint(a: &Pt2, b: &Pt2) -> Pt2 {
    Pt2::from((a.coords + b.coords) * 0.5)
}

/// Angle of the perpendicular of edge `index` that points away from the
/// polygon centroid.
///
/// Each candidate (`edge angle ± 90°`) is probed a short step from the edge
/// midpoint; the one that moves away from the centroid is outward.
pub fn outward_angle(polygon: &Polygon, index: usize, probe_distance: Real) -> Result<Real> {
    let (a, b) = polygon.edge(index)?;
    let mid = midpoint(&a, &b);
    let edge_angle = (b.y - a.y).atan2(b.x - a.x);
    let centroid = polygon.centroid();

    let plus = edge_angle + FRAC_PI_2;
    let minus = edge_angle - FRAC_PI_2;
    let probe = mid + unit_from_angle(plus) * probe_distance;

    let outward = if distance(&probe, &centroid) > distance(&mid, &centroid) {
        plus
    } else {
        minus
    };
    Ok(wrap_angle(outward))
}

/// Single arrow angle for a direction on edge `index`.
pub fn arrow_angle(
    polygon: &Polygon,
    index: usize,
    direction: Direction,
    probe_distance: Real,
) -> Result<Real> {
    let outward = outward_angle(polygon, index, probe_distance)?;
    Ok(match direction {
        Direction::Outward => outward,
        Direction::Inward => wrap_angle(outward + PI),
    })
}

/// Distance from the midpoint of edge `index` to the nearest other edge
/// along `angle`, or `None` if the ray leaves the polygon without a hit.
pub fn clearance_along(polygon: &Polygon, index: usize, angle: Real) -> Result<Option<Real>> {
    let (a, b) = polygon.edge(index)?;
    let mid = midpoint(&a, &b);
    let nearest = polygon
        .edges()
        .filter(|(edge, _, _)| edge.index != index)
        .filter_map(|(edge, s, e)| {
            let hit = ray_segment_distance(&mid, angle, &s, &e);
            if let Some(d) = hit {
                trace!("edge {index} ray hits edge {} at {d:.2} px", edge.index);
            }
            hit
        })
        .min_by(|x, y| x.total_cmp(y));
    Ok(nearest)
}

fn is_full_frame(polygon: &Polygon, size: ImageSize, ratio: Real) -> bool {
    let bb = polygon.bounding_box();
    bb.width() >= ratio * size.width_f() && bb.height() >= ratio * size.height_f()
}

/// Place the arrow for `direction` on edge `index`.
///
/// The base length is a fraction of the bounding-box diagonal, clamped to
/// `[min_length_px, max_length_px]`, then capped at
/// `max_clearance_fraction` of the clearance so it stops short of the
/// opposite boundary. Inward arrows start `inward_offset_px` inside the
/// edge. Outward arrows start `outward_offset_px` outside it, unless the
/// polygon covers nearly the whole image; then they are drawn inside,
/// pointing at the edge.
pub fn arrow_placement(
    polygon: &Polygon,
    index: usize,
    direction: Direction,
    size: ImageSize,
    opts: &ArrowOptions,
) -> Result<ArrowPlacement> {
    let edge = polygon.edge_ref(index)?;
    let (a, b) = polygon.edge(index)?;
    let mid = midpoint(&a, &b);

    let outward = outward_angle(polygon, index, opts.probe_distance_px)?;
    let inward = wrap_angle(outward + PI);
    let angle = match direction {
        Direction::Outward => outward,
        Direction::Inward => inward,
    };

    let pulled_inside =
        direction == Direction::Outward && is_full_frame(polygon, size, opts.full_frame_ratio);
    // Side of the edge the arrow body occupies.
    let body_angle = if pulled_inside { inward } else { angle };

    let clearance = match clearance_along(polygon, index, body_angle)? {
        Some(d) => d,
        None => {
            debug!(
                "no edge hit from {} ({}), using fallback clearance {}",
                edge, direction, opts.fallback_clearance_px
            );
            opts.fallback_clearance_px
        }
    };

    let diagonal = polygon.bounding_box().diagonal();
    let base = (diagonal * opts.length_fraction_of_diagonal)
        .clamp(opts.min_length_px, opts.max_length_px);
    let length = base.min(clearance * opts.max_clearance_fraction);

    // Keeps offset + length within 3/4 of the clearance.
    let inner_gap = opts.inward_offset_px.min(clearance * 0.25);
    let body_dir = unit_from_angle(body_angle);

    let anchor = if pulled_inside {
        mid + body_dir * (inner_gap + length)
    } else {
        match direction {
            Direction::Inward => mid + body_dir * inner_gap,
            Direction::Outward => mid + body_dir * opts.outward_offset_px.min(clearance * 0.25),
        }
    };

    Ok(ArrowPlacement {
        edge,
        direction,
        anchor,
        angle,
        length,
        clearance,
        pulled_inside,
    })
}

/// Arrows for both directions of every edge, edge by edge.
pub fn arrow_placements(
    polygon: &Polygon,
    size: ImageSize,
    opts: &ArrowOptions,
) -> Result<Vec<ArrowPlacement>> {
    let mut out = Vec::with_capacity(polygon.len() * 2);
    for index in 0..polygon.len() {
        for direction in [Direction::Inward, Direction::Outward] {
            out.push(arrow_placement(polygon, index, direction, size, opts)?);
        }
    }
    Ok(out)
}
