//! Closed ROI polygons and their letter-named edges.

use crate::{
    bounding_box, centroid, is_simple, normalize_polygon, BoundingBox, ImageSize, Pt2, Result,
    RoiError,
};
use serde::{Deserialize, Serialize};

/// A finished, implicitly closed polygon with at least three vertices and
/// no crossing non-adjacent edges.
///
/// Polygons are never mutated after construction; editing an ROI means
/// capturing a new polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pt2>", into = "Vec<Pt2>")]
pub struct Polygon {
    points: Vec<Pt2>,
}

impl Polygon {
    /// Validate and wrap a vertex list.
    ///
    /// # Errors
    ///
    /// [`RoiError::NotEnoughPoints`] for fewer than 3 vertices and
    /// [`RoiError::SelfIntersectingPolygon`] if two non-adjacent edges cross.
    pub fn new(points: Vec<Pt2>) -> Result<Self> {
        if points.len() < 3 {
            return Err(RoiError::NotEnoughPoints {
                needed: 3,
                got: points.len(),
            });
        }
        if !is_simple(&points) {
            return Err(RoiError::SelfIntersectingPolygon);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Pt2] {
        &self.points
    }

    /// Number of vertices (equal to the number of edges).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact centroid (mean of the vertices).
    pub fn centroid(&self) -> Pt2 {
        // Non-empty by construction.
        centroid(&self.points).unwrap_or_else(Pt2::origin)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        bounding_box(&self.points).unwrap_or(BoundingBox {
            min: Pt2::origin(),
            max: Pt2::origin(),
        })
    }

    /// Endpoints of edge `index` (vertex `index` to vertex `index + 1 mod n`).
    pub fn edge(&self, index: usize) -> Result<(Pt2, Pt2)> {
        let n = self.points.len();
        if index >= n {
            return Err(RoiError::OutOfRange(format!(
                "edge index {index} for polygon with {n} edges"
            )));
        }
        Ok((self.points[index], self.points[(index + 1) % n]))
    }

    /// Named reference for edge `index`.
    pub fn edge_ref(&self, index: usize) -> Result<EdgeRef> {
        self.edge(index)?;
        Ok(EdgeRef::new(index, self.points.len()))
    }

    /// Iterate over all edges as `(reference, start, end)`.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeRef, Pt2, Pt2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| {
            let next = self.points[(i + 1) % n];
            (EdgeRef::new(i, n), self.points[i], next)
        })
    }

    /// Vertices mapped into normalized `[0,1]²` storage coordinates.
    pub fn normalized(&self, size: ImageSize) -> Vec<Pt2> {
        normalize_polygon(&self.points, size)
    }
}

impl TryFrom<Vec<Pt2>> for Polygon {
    type Error = RoiError;

    fn try_from(points: Vec<Pt2>) -> Result<Self> {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Pt2> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

/// Spreadsheet-style vertex label: `A`..`Z`, then `AA`, `AB`, ...
pub fn vertex_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Reference to one edge of an `n`-vertex polygon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    /// Index of the starting vertex.
    pub index: usize,
    pub start_label: String,
    pub end_label: String,
}

impl EdgeRef {
    pub fn new(index: usize, n: usize) -> Self {
        Self {
            index,
            start_label: vertex_label(index),
            end_label: vertex_label((index + 1) % n.max(1)),
        }
    }

    /// Boundary name such as `"A-B"`, or `"D-A"` for the closing edge of a quad.
    pub fn name(&self) -> String {
        format!("{}-{}", self.start_label, self.end_label)
    }
}

impl std::fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_label, self.end_label)
    }
}

/// Boundary name of edge `index` in an `n`-vertex polygon.
pub fn edge_name(index: usize, n: usize) -> String {
    EdgeRef::new(index, n).name()
}
