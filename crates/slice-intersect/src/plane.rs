//! Intersection of an infinite plane with a bounded rectangle.
//!
//! A view's pixel plane is finite, so the line where another view's plane
//! cuts it is clipped to the rectangle boundary. The rectangle is convex,
//! which means a cut crosses its boundary either zero times or exactly
//! twice; we just walk the four edges and keep the first two crossings.

use slice_intersect_math::{Point3, Tolerance, Vec3};

/// A parallelogram given by one corner and the two corners adjacent to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FiniteQuad {
    /// The corner both edges start from.
    pub origin: Point3,
    /// Corner at the end of the first edge.
    pub corner_x: Point3,
    /// Corner at the end of the second edge.
    pub corner_y: Point3,
}

impl FiniteQuad {
    /// Build a quad from its origin corner and the two adjacent corners.
    pub fn from_corners(origin: Point3, corner_x: Point3, corner_y: Point3) -> Self {
        Self {
            origin,
            corner_x,
            corner_y,
        }
    }

    /// Build a quad from its origin corner and two edge vectors.
    pub fn from_edges(origin: Point3, edge_x: Vec3, edge_y: Vec3) -> Self {
        Self {
            origin,
            corner_x: origin + edge_x,
            corner_y: origin + edge_y,
        }
    }

    /// Corner diagonally opposite the origin.
    pub fn opposite(&self) -> Point3 {
        self.corner_x + (self.corner_y - self.origin)
    }

    /// Boundary edges in scan order: origin to x corner, origin to y
    /// corner, opposite to y corner, opposite to x corner.
    pub fn edges(&self) -> [(Point3, Point3); 4] {
        let opposite = self.opposite();
        [
            (self.origin, self.corner_x),
            (self.origin, self.corner_y),
            (opposite, self.corner_y),
            (opposite, self.corner_x),
        ]
    }
}

/// Intersect the segment `p0..p1` with the plane through `origin` with
/// normal `normal`.
///
/// Returns `None` when the segment is parallel to the plane (including when
/// it lies inside it) or when the crossing falls outside the segment.
pub fn intersect_segment_with_plane(
    p0: &Point3,
    p1: &Point3,
    normal: &Vec3,
    origin: &Point3,
) -> Option<Point3> {
    let num = normal.dot(&(origin - p0));
    let den = normal.dot(&(p1 - p0));

    // Parallel, or degenerate relative to the distance being solved for
    if den.abs() <= (num * f64::EPSILON).abs() {
        return None;
    }

    let t = num / den;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(p0 + (p1 - p0) * t)
}

/// Intersect an infinite plane with a finite quad.
///
/// Returns the two boundary crossings, in edge scan order, or `None` when
/// the plane misses the quad or only touches it at a single point. A
/// crossing that coincides with the first one (the plane passing through a
/// corner shared by two edges) is counted once.
pub fn intersect_finite_plane(
    normal: &Vec3,
    origin: &Point3,
    quad: &FiniteQuad,
    tolerance: &Tolerance,
) -> Option<(Point3, Point3)> {
    let mut first: Option<Point3> = None;

    for (start, end) in quad.edges() {
        let Some(hit) = intersect_segment_with_plane(&start, &end, normal, origin) else {
            continue;
        };
        match first {
            None => first = Some(hit),
            Some(a) if tolerance.points_equal(&a, &hit) => {}
            Some(a) => return Some((a, hit)),
        }
    }

    None
}
