//! In-plane line helpers used by the convergence and pick queries.
//!
//! All segments live in the current view's pixel frame, so these only look
//! at the x/y components.

use slice_intersect_math::{Point3, Vec2};

fn xy(p: &Point3) -> Vec2 {
    Vec2::new(p.x, p.y)
}

fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Parametric intersection of segments `a0..a1` and `b0..b1`.
///
/// Returns `(u, v)` such that `a0 + u (a1 - a0) == b0 + v (b1 - b0)`, or
/// `None` when the segments are parallel (relative determinant below
/// `parallel_tolerance`) or the crossing lies outside either segment by more
/// than `segment_tolerance`.
pub fn segment_intersection(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    parallel_tolerance: f64,
    segment_tolerance: f64,
) -> Option<(f64, f64)> {
    let d1 = xy(a1) - xy(a0);
    let d2 = xy(b1) - xy(b0);
    let r = xy(b0) - xy(a0);

    let det = cross(&d1, &d2);
    let scale = d1.norm() * d2.norm();
    if scale == 0.0 || det.abs() <= parallel_tolerance * scale {
        return None;
    }

    let u = cross(&r, &d2) / det;
    let v = cross(&r, &d1) / det;

    let range = -segment_tolerance..=1.0 + segment_tolerance;
    if range.contains(&u) && range.contains(&v) {
        Some((u, v))
    } else {
        None
    }
}

/// Point on `a0..a1` at parameter `u`.
pub fn point_at(a0: &Point3, a1: &Point3, u: f64) -> Point3 {
    a0 + (a1 - a0) * u
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the distance to `a` when the line is degenerate.
pub fn distance_to_line(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let d = xy(b) - xy(a);
    let ap = xy(p) - xy(a);
    let len = d.norm();
    if len == 0.0 {
        return ap.norm();
    }
    cross(&d, &ap).abs() / len
}

/// Direction angle of the segment `a..b`, in radians.
pub fn tangent_angle(a: &Point3, b: &Point3) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}
