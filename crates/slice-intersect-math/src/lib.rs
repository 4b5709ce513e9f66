#![warn(missing_docs)]

//! Math types for slice-plane intersection overlays.
//!
//! Aliases over nalgebra for the pixel and reference frames, the 4x4
//! view matrix type, and the merge tolerance used when clipping planes.

use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// Point in a view's pixel frame or in the reference frame.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D displacement.
pub type Vec3 = Vector3<f64>;

/// Homogeneous coordinates, `w = 1` for points.
pub type Vec4 = Vector4<f64>;

/// Picked location on a view, in pixels.
pub type Point2 = nalgebra::Point2<f64>;

/// In-plane displacement.
pub type Vec2 = Vector2<f64>;

/// Affine 4x4 matrix mapping one frame into another.
///
/// A view's pixel-to-reference matrix and its pose are both `Transform`s;
/// batch rotation left-multiplies poses by one.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Underlying homogeneous matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Leaves every point where it is.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Shift by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut matrix = Matrix4::identity();
        matrix[(0, 3)] = dx;
        matrix[(1, 3)] = dy;
        matrix[(2, 3)] = dz;
        Self { matrix }
    }

    /// Per-axis scale, e.g. pixel spacing.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz)),
        }
    }

    /// Right-handed rotation about +X, in radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation(Vec3::x(), angle)
    }

    /// Right-handed rotation about +Y, in radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation(Vec3::y(), angle)
    }

    /// Right-handed rotation about +Z, in radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation(Vec3::z(), angle)
    }

    fn rotation(axis: Vec3, angle: f64) -> Self {
        Self {
            matrix: Matrix4::new_rotation(axis * angle),
        }
    }

    /// `self * other`: `other` is applied first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Map a point, translation included.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Map a direction, translation ignored.
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix.transform_vector(v)
    }

    /// Length of the linear part of row `row`.
    ///
    /// On a reference-to-pixel matrix this is how many pixels one reference
    /// unit spans along that pixel axis.
    pub fn row_norm(&self, row: usize) -> f64 {
        self.matrix.fixed_view::<1, 3>(row, 0).norm()
    }

    /// `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Distance under which two plane crossings count as the same point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Merge distance in pixels.
    pub linear: f64,
}

impl Tolerance {
    /// One micro-pixel.
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// Whether `a` and `b` are closer than the merge distance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn test_translation_moves_points_not_directions() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        assert!(close(
            &t.apply_point(&Point3::new(1.0, 2.0, 3.0)),
            &Point3::new(11.0, 22.0, 33.0)
        ));
        assert!((t.apply_vec(&Vec3::x()) - Vec3::x()).norm() < 1e-12);
    }

    #[test]
    fn test_quarter_turns() {
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        assert!(close(
            &Transform::rotation_y(FRAC_PI_2).apply_point(&x),
            &Point3::new(0.0, 0.0, -1.0)
        ));
        assert!(close(
            &Transform::rotation_x(FRAC_PI_2).apply_point(&y),
            &Point3::new(0.0, 0.0, 1.0)
        ));
        assert!(close(&Transform::rotation_z(FRAC_PI_2).apply_point(&x), &y));
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        // (0,0,0) -> shift -> (1,0,0) -> scale -> (2,0,0)
        let shift = Transform::translation(1.0, 0.0, 0.0);
        let composed = Transform::scale(2.0, 2.0, 2.0).then(&shift);
        assert!(close(
            &composed.apply_point(&Point3::origin()),
            &Point3::new(2.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn test_inverse_round_trips_a_view_matrix() {
        let t = Transform::rotation_z(0.3)
            .then(&Transform::translation(1.0, 2.0, 3.0))
            .then(&Transform::scale(0.5, 0.5, 1.0));
        let p = Point3::new(5.0, 6.0, 7.0);
        assert!(close(&t.then(&t.inverse().unwrap()).apply_point(&p), &p));
    }

    #[test]
    fn test_flattened_matrix_has_no_inverse() {
        assert!(Transform::scale(1.0, 0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_row_norm_ignores_translation() {
        let t = Transform::translation(100.0, 0.0, 0.0)
            .then(&Transform::scale(0.5, 0.5, 0.5))
            .then(&Transform::rotation_z(0.7));
        assert!((t.row_norm(0) - 0.5).abs() < 1e-12);
        assert!((t.row_norm(1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_points_equal_within_merge_distance() {
        let tol = Tolerance::default();
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(tol.points_equal(&a, &Point3::new(1.0 + 1e-7, 2.0, 3.0)));
        assert!(!tol.points_equal(&a, &Point3::new(1.001, 2.0, 3.0)));
    }
}
