//! Affine 3×4 transform with a cached inverse.
//!
//! Objects and materials evaluate points in local space, so the inverse is
//! on the hot path while the forward matrix is rarely touched after setup.
//! The inverse is recomputed on every assignment of the forward matrix and
//! never lazily, which keeps reads lock- and branch-free.

use glam::{Affine3A, Vec3};

/// Determinant magnitude below which a matrix is treated as singular.
const MIN_DETERMINANT: f32 = 1e-5;

/// A 3×3 rotation/scale block plus a translation column, with the inverse
/// cached alongside.
///
/// A near-singular forward matrix gets an identity inverse instead of a
/// blow-up: the rendering goes visually wrong, not down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    forward: Affine3A,
    inverse: Affine3A,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        forward: Affine3A::IDENTITY,
        inverse: Affine3A::IDENTITY,
    };

    /// Wrap a forward matrix, computing and caching its inverse.
    pub fn from_affine(forward: Affine3A) -> Self {
        let mut t = Transform {
            forward,
            inverse: Affine3A::IDENTITY,
        };
        t.refresh_inverse();
        t
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_affine(Affine3A::from_translation(translation))
    }

    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_affine(Affine3A::from_scale(scale))
    }

    pub fn from_rotation_x(angle: f32) -> Self {
        Self::from_affine(Affine3A::from_rotation_x(angle))
    }

    pub fn from_rotation_y(angle: f32) -> Self {
        Self::from_affine(Affine3A::from_rotation_y(angle))
    }

    pub fn from_rotation_z(angle: f32) -> Self {
        Self::from_affine(Affine3A::from_rotation_z(angle))
    }

    /// Assign a new forward matrix. The cached inverse is refreshed
    /// immediately.
    pub fn set(&mut self, forward: Affine3A) {
        self.forward = forward;
        self.refresh_inverse();
    }

    /// `self` applied after `other` (column-vector convention).
    pub fn compose(&self, other: &Transform) -> Transform {
        Self::from_affine(self.forward * other.forward)
    }

    pub fn forward(&self) -> &Affine3A {
        &self.forward
    }

    pub fn inverse(&self) -> &Affine3A {
        &self.inverse
    }

    /// Forward-transform a point.
    #[inline]
    pub fn point(&self, p: Vec3) -> Vec3 {
        self.forward.transform_point3(p)
    }

    /// Forward-transform a direction (no translation).
    #[inline]
    pub fn direction(&self, d: Vec3) -> Vec3 {
        self.forward.transform_vector3(d)
    }

    /// Map a point into local space.
    #[inline]
    pub fn inv_point(&self, p: Vec3) -> Vec3 {
        self.inverse.transform_point3(p)
    }

    /// Map a direction into local space.
    #[inline]
    pub fn inv_direction(&self, d: Vec3) -> Vec3 {
        self.inverse.transform_vector3(d)
    }

    // ── Basis extraction ──

    pub fn x_axis(&self) -> Vec3 {
        self.forward.matrix3.x_axis.into()
    }

    pub fn y_axis(&self) -> Vec3 {
        self.forward.matrix3.y_axis.into()
    }

    pub fn z_axis(&self) -> Vec3 {
        self.forward.matrix3.z_axis.into()
    }

    pub fn translation(&self) -> Vec3 {
        self.forward.translation.into()
    }

    fn refresh_inverse(&mut self) {
        let det = self.forward.matrix3.determinant();
        if det.abs() < MIN_DETERMINANT {
            log::warn!("near-singular transform (det = {det:e}), inverse falls back to identity");
            self.inverse = Affine3A::IDENTITY;
        } else {
            self.inverse = self.forward.inverse();
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frobenius_distance(a: &Affine3A, b: &Affine3A) -> f32 {
        let ca = a.to_cols_array();
        let cb = b.to_cols_array();
        ca.iter()
            .zip(cb.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    #[test]
    fn inverse_times_forward_is_identity() {
        let t = Transform::from_affine(
            Affine3A::from_rotation_y(0.7)
                * Affine3A::from_scale(Vec3::new(2.0, 1.0, 0.5))
                * Affine3A::from_translation(Vec3::new(3.0, -1.0, 4.0)),
        );
        let product = *t.inverse() * *t.forward();
        assert!(frobenius_distance(&product, &Affine3A::IDENTITY) < 1e-5);
    }

    #[test]
    fn compose_with_inverse_is_identity() {
        let t = Transform::from_affine(
            Affine3A::from_rotation_x(1.1) * Affine3A::from_translation(Vec3::new(0.5, 2.0, -3.0)),
        );
        let inv = Transform::from_affine(*t.inverse());
        let composed = t.compose(&inv);
        assert!(frobenius_distance(composed.forward(), &Affine3A::IDENTITY) < 1e-5);
    }

    #[test]
    fn set_refreshes_cached_inverse() {
        let mut t = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        t.set(Affine3A::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        let p = t.inv_point(Vec3::new(0.0, 5.0, 0.0));
        assert!(p.length() < 1e-6);
    }

    #[test]
    fn set_then_read_round_trips() {
        let m = Affine3A::from_rotation_z(0.3) * Affine3A::from_translation(Vec3::splat(2.0));
        let mut t = Transform::IDENTITY;
        t.set(m);
        assert_eq!(*t.forward(), m);
    }

    #[test]
    fn degenerate_matrix_falls_back_to_identity_inverse() {
        let t = Transform::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(*t.inverse(), Affine3A::IDENTITY);
        // Points pass through the fallback untouched.
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.inv_point(p), p);
    }

    #[test]
    fn basis_extraction() {
        let t = Transform::from_translation(Vec3::new(7.0, 8.0, 9.0));
        assert_eq!(t.x_axis(), Vec3::X);
        assert_eq!(t.y_axis(), Vec3::Y);
        assert_eq!(t.z_axis(), Vec3::Z);
        assert_eq!(t.translation(), Vec3::new(7.0, 8.0, 9.0));
    }
}
