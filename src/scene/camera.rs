//! Pinhole camera: maps raster pixels to world-space rays.

use glam::Vec3;

/// A half-line through the scene. `dir` is unit length by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Ray { origin, dir }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Perspective camera with a precomputed orthonormal basis.
///
/// The basis and pixel scale are rebuilt whenever the viewpoint or the
/// raster size changes, never per ray.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    center: Vec3,
    look_at: Vec3,
    /// Field of view in radians.
    fov: f32,
    /// When set, `fov` spans the image vertically instead of horizontally.
    vertical_fov: bool,
    width: f32,
    height: f32,

    // Derived state
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    pixel_scale: f32,
}

impl Camera {
    pub fn new(center: Vec3, look_at: Vec3, fov: f32) -> Self {
        let mut cam = Camera {
            center,
            look_at,
            fov,
            vertical_fov: false,
            width: 1.0,
            height: 1.0,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            pixel_scale: 0.0,
        };
        cam.rebuild();
        cam
    }

    pub fn with_vertical_fov(mut self, vertical: bool) -> Self {
        self.vertical_fov = vertical;
        self.rebuild();
        self
    }

    pub fn set_view(&mut self, center: Vec3, look_at: Vec3) {
        self.center = center;
        self.look_at = look_at;
        self.rebuild();
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
        self.rebuild();
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// World-space ray through pixel (x, y), origin at the camera center.
    pub fn ray(&self, x: f32, y: f32) -> Ray {
        let dx = (x - self.width * 0.5) * self.pixel_scale;
        let dy = (y - self.height * 0.5) * self.pixel_scale;
        let dir = (self.forward + self.right * dx - self.up * dy).normalize();
        Ray::new(self.center, dir)
    }

    fn rebuild(&mut self) {
        let forward = (self.look_at - self.center).normalize_or(Vec3::Z);
        // Looking straight up or down degenerates the Y-up cross product.
        let world_up = if forward.dot(Vec3::Y).abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.right = forward.cross(world_up).normalize();
        self.up = self.right.cross(forward);
        self.forward = forward;

        let fov_scale = 2.0 * (self.fov * 0.5).tan();
        let span = if self.vertical_fov {
            self.height
        } else {
            self.width
        };
        self.pixel_scale = fov_scale / span.max(1.0);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_looks_forward() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 1.2);
        cam.set_size(100, 100);
        let ray = cam.ray(50.0, 50.0);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, -5.0));
        assert!((ray.dir - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn horizontal_offset_bends_right() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 1.2);
        cam.set_size(100, 100);
        let ray = cam.ray(75.0, 50.0);
        // Forward is +Z here, so screen-right maps to world -X.
        assert!(ray.dir.x < 0.0);
        assert!((ray.dir.length() - 1.0).abs() < 1e-6);
        assert!(ray.dir.y.abs() < 1e-6);
    }

    #[test]
    fn vertical_offset_bends_down() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 1.2);
        cam.set_size(100, 100);
        let ray = cam.ray(50.0, 75.0);
        assert!(ray.dir.y < 0.0);
    }

    #[test]
    fn vertical_fov_scales_by_height() {
        let mut horizontal = Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 1.2);
        horizontal.set_size(200, 100);
        let mut vertical = Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 1.2)
            .with_vertical_fov(true);
        vertical.set_size(200, 100);
        // Same fov over half the span doubles the per-pixel deflection.
        let h = horizontal.ray(101.0, 50.0).dir;
        let v = vertical.ray(101.0, 50.0).dir;
        assert!(v.x.abs() > h.x.abs() * 1.5);
    }

    #[test]
    fn straight_down_view_has_valid_basis() {
        let mut cam = Camera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, 1.2);
        cam.set_size(64, 64);
        let ray = cam.ray(32.0, 32.0);
        assert!(ray.dir.is_finite());
        assert!((ray.dir - Vec3::NEG_Y).length() < 1e-5);
    }
}
