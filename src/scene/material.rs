//! Surface appearance: procedural color patterns sampled in material-local
//! space, plus the reflectance knobs the shader reads.

use glam::{Affine3A, Vec3};

use crate::math::{Color, Transform};

/// Caller-supplied color function, sampled like any built-in pattern.
pub type ColorFn = Box<dyn Fn(Vec3) -> Color + Send + Sync>;

pub enum MaterialKind {
    Solid(Color),
    /// Alternating unit cells of the two colors.
    Checker(Color, Color),
    /// Color cycles with distance from the material origin.
    Gradient(Color, Color),
    Custom(ColorFn),
}

impl std::fmt::Debug for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            MaterialKind::Checker(a, b) => f.debug_tuple("Checker").field(a).field(b).finish(),
            MaterialKind::Gradient(a, b) => f.debug_tuple("Gradient").field(a).field(b).finish(),
            MaterialKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A color pattern with its own placement in space. Sampling maps the query
/// point through the material's inverse transform, so patterns can be
/// shifted, scaled, and rotated independently of the geometry they cover.
#[derive(Debug)]
pub struct Material {
    kind: MaterialKind,
    transform: Transform,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Material {
            kind: MaterialKind::Solid(color),
            transform: Transform::IDENTITY,
        }
    }

    pub fn checker(c0: Color, c1: Color) -> Self {
        Material {
            kind: MaterialKind::Checker(c0, c1),
            transform: Transform::IDENTITY,
        }
    }

    pub fn gradient(c0: Color, c1: Color) -> Self {
        Material {
            kind: MaterialKind::Gradient(c0, c1),
            transform: Transform::IDENTITY,
        }
    }

    pub fn custom(f: impl Fn(Vec3) -> Color + Send + Sync + 'static) -> Self {
        Material {
            kind: MaterialKind::Custom(Box::new(f)),
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn set_transform(&mut self, forward: Affine3A) {
        self.transform.set(forward);
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Sample the pattern at a point given in the space the material is
    /// placed in.
    pub fn color_at(&self, p: Vec3) -> Color {
        let local = self.transform.inv_point(p);
        match &self.kind {
            MaterialKind::Solid(c) => *c,
            MaterialKind::Checker(c0, c1) => {
                let parity = (local.x.floor() + local.y.floor() + local.z.floor()) as i64;
                if parity.rem_euclid(2) == 0 {
                    *c0
                } else {
                    *c1
                }
            }
            MaterialKind::Gradient(c0, c1) => c0.lerp(*c1, local.length().fract()),
            MaterialKind::Custom(f) => f(local),
        }
    }
}

/// Reflectance parameters read by the shader.
///
/// `metallic` tints reflections by the surface color; `dielectric` adds an
/// uncolored reflection on top. All three are expected in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    pub albedo: f32,
    pub metallic: f32,
    pub dielectric: f32,
}

impl Default for SurfaceInfo {
    fn default() -> Self {
        SurfaceInfo {
            albedo: 1.0,
            metallic: 0.0,
            dielectric: 0.0,
        }
    }
}

impl SurfaceInfo {
    pub fn reflective(&self) -> bool {
        self.metallic.abs() > f32::EPSILON || self.dielectric.abs() > f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(1.0, 0.0, 0.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    #[test]
    fn checker_alternates_per_unit_cell() {
        let m = Material::checker(RED, BLUE);
        assert_eq!(m.color_at(Vec3::new(0.5, 0.5, 0.5)), RED);
        assert_eq!(m.color_at(Vec3::new(1.5, 0.5, 0.5)), BLUE);
        assert_eq!(m.color_at(Vec3::new(1.5, 1.5, 0.5)), RED);
    }

    #[test]
    fn checker_parity_handles_negative_cells() {
        let m = Material::checker(RED, BLUE);
        assert_eq!(m.color_at(Vec3::new(-0.5, 0.5, 0.5)), BLUE);
        assert_eq!(m.color_at(Vec3::new(-1.5, 0.5, 0.5)), RED);
    }

    #[test]
    fn gradient_wraps_on_unit_magnitude() {
        let m = Material::gradient(RED, BLUE);
        assert_eq!(m.color_at(Vec3::ZERO), RED);
        let half = m.color_at(Vec3::new(0.5, 0.0, 0.0));
        assert!((half.b - 0.5).abs() < 1e-6);
        // Magnitude 1.25 wraps back to t = 0.25.
        let wrapped = m.color_at(Vec3::new(1.25, 0.0, 0.0));
        assert!((wrapped.b - 0.25).abs() < 1e-6);
    }

    #[test]
    fn material_transform_shifts_the_pattern() {
        let m = Material::checker(RED, BLUE)
            .with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        // The sample at x = 1.5 lands in the cell that was at x = 0.5.
        assert_eq!(m.color_at(Vec3::new(1.5, 0.5, 0.5)), RED);
    }

    #[test]
    fn custom_function_sees_local_space() {
        let m = Material::custom(|p| Color::new(p.x, p.y, p.z))
            .with_transform(Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        let c = m.color_at(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(c, Color::BLACK);
    }

    #[test]
    fn default_surface_is_matte() {
        let s = SurfaceInfo::default();
        assert_eq!(s.albedo, 1.0);
        assert!(!s.reflective());
    }
}
