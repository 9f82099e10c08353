//! Light sources and their radiance contribution at a shaded point.

use glam::Vec3;

use crate::math::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Flat fill, independent of geometry.
    Ambient { color: Color },
    /// Positional light with Lambert falloff. The only variant that casts
    /// shadows.
    Point { position: Vec3, color: Color },
    /// Parallel light; `direction` is the unit travel direction of the
    /// light.
    Directional { direction: Vec3, color: Color },
}

impl Light {
    pub fn ambient(color: Color) -> Self {
        Light::Ambient { color }
    }

    pub fn point(position: Vec3, color: Color) -> Self {
        Light::Point { position, color }
    }

    pub fn directional(direction: Vec3, color: Color) -> Self {
        Light::Directional {
            direction: direction.normalize(),
            color,
        }
    }

    /// Radiance arriving at `point` with surface normal `normal`, before
    /// any shadow attenuation.
    pub fn contribution(&self, point: Vec3, normal: Vec3) -> Color {
        match *self {
            Light::Ambient { color } => color,
            Light::Point { position, color } => {
                let angle = normal.dot((position - point).normalize());
                if angle <= 0.0 {
                    Color::BLACK
                } else {
                    color * angle
                }
            }
            Light::Directional { direction, color } => {
                let angle = normal.dot(-direction);
                if angle <= 0.0 {
                    Color::BLACK
                } else {
                    color * angle
                }
            }
        }
    }

    pub fn casts_shadow(&self) -> bool {
        matches!(self, Light::Point { .. })
    }

    /// Source position; the origin stands in for non-positional lights.
    pub fn position(&self) -> Vec3 {
        match *self {
            Light::Point { position, .. } => position,
            _ => Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_ignores_geometry() {
        let l = Light::ambient(Color::splat(0.5));
        let c = l.contribution(Vec3::new(3.0, -2.0, 1.0), Vec3::X);
        assert_eq!(c, Color::splat(0.5));
        assert!(!l.casts_shadow());
    }

    #[test]
    fn point_light_lambert_falloff() {
        let l = Light::point(Vec3::new(0.0, 5.0, 0.0), Color::WHITE);
        // Directly below the light, normal straight up: full contribution.
        let c = l.contribution(Vec3::ZERO, Vec3::Y);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!(l.casts_shadow());
    }

    #[test]
    fn light_behind_surface_is_black() {
        let l = Light::directional(Vec3::NEG_Y, Color::WHITE);
        // Light travels downward; a downward-facing normal sees nothing.
        let c = l.contribution(Vec3::ZERO, Vec3::NEG_Y);
        assert_eq!(c, Color::BLACK);
    }

    #[test]
    fn directional_light_scales_by_incidence() {
        let l = Light::directional(Vec3::new(0.0, -1.0, 0.0), Color::WHITE);
        let c = l.contribution(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!((c.g - 1.0).abs() < 1e-6);
        assert!(!l.casts_shadow());
    }

    #[test]
    fn non_positional_lights_report_origin() {
        assert_eq!(Light::ambient(Color::WHITE).position(), Vec3::ZERO);
        assert_eq!(
            Light::point(Vec3::splat(2.0), Color::WHITE).position(),
            Vec3::splat(2.0)
        );
    }
}
