//! Sphere tracing and shading.
//!
//! The tracer steps a ray by the scene's minimum signed distance at each
//! position, which converges to the surface in few iterations when every
//! distance function is 1-Lipschitz. Shadows reuse the same march while
//! tracking the tightest clearance-to-distance ratio seen, and reflections
//! recurse through `ray_color` with a bounded depth.

use glam::Vec3;

use crate::math::Color;
use crate::scene::{Ray, RenderObject, Scene};

use super::{
    MAX_LENGTH, MAX_REFLECTION_DEPTH, MIN_STEP, OUTLINE_WIDTH, SECONDARY_OFFSET, SHADOW_PENUMBRA_K,
    STEP_LIMIT,
};

/// Outcome of a primary march.
#[derive(Debug, Clone, Copy)]
pub struct March {
    pub hit: bool,
    /// Surface point on a hit; the ray end point on a miss.
    pub point: Vec3,
    /// Ray parameter at `point`.
    pub t: f32,
    /// Smallest scene distance seen along the ray; feeds the outline
    /// visualization on a miss.
    pub min_distance: f32,
}

/// Sphere-trace `ray` up to `max_length`.
pub fn march(scene: &Scene, ray: &Ray, max_length: f32) -> March {
    let mut t = MIN_STEP;
    let mut min_distance = f32::INFINITY;
    let mut steps = 0u32;

    while t < max_length {
        let p = ray.at(t);
        let d = scene.min_distance(p);
        if d < min_distance {
            min_distance = d;
        }
        if d.abs() < MIN_STEP || steps > STEP_LIMIT {
            return March {
                hit: true,
                point: p,
                t,
                min_distance,
            };
        }
        t += d;
        steps += 1;
    }

    March {
        hit: false,
        point: ray.at(max_length),
        t: max_length,
        min_distance,
    }
}

/// Soft-shadow march toward a light. Returns occlusion in [0, 1]: 0 fully
/// blocked, 1 fully lit, in between inside the penumbra.
pub fn shadow_march(scene: &Scene, ray: &Ray, max_length: f32, penumbra_k: f32) -> f32 {
    let mut shadow = 1.0f32;
    let mut t = 0.0f32;

    while t < max_length {
        let d = scene.min_distance(ray.at(t));
        if d < MIN_STEP {
            return 0.0;
        }
        // First iteration divides by t = 0; the ratio is +inf and the
        // min leaves the shadow untouched.
        shadow = shadow.min(penumbra_k * d / t);
        t += d;
    }

    shadow
}

/// Surface normal by central differences on the scene distance field.
pub fn surface_normal(scene: &Scene, p: Vec3) -> Vec3 {
    let e = 10.0 * MIN_STEP;
    Vec3::new(
        scene.min_distance(p + Vec3::X * e) - scene.min_distance(p - Vec3::X * e),
        scene.min_distance(p + Vec3::Y * e) - scene.min_distance(p - Vec3::Y * e),
        scene.min_distance(p + Vec3::Z * e) - scene.min_distance(p - Vec3::Z * e),
    )
    .normalize_or(Vec3::Y)
}

/// Evaluate a ray to a color. `depth` bounds reflection recursion; depth 0
/// shades black.
pub fn ray_color(scene: &Scene, ray: &Ray, depth: u32) -> Color {
    if depth == 0 {
        return Color::BLACK;
    }

    let result = march(scene, ray, MAX_LENGTH);
    if !result.hit {
        if scene.outline && result.min_distance < OUTLINE_WIDTH {
            let glow = 1.0 - (result.min_distance / OUTLINE_WIDTH).max(0.0);
            return scene.background.lerp(Color::WHITE, glow);
        }
        return scene.background;
    }

    match scene.nearest_object(result.point) {
        Some(obj) => shade(scene, obj, result.point, ray.dir, depth),
        None => scene.background,
    }
}

/// Full pipeline for one pixel: camera ray in, shaded color out.
pub fn pixel_color(scene: &Scene, x: u32, y: u32) -> Color {
    let ray = scene.camera.ray(x as f32, y as f32);
    ray_color(scene, &ray, MAX_REFLECTION_DEPTH)
}

/// Shade a primary hit on `obj`. `incoming` is assumed unit length
/// (primary rays are normalized at construction and reflections preserve
/// unit length).
fn shade(scene: &Scene, obj: &RenderObject, p: Vec3, incoming: Vec3, depth: u32) -> Color {
    let n = surface_normal(scene, p);
    let base = obj.color_at(p);
    let surface = obj.surface();
    let mut color = Color::BLACK;

    if surface.reflective() {
        let reflected_dir = incoming - n * (2.0 * incoming.dot(n));
        let reflected = Ray::new(p + n * SECONDARY_OFFSET, reflected_dir);
        let cr = ray_color(scene, &reflected, depth - 1);
        color += cr * base * surface.metallic + cr * surface.dielectric;
    }

    for light in scene.lights() {
        if !light.casts_shadow() {
            color += light.contribution(p, n) * base * surface.albedo;
            continue;
        }
        let to_light = light.position() - p;
        let distance = to_light.length();
        let shadow_ray = Ray::new(p + n * SECONDARY_OFFSET, to_light / distance);
        let shadow = shadow_march(scene, &shadow_ray, distance, SHADOW_PENUMBRA_K);
        if shadow > 0.0 {
            color += light.contribution(p, n) * base * surface.albedo * shadow;
        }
    }

    color
}
