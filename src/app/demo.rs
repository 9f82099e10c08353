//! The showcase scene: an animated CSG playground that exercises every
//! primitive, combinator, material, and light the engine has.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{Affine3A, Vec3};

use tilemarch::math::{Color, Transform};
use tilemarch::scene::{Camera, Light, Material, RenderObject, Scene, SceneBuilder, SurfaceInfo};

/// Wrap the demo scene as a renderer builder. The outline flag is shared
/// with the UI and sampled on every rebuild.
pub fn demo_builder(outline: Arc<AtomicBool>) -> SceneBuilder {
    Box::new(move |scene, time| {
        build_demo_scene(scene, time, outline.load(Ordering::Relaxed));
    })
}

pub fn build_demo_scene(scene: &mut Scene, time: f32, outline: bool) {
    scene.outline = outline;

    // Slow orbit around the scene center.
    let orbit = time * 0.25;
    scene.camera = Camera::new(
        Vec3::new(orbit.sin() * 8.0, 3.5, orbit.cos() * 8.0),
        Vec3::new(0.0, 1.0, 0.0),
        1.05,
    );

    // Checkered floor with a faint mirror sheen.
    scene.add_object(
        RenderObject::plane(Vec3::Y, 0.0)
            .with_material(Material::checker(
                Color::new(0.85, 0.85, 0.9),
                Color::new(0.18, 0.2, 0.24),
            ))
            .with_surface(SurfaceInfo {
                albedo: 0.85,
                metallic: 0.0,
                dielectric: 0.12,
            }),
    );

    // Breathing blob: two spheres pulled apart and smooth-unioned.
    let spread = 0.45 + 0.35 * (time * 0.9).sin();
    scene.add_object(
        RenderObject::smooth_union(
            0.75,
            vec![
                RenderObject::sphere(0.9).translated(Vec3::new(-spread, 0.0, 0.0)),
                RenderObject::sphere(0.9).translated(Vec3::new(spread, 0.0, 0.0)),
            ],
        )
        .translated(Vec3::new(-2.6, 1.1, 0.0))
        .with_material(Material::gradient(
            Color::new(0.2, 0.8, 0.5),
            Color::new(0.1, 0.3, 0.6),
        )),
    );

    // Hollowed die: a spinning cube with a sphere carved out.
    scene.add_object(
        RenderObject::difference(vec![
            RenderObject::cube(Vec3::splat(0.9)),
            RenderObject::sphere(1.15),
        ])
        .with_transform(Transform::from_affine(
            Affine3A::from_translation(Vec3::new(2.6, 1.0, 0.0))
                * Affine3A::from_rotation_y(time * 0.6),
        ))
        .with_material(Material::solid(Color::new(0.85, 0.3, 0.25))),
    );

    // Morph: a sphere blending into a cube and back.
    let morph = 0.5 + 0.5 * (time * 0.7).sin();
    scene.add_object(
        RenderObject::blend(
            morph,
            vec![
                RenderObject::sphere(0.95)
                    .with_material(Material::solid(Color::new(0.9, 0.6, 0.15))),
                RenderObject::cube(Vec3::splat(0.75))
                    .with_material(Material::solid(Color::new(0.3, 0.45, 0.9))),
            ],
        )
        .translated(Vec3::new(0.0, 1.1, -2.8)),
    );

    // Mirror ball.
    scene.add_object(
        RenderObject::sphere(1.0)
            .translated(Vec3::new(0.0, 1.35, 0.6))
            .with_material(Material::solid(Color::new(1.0, 0.85, 0.55)))
            .with_surface(SurfaceInfo {
                albedo: 0.25,
                metallic: 0.75,
                dielectric: 0.1,
            }),
    );

    // A torus, written as a custom distance field.
    scene.add_object(
        RenderObject::custom(|p| {
            let ring = Vec3::new(p.x, 0.0, p.z).length() - 1.1;
            Vec3::new(ring, p.y, 0.0).length() - 0.35
        })
        .translated(Vec3::new(0.0, 0.35, 2.9))
        .with_material(Material::gradient(
            Color::new(0.75, 0.25, 0.75),
            Color::new(0.25, 0.1, 0.4),
        )),
    );

    scene.add_light(Light::ambient(Color::splat(0.16)));
    scene.add_light(Light::point(
        Vec3::new(3.0, 6.5, -2.5),
        Color::new(0.95, 0.92, 0.85),
    ));
    scene.add_light(Light::directional(
        Vec3::new(-0.35, -1.0, 0.25),
        Color::new(0.2, 0.22, 0.3),
    ));
}
