//! The scene: camera, objects, and lights under one owner.
//!
//! A scene is torn down and rebuilt whole on every frame advance: the
//! builder callback repopulates it from scratch for the new time value.
//! There is no incremental mutation while a frame is rendering.

pub mod camera;
pub mod light;
pub mod material;
pub mod object;

pub use camera::{Camera, Ray};
pub use light::Light;
pub use material::{Material, MaterialKind, SurfaceInfo};
pub use object::{CsgOp, RenderObject, Shape};

use glam::Vec3;

use crate::math::Color;

/// Per-frame scene population callback. Receives a cleared scene and the
/// monotonic frame time in seconds.
pub type SceneBuilder = Box<dyn Fn(&mut Scene, f32) + Send + Sync>;

/// Default color for rays that leave the scene.
pub const BACKGROUND_COLOR: Color = Color::new(0.2, 0.3, 0.4);

pub struct Scene {
    pub camera: Camera,
    objects: Vec<RenderObject>,
    lights: Vec<Light>,
    pub background: Color,
    /// Draw a glow where missed rays pass close to geometry.
    pub outline: bool,
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            camera: Camera::default(),
            objects: Vec::new(),
            lights: Vec::new(),
            background: BACKGROUND_COLOR,
            outline: false,
        }
    }

    /// Drop all objects and lights ahead of a rebuild. Camera and raster
    /// size survive; the builder overwrites them as needed.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.lights.clear();
        self.background = BACKGROUND_COLOR;
        self.outline = false;
    }

    pub fn add_object(&mut self, object: RenderObject) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn objects(&self) -> &[RenderObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.camera.set_size(width, height);
    }

    /// Minimum signed distance over all top-level objects; the field the
    /// sphere tracer marches through. Empty scenes read as infinitely far.
    pub fn min_distance(&self, p: Vec3) -> f32 {
        let mut min = f32::INFINITY;
        for obj in &self.objects {
            let d = obj.transformed_distance(p);
            if d < min {
                min = d;
            }
        }
        min
    }

    /// The object whose surface is closest to `p` in absolute distance;
    /// the tracer shades a hit with this object's material and surface.
    pub fn nearest_object(&self, p: Vec3) -> Option<&RenderObject> {
        let mut best: Option<(&RenderObject, f32)> = None;
        for obj in &self.objects {
            let d = obj.transformed_distance(p).abs();
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((obj, d));
            }
        }
        best.map(|(obj, _)| obj)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_is_infinitely_far() {
        let scene = Scene::new();
        assert_eq!(scene.min_distance(Vec3::ZERO), f32::INFINITY);
        assert!(scene.nearest_object(Vec3::ZERO).is_none());
    }

    #[test]
    fn min_distance_takes_the_closest_object() {
        let mut scene = Scene::new();
        scene.add_object(RenderObject::sphere(1.0));
        scene.add_object(RenderObject::sphere(1.0).translated(Vec3::new(10.0, 0.0, 0.0)));
        let d = scene.min_distance(Vec3::new(2.0, 0.0, 0.0));
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nearest_object_ranks_by_absolute_distance() {
        let mut scene = Scene::new();
        scene.add_object(
            RenderObject::sphere(1.0).with_material(Material::solid(Color::new(1.0, 0.0, 0.0))),
        );
        scene.add_object(
            RenderObject::sphere(1.0)
                .translated(Vec3::new(10.0, 0.0, 0.0))
                .with_material(Material::solid(Color::new(0.0, 0.0, 1.0))),
        );
        // A point buried inside the first sphere is "nearest" to it even
        // though its signed distance is negative.
        let p = Vec3::new(0.0, 0.9, 0.0);
        let obj = scene.nearest_object(p).unwrap();
        assert_eq!(obj.color_at(p), Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn clear_resets_contents_but_keeps_camera_size() {
        let mut scene = Scene::new();
        scene.set_size(320, 200);
        scene.add_object(RenderObject::sphere(1.0));
        scene.add_light(Light::ambient(Color::WHITE));
        scene.outline = true;
        scene.clear();
        assert!(scene.objects().is_empty());
        assert!(scene.lights().is_empty());
        assert!(!scene.outline);
        assert_eq!(scene.background, BACKGROUND_COLOR);
    }
}
