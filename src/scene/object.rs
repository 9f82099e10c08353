//! Renderable objects: SDF primitives and their CSG composites.
//!
//! Every object answers `distance` in its own local space; callers go
//! through `transformed_distance`, which maps the query point through the
//! cached inverse transform first. Composites own their children outright,
//! so the whole scene graph is a tree of values with no shared ownership.

use glam::Vec3;

use crate::math::{Color, Transform};
use crate::render::MIN_STEP;
use crate::scene::material::{Material, SurfaceInfo};

/// Caller-supplied distance field. Must be 1-Lipschitz (never change faster
/// than the Euclidean distance) or sphere tracing will overstep surfaces.
pub type DistanceFn = Box<dyn Fn(Vec3) -> f32 + Send + Sync>;

/// Out-of-range child index sentinel for [`CsgOp::Blend`].
const BLEND_FAR: f32 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CsgOp {
    /// `min` of the children.
    Union,
    /// `max` of the children.
    Intersection,
    /// First child minus all the rest.
    Difference,
    /// Union with creases rounded over a radius-like factor `k`.
    SmoothUnion { k: f32 },
    /// Interpolates between consecutive children; `floor(k)` and
    /// `floor(k) + 1` select the pair, `fract(k)` the mix. Assumes `k >= 0`;
    /// negative values are clamped.
    Blend { k: f32 },
}

pub enum Shape {
    Sphere { radius: f32 },
    Plane { normal: Vec3, height: f32 },
    Cube { half_extents: Vec3 },
    Custom(DistanceFn),
    Composite { op: CsgOp, children: Vec<RenderObject> },
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Sphere { radius } => f.debug_struct("Sphere").field("radius", radius).finish(),
            Shape::Plane { normal, height } => f
                .debug_struct("Plane")
                .field("normal", normal)
                .field("height", height)
                .finish(),
            Shape::Cube { half_extents } => f
                .debug_struct("Cube")
                .field("half_extents", half_extents)
                .finish(),
            Shape::Custom(_) => f.write_str("Custom(..)"),
            Shape::Composite { op, children } => f
                .debug_struct("Composite")
                .field("op", op)
                .field("children", children)
                .finish(),
        }
    }
}

/// A shape bound to a transform, an optional material, and its reflectance
/// parameters.
#[derive(Debug)]
pub struct RenderObject {
    shape: Shape,
    transform: Transform,
    material: Option<Material>,
    surface: SurfaceInfo,
}

impl RenderObject {
    fn from_shape(shape: Shape) -> Self {
        RenderObject {
            shape,
            transform: Transform::IDENTITY,
            material: None,
            surface: SurfaceInfo::default(),
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::from_shape(Shape::Sphere { radius })
    }

    /// Half-space boundary; `normal` is normalized here so the distance
    /// stays Euclidean.
    pub fn plane(normal: Vec3, height: f32) -> Self {
        Self::from_shape(Shape::Plane {
            normal: normal.normalize(),
            height,
        })
    }

    pub fn cube(half_extents: Vec3) -> Self {
        Self::from_shape(Shape::Cube { half_extents })
    }

    pub fn custom(f: impl Fn(Vec3) -> f32 + Send + Sync + 'static) -> Self {
        Self::from_shape(Shape::Custom(Box::new(f)))
    }

    pub fn union(children: Vec<RenderObject>) -> Self {
        Self::composite(CsgOp::Union, children)
    }

    pub fn intersection(children: Vec<RenderObject>) -> Self {
        Self::composite(CsgOp::Intersection, children)
    }

    pub fn difference(children: Vec<RenderObject>) -> Self {
        Self::composite(CsgOp::Difference, children)
    }

    pub fn smooth_union(k: f32, children: Vec<RenderObject>) -> Self {
        Self::composite(CsgOp::SmoothUnion { k }, children)
    }

    pub fn blend(k: f32, children: Vec<RenderObject>) -> Self {
        Self::composite(CsgOp::Blend { k: k.max(0.0) }, children)
    }

    pub fn composite(op: CsgOp, children: Vec<RenderObject>) -> Self {
        assert!(!children.is_empty(), "composite requires at least one child");
        Self::from_shape(Shape::Composite { op, children })
    }

    // ── Builder-style configuration ──

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Shorthand for a pure translation.
    pub fn translated(self, offset: Vec3) -> Self {
        self.with_transform(Transform::from_translation(offset))
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_surface(mut self, surface: SurfaceInfo) -> Self {
        self.surface = surface;
        self
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn surface(&self) -> SurfaceInfo {
        self.surface
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    // ── Distance evaluation ──

    /// Signed distance in object-local space: negative inside, positive
    /// outside, zero on the surface.
    pub fn distance(&self, p: Vec3) -> f32 {
        match &self.shape {
            Shape::Sphere { radius } => p.length() - radius,
            Shape::Plane { normal, height } => normal.dot(p) - height,
            Shape::Cube { half_extents } => {
                let d = p.abs() - *half_extents;
                d.max(Vec3::ZERO).length() + d.max_element().min(0.0)
            }
            Shape::Custom(f) => f(p),
            Shape::Composite { op, children } => composite_distance(*op, children, p),
        }
    }

    /// Signed distance seen from the parent space: applies the cached
    /// inverse transform, then evaluates locally.
    #[inline]
    pub fn transformed_distance(&self, p: Vec3) -> f32 {
        self.distance(self.transform.inv_point(p))
    }

    // ── Color evaluation ──

    /// Surface color at a parent-space point. Leaves sample their material
    /// (white when unbound); composites blend their children by proximity.
    /// A composite's own material binding is intentionally not consulted.
    pub fn color_at(&self, p: Vec3) -> Color {
        let local = self.transform.inv_point(p);
        match &self.shape {
            Shape::Composite { op, children } => composite_color(*op, children, local),
            _ => match &self.material {
                Some(m) => m.color_at(local),
                None => Color::WHITE,
            },
        }
    }
}

fn composite_distance(op: CsgOp, children: &[RenderObject], p: Vec3) -> f32 {
    let dist = |i: usize| children[i].transformed_distance(p);
    match op {
        CsgOp::Union => {
            let mut d = dist(0);
            for i in 1..children.len() {
                d = d.min(dist(i));
            }
            d
        }
        // Folded from the first child rather than seeded with 0, so the
        // interior signed distance survives when the point is inside every
        // child.
        CsgOp::Intersection => {
            let mut d = dist(0);
            for i in 1..children.len() {
                d = d.max(dist(i));
            }
            d
        }
        CsgOp::Difference => {
            let mut d = dist(0);
            for i in 1..children.len() {
                d = d.max(-dist(i));
            }
            d
        }
        CsgOp::SmoothUnion { k } => {
            let mut d = dist(0);
            for i in 1..children.len() {
                d = smooth_union_distance(d, dist(i), k);
            }
            d
        }
        CsgOp::Blend { k } => {
            let i = k.max(0.0).floor() as usize;
            let t = k.max(0.0) - i as f32;
            let lo = children.get(i).map_or(BLEND_FAR, |c| c.transformed_distance(p));
            let hi = children
                .get(i + 1)
                .map_or(BLEND_FAR, |c| c.transformed_distance(p));
            lo + (hi - lo) * t
        }
    }
}

/// `min(a, b)` with the crease between the two fields rounded off.
fn smooth_union_distance(a: f32, b: f32, k: f32) -> f32 {
    if k <= f32::EPSILON {
        return a.min(b);
    }
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * h * k / 6.0
}

fn composite_color(op: CsgOp, children: &[RenderObject], p: Vec3) -> Color {
    if let CsgOp::Blend { k } = op {
        // Blend mixes colors by the same index split as its distance.
        let i = (k.max(0.0).floor() as usize).min(children.len() - 1);
        let t = k.max(0.0) - k.max(0.0).floor();
        return match children.get(i + 1) {
            Some(hi) => children[i].color_at(p).lerp(hi.color_at(p), t),
            None => children[i].color_at(p),
        };
    }

    // Inverse-distance weighting: children near the sample dominate. A
    // child effectively on the surface short-circuits the whole blend.
    let mut acc = Color::BLACK;
    let mut total = 0.0;
    for child in children {
        let d = child.transformed_distance(p).abs();
        if d < 10.0 * MIN_STEP {
            return child.color_at(p);
        }
        let w = d.powf(0.9).recip();
        acc += child.color_at(p) * w;
        total += w;
    }
    acc * total.recip()
}
