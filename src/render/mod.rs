//! The rendering pipeline: sphere tracer, shared pixel buffer, tile
//! layout, and the worker-pool scheduler.

pub mod buffer;
pub mod scheduler;
pub mod tile;
pub mod trace;

pub use buffer::PixelBuffer;
pub use scheduler::Renderer;
pub use tile::Tile;

// ── Tunable constants ──

/// Surface threshold and minimum ray step.
pub const MIN_STEP: f32 = 1e-4;

/// Maximum ray travel distance.
pub const MAX_LENGTH: f32 = 60.0;

/// Origin bias for shadow and reflection rays, lifting them clear of the
/// surface they start on.
pub const SECONDARY_OFFSET: f32 = 10.0 * MIN_STEP;

/// Maximum sphere-tracing iterations per ray.
pub const STEP_LIMIT: u32 = 200;

/// Tiles per worker. Debug builds cut tiles much finer so preview updates
/// stay frequent despite the slower per-pixel cost.
#[cfg(debug_assertions)]
pub const JOB_CORE_MULTIPLIER: usize = 50;
#[cfg(not(debug_assertions))]
pub const JOB_CORE_MULTIPLIER: usize = 5;

/// Pixel stride inside a tile. Values above 1 render every Nth pixel and
/// flood the rest of the block, giving a coarse preview.
pub const INITIAL_STEP_SIZE: u32 = 1;

/// Primary-ray recursion cap; depth 0 shades black.
pub const MAX_REFLECTION_DEPTH: u32 = 4;

/// Soft-shadow penumbra sharpness for point lights.
pub const SHADOW_PENUMBRA_K: f32 = 24.0;

/// When on, a worker floods each tile with a marker tint before tracing
/// it, making tile pickup and raster order visible in the preview.
pub const SHOW_RENDER_PROGRESS: bool = false;

/// Marker tint used by [`SHOW_RENDER_PROGRESS`].
pub const PROGRESS_TINT: crate::math::Color = crate::math::Color::new(0.35, 0.35, 0.35);

/// Near-miss threshold for the object-outline visualization.
pub const OUTLINE_WIDTH: f32 = 0.05;
