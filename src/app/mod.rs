//! `ViewerApp`: the interactive viewer's state and frame driver.
//!
//! The egui event loop is the frame clock. Every GUI frame the app asks
//! the renderer whether the previous frame finished; if so it advances
//! scene time and enqueues the next one, then presents whatever is in the
//! pixel buffer, complete or not.

pub mod demo;
pub mod viewport;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use tilemarch::render::Renderer;

use crate::cli::CliArgs;

/// Longest renderable edge by default; the viewport upscales from there.
/// Full-window CPU marching is possible but not a good default.
pub const DEFAULT_MAX_EDGE: u32 = 480;

pub struct ViewerApp {
    pub renderer: Renderer,
    pub texture: Option<egui::TextureHandle>,
    /// Shared with the scene builder; toggling it takes effect on the
    /// next frame rebuild.
    pub outline: Arc<AtomicBool>,
    pub paused: bool,
    pub show_stats: bool,
    /// Longest edge of the render target in pixels.
    pub max_edge: u32,
    pub last_tick: Instant,
    /// Time accrued since the last scene rebuild; drains into `update`
    /// once the in-flight frame completes.
    pending_dt: f32,
    /// Wall-clock duration of the last completed frame.
    pub frame_time: f32,
    frame_started: Instant,
    frame_in_flight: bool,
    pub frames_completed: u64,
}

impl ViewerApp {
    pub fn new(args: &CliArgs) -> Self {
        let outline = Arc::new(AtomicBool::new(args.outline));
        let renderer = Renderer::new(demo::demo_builder(Arc::clone(&outline)));
        ViewerApp {
            renderer,
            texture: None,
            outline,
            paused: false,
            show_stats: true,
            max_edge: DEFAULT_MAX_EDGE,
            last_tick: Instant::now(),
            pending_dt: 0.0,
            frame_time: 0.0,
            frame_started: Instant::now(),
            frame_in_flight: false,
            frames_completed: 0,
        }
    }

    /// One tick of the steady-state loop: advance and re-enqueue when the
    /// previous frame is done, otherwise leave the workers alone and let
    /// the presenter show the partial buffer.
    pub fn drive_frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_tick).as_secs_f32();
        self.last_tick = now;
        if !self.paused {
            self.pending_dt += dt;
        }

        if !self.renderer.is_done() {
            return;
        }

        if self.frame_in_flight {
            self.frame_in_flight = false;
            self.frame_time = self.frame_started.elapsed().as_secs_f32();
            self.frames_completed += 1;
            log::debug!(
                "frame {} done in {:.1} ms",
                self.frames_completed,
                self.frame_time * 1000.0
            );
        }

        if self.paused {
            return;
        }

        self.renderer.update(self.pending_dt);
        self.pending_dt = 0.0;
        self.renderer.render_frame();
        self.frame_started = now;
        self.frame_in_flight = true;
    }
}
