//! The tiled frame scheduler.
//!
//! A fixed pool of worker threads (one per logical CPU) drains a tile
//! queue guarded by a single mutex; idle workers park on a condvar. The
//! driver thread owns the frame lifecycle: it may only advance time,
//! rebuild the scene, or enqueue a new tile list while every tile of the
//! previous frame is done, which is exactly the window in which no worker
//! reads the scene or writes the buffer. Cancellation retires un-popped
//! tiles in place and waits for in-flight tiles to finish; there is no
//! mid-tile interruption.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use crate::math::Color;
use crate::render::buffer::PixelBuffer;
use crate::render::tile::{layout_tiles, Tile};
use crate::render::{trace, INITIAL_STEP_SIZE, JOB_CORE_MULTIPLIER, PROGRESS_TINT, SHOW_RENDER_PROGRESS};
use crate::scene::{Scene, SceneBuilder, BACKGROUND_COLOR};

/// Tile queue for the frame currently in flight. The cursor is atomic for
/// cheap progress reads, but it only moves under the job mutex, which also
/// guards list swaps.
#[derive(Default)]
struct JobQueue {
    tiles: Vec<Arc<Tile>>,
    next: AtomicUsize,
}

impl JobQueue {
    fn pop(&self) -> Option<Arc<Tile>> {
        if self.next.load(Ordering::Relaxed) >= self.tiles.len() {
            return None;
        }
        let i = self.next.fetch_add(1, Ordering::AcqRel);
        self.tiles.get(i).cloned()
    }

    fn is_done(&self) -> bool {
        self.tiles.iter().all(|t| t.is_done())
    }
}

struct Shared {
    jobs: Mutex<JobQueue>,
    tiles_ready: Condvar,
    shutdown: AtomicBool,
    scene: RwLock<Scene>,
    buffer: PixelBuffer,
}

/// The renderer: worker pool, shared frame state, and the double-buffered
/// frame lifecycle consumed by the presentation layer.
pub struct Renderer {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    builder: SceneBuilder,
    worker_count: usize,
    time: f32,
}

impl Renderer {
    /// Spawn the worker pool and install the per-frame scene builder. The
    /// buffer starts empty; call [`Renderer::resize`] before rendering.
    pub fn new(builder: SceneBuilder) -> Self {
        let worker_count = thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4);

        let shared = Arc::new(Shared {
            jobs: Mutex::new(JobQueue::default()),
            tiles_ready: Condvar::new(),
            shutdown: AtomicBool::new(false),
            scene: RwLock::new(Scene::new()),
            buffer: PixelBuffer::new(0, 0, BACKGROUND_COLOR),
        });

        let workers = (0..worker_count)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("tilemarch-worker-{i}"))
                    .spawn(move || worker_loop(&shared, i))
                    .expect("failed to spawn render worker")
            })
            .collect();

        log::debug!("renderer up with {worker_count} workers");

        Renderer {
            shared,
            workers,
            builder,
            worker_count,
            time: 0.0,
        }
    }

    /// True when every tile of the current frame is finished (vacuously
    /// true before the first frame). Only in this state may the scene be
    /// rebuilt or a new frame enqueued.
    pub fn is_done(&self) -> bool {
        self.shared.jobs.lock().expect("job lock poisoned").is_done()
    }

    /// (completed, total) tiles of the current frame.
    pub fn progress(&self) -> (usize, usize) {
        let jobs = self.shared.jobs.lock().expect("job lock poisoned");
        let done = jobs.tiles.iter().filter(|t| t.is_done()).count();
        (done, jobs.tiles.len())
    }

    /// Advance time and rebuild the scene. No-op while a frame is in
    /// flight: the protocol forbids mutating the scene under the workers.
    pub fn update(&mut self, dt: f32) {
        if !self.is_done() {
            return;
        }
        self.time += dt;
        let mut scene = self.shared.scene.write().expect("scene lock poisoned");
        scene.clear();
        (self.builder)(&mut scene, self.time);
        scene.set_size(self.shared.buffer.width(), self.shared.buffer.height());
    }

    /// Enqueue the next frame: re-tile the buffer, reset the cursor, wake
    /// the pool. No-op while a frame is in flight or the buffer is empty.
    pub fn render_frame(&self) {
        if !self.is_done() {
            return;
        }
        let (w, h) = (self.shared.buffer.width(), self.shared.buffer.height());
        if w == 0 || h == 0 {
            return;
        }

        let tiles = layout_tiles(w, h, self.worker_count * JOB_CORE_MULTIPLIER);
        let count = tiles.len();
        {
            let mut jobs = self.shared.jobs.lock().expect("job lock poisoned");
            jobs.tiles = tiles;
            jobs.next.store(0, Ordering::Release);
        }
        self.shared.tiles_ready.notify_all();
        log::debug!("frame enqueued: {count} tiles at {w}x{h}, t = {:.3}s", self.time);
    }

    /// Abandon the in-flight frame. Un-popped tiles are retired without
    /// pixel work; tiles already being rendered run to completion. Returns
    /// once the pool is drained. Stale pixels stay in the buffer until the
    /// next frame overwrites them.
    pub fn cancel(&self) {
        {
            let jobs = self.shared.jobs.lock().expect("job lock poisoned");
            let total = jobs.tiles.len();
            let popped = jobs.next.swap(total, Ordering::AcqRel).min(total);
            for tile in &jobs.tiles[popped..] {
                tile.mark_done();
            }
        }
        while !self.is_done() {
            thread::yield_now();
        }
    }

    /// Adopt new output dimensions. Blocks until any in-flight frame is
    /// cancelled and drained, then reallocates the buffer on change. Zero
    /// dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if !self.is_done() {
            self.cancel();
        }
        if width != self.shared.buffer.width() || height != self.shared.buffer.height() {
            // Pool is drained here, which resize requires.
            self.shared.buffer.resize(width, height, BACKGROUND_COLOR);
            log::debug!("buffer resized to {width}x{height}");
        }
        self.shared
            .scene
            .write()
            .expect("scene lock poisoned")
            .set_size(width, height);
    }

    /// Monotonic frame time handed to the scene builder.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn width(&self) -> u32 {
        self.shared.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.shared.buffer.height()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// The shared pixel buffer, row-major from the top-left, unclamped.
    /// Reading while a frame is in flight shows the progressive preview.
    pub fn buffer(&self) -> &[Color] {
        self.shared.buffer.as_slice()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.tiles_ready.notify_all();
        for worker in self.workers.drain(..) {
            if let Err(panic) = worker.join() {
                // A worker panic is fatal; hand it to whoever owns us.
                std::panic::resume_unwind(panic);
            }
        }
    }
}

fn worker_loop(shared: &Shared, index: usize) {
    log::debug!("render worker {index} started");
    loop {
        let tile = {
            let mut jobs = shared.jobs.lock().expect("job lock poisoned");
            loop {
                if shared.shutdown.load(Ordering::Acquire) {
                    log::debug!("render worker {index} exiting");
                    return;
                }
                if let Some(tile) = jobs.pop() {
                    break tile;
                }
                jobs = shared
                    .tiles_ready
                    .wait(jobs)
                    .expect("job lock poisoned");
            }
        };

        // A cancel can retire a tile between queueing and pop.
        if tile.is_done() {
            continue;
        }

        let scene = shared.scene.read().expect("scene lock poisoned");
        render_tile(&scene, &shared.buffer, &tile);
        tile.mark_done();
    }
}

fn render_tile(scene: &Scene, buffer: &PixelBuffer, tile: &Tile) {
    if SHOW_RENDER_PROGRESS {
        for y in tile.min_y..tile.max_y {
            for x in tile.min_x..tile.max_x {
                buffer.write(x, y, PROGRESS_TINT);
            }
        }
    }

    let step = INITIAL_STEP_SIZE.max(1);
    let mut y = tile.min_y;
    while y < tile.max_y {
        let mut x = tile.min_x;
        while x < tile.max_x {
            let color = trace::pixel_color(scene, x, y);
            // Stride 1 writes the pixel itself; larger strides flood the
            // block for the coarse preview.
            for by in y..(y + step).min(tile.max_y) {
                for bx in x..(x + step).min(tile.max_x) {
                    buffer.write(bx, by, color);
                }
            }
            x += step;
        }
        y += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, Light, RenderObject};
    use glam::Vec3;
    use std::time::{Duration, Instant};

    fn ambient_sphere_builder() -> SceneBuilder {
        Box::new(|scene, _time| {
            scene.camera = Camera::new(
                Vec3::new(0.0, 0.0, -5.0),
                Vec3::ZERO,
                std::f32::consts::FRAC_PI_2,
            );
            scene.add_object(RenderObject::sphere(1.0));
            scene.add_light(Light::ambient(Color::splat(0.5)));
        })
    }

    fn wait_done(r: &Renderer) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while !r.is_done() {
            assert!(Instant::now() < deadline, "frame did not complete in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn fresh_renderer_is_done_and_empty() {
        let r = Renderer::new(ambient_sphere_builder());
        assert!(r.is_done());
        assert_eq!(r.buffer().len(), 0);
        // render_frame without a buffer is a no-op.
        r.render_frame();
        assert!(r.is_done());
    }

    #[test]
    fn one_frame_renders_every_tile_and_pixel() {
        let mut r = Renderer::new(ambient_sphere_builder());
        r.resize(100, 100);
        r.update(0.0);
        r.render_frame();
        wait_done(&r);

        let (done, total) = r.progress();
        assert!(total > 0);
        assert_eq!(done, total);

        let buf = r.buffer();
        assert_eq!(buf.len(), 100 * 100);
        // Center of the raster is the lit sphere, corners are background.
        let center = buf[50 * 100 + 50];
        assert!((center.r - 0.5).abs() < 1e-3);
        assert_eq!(buf[0], BACKGROUND_COLOR);
        assert_eq!(buf[100 * 100 - 1], BACKGROUND_COLOR);
    }

    #[test]
    fn repeat_render_at_same_time_is_bit_identical() {
        let mut r = Renderer::new(ambient_sphere_builder());
        r.resize(64, 48);
        r.update(0.0);
        r.render_frame();
        wait_done(&r);
        let first: Vec<Color> = r.buffer().to_vec();

        r.update(0.0);
        r.render_frame();
        wait_done(&r);
        assert_eq!(r.buffer(), first.as_slice());
    }

    #[test]
    fn zero_resize_is_ignored() {
        let mut r = Renderer::new(ambient_sphere_builder());
        r.resize(32, 32);
        r.resize(0, 16);
        r.resize(16, 0);
        assert_eq!((r.width(), r.height()), (32, 32));
    }

    #[test]
    fn resize_floods_with_the_neutral_fill() {
        let mut r = Renderer::new(ambient_sphere_builder());
        r.resize(8, 8);
        assert!(r.buffer().iter().all(|c| *c == BACKGROUND_COLOR));
    }

    fn slow_miss_builder() -> SceneBuilder {
        Box::new(|scene, _time| {
            scene.camera = Camera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 1.0);
            // Every ray exits in one (slow) step: the field is far away
            // everywhere, but each evaluation costs real time.
            scene.add_object(RenderObject::custom(|_p| {
                thread::sleep(Duration::from_micros(300));
                1000.0
            }));
        })
    }

    #[test]
    fn lifecycle_calls_are_no_ops_while_busy() {
        let mut r = Renderer::new(slow_miss_builder());
        r.resize(64, 64);
        r.update(1.0);
        assert_eq!(r.time(), 1.0);
        r.render_frame();

        // The frame takes a while; lifecycle preconditions hold meanwhile.
        if !r.is_done() {
            let (_, total) = r.progress();
            r.update(5.0);
            assert_eq!(r.time(), 1.0, "update must not advance time while busy");
            r.render_frame();
            let (done_after, total_after) = r.progress();
            assert_eq!(total_after, total, "busy render_frame must not re-tile");
            // A re-enqueue would have reset completed tiles to pending.
            assert!(done_after <= total);
        }

        r.cancel();
        assert!(r.is_done());
    }

    #[test]
    fn cancel_retires_pending_tiles_and_drains() {
        let mut r = Renderer::new(slow_miss_builder());
        r.resize(64, 64);
        r.update(0.0);
        r.render_frame();
        r.cancel();
        assert!(r.is_done());
        let (done, total) = r.progress();
        assert_eq!(done, total);
    }

    #[test]
    fn resize_while_busy_cancels_first() {
        let mut r = Renderer::new(slow_miss_builder());
        r.resize(64, 64);
        r.update(0.0);
        r.render_frame();
        // Blocks until drained, then swaps the allocation.
        r.resize(32, 16);
        assert!(r.is_done());
        assert_eq!(r.buffer().len(), 32 * 16);
    }

    #[test]
    fn time_accumulates_across_updates() {
        let mut r = Renderer::new(ambient_sphere_builder());
        r.resize(8, 8);
        r.update(0.25);
        r.update(0.5);
        assert!((r.time() - 0.75).abs() < 1e-6);
    }
}
