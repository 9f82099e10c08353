//! The shared frame buffer.
//!
//! Workers write pixels while the presenter reads the same memory for the
//! progressive preview. The two sides are deliberately unsynchronized:
//! worker writes never overlap (each worker owns the rectangle of the tile
//! it popped), and the presenter tolerates stale or torn pixels since the
//! buffer is only guaranteed consistent once the scheduler reports the
//! frame done. Reallocation happens strictly while the worker pool is
//! drained.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::math::Color;

pub struct PixelBuffer {
    width: AtomicU32,
    height: AtomicU32,
    pixels: UnsafeCell<Vec<Color>>,
}

// SAFETY: concurrent access follows the scheduler's tile protocol. Writers
// are partitioned by tile rectangle and never alias each other. The
// presenter's reads race with writes on purpose; a racing read yields a
// stale or torn Color (plain f32 triple, no invalid bit patterns that
// matter downstream because presentation clamps every channel). The
// backing Vec is reallocated only via `resize`, which the scheduler calls
// after cancelling and draining every in-flight tile.
unsafe impl Send for PixelBuffer {}
unsafe impl Sync for PixelBuffer {}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        PixelBuffer {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            pixels: UnsafeCell::new(vec![fill; (width * height) as usize]),
        }
    }

    pub fn width(&self) -> u32 {
        self.width.load(Ordering::Acquire)
    }

    pub fn height(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        (self.width() * self.height()) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store one pixel. Callers stay inside the tile rectangle they own.
    #[inline]
    pub fn write(&self, x: u32, y: u32, color: Color) {
        let w = self.width();
        debug_assert!(x < w && y < self.height());
        let idx = (y * w + x) as usize;
        // SAFETY: idx is in bounds (tiles are clipped to the buffer edge)
        // and no other writer touches this pixel; see the type-level note.
        unsafe {
            let pixels = &mut *self.pixels.get();
            pixels[idx] = color;
        }
    }

    /// Row-major view of the whole buffer, origin top-left. Values are
    /// unclamped; reads during an in-flight frame may see stale pixels.
    pub fn as_slice(&self) -> &[Color] {
        // SAFETY: the Vec's length and allocation only change in `resize`,
        // which requires the drained state, so the slice itself is stable
        // for the borrow; individual elements may race with tile writers
        // as documented on the type.
        unsafe { (*self.pixels.get()).as_slice() }
    }

    /// Reallocate for new dimensions and flood with `fill`.
    ///
    /// Only the scheduler calls this, and only after a cancel + drain, so
    /// no worker can be writing and no preview slice can be alive on
    /// another thread.
    pub fn resize(&self, width: u32, height: u32, fill: Color) {
        // SAFETY: drained state per above; this is the single mutation
        // point for the allocation.
        unsafe {
            let pixels = &mut *self.pixels.get();
            pixels.clear();
            pixels.resize((width * height) as usize, fill);
        }
        self.width.store(width, Ordering::Release);
        self.height.store(height, Ordering::Release);
    }

    /// Flood every pixel with one color. Same drained-state requirement as
    /// `resize`.
    pub fn fill(&self, color: Color) {
        // SAFETY: see `resize`.
        unsafe {
            let pixels = &mut *self.pixels.get();
            pixels.fill(color);
        }
    }
}
