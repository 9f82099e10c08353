//! Headless snapshot mode: render one frame of the demo scene from the
//! command line and write it to a PNG, no window involved.
//!
//! Usage:
//!   tilemarch --snapshot out.png
//!   tilemarch --snapshot out.png --size 1920x1080 --time 4.2 --outline

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use tilemarch::render::Renderer;

use crate::app::demo;

/// Real-time CPU sphere-tracing SDF renderer.
///
/// Run with no arguments for the interactive viewer; pass --snapshot for a
/// one-shot headless render.
#[derive(Parser, Debug)]
#[command(name = "tilemarch", about = "Tiled CPU ray marcher")]
pub struct CliArgs {
    /// Render one frame without opening a window and write it here (PNG).
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Raster size as WIDTHxHEIGHT.
    #[arg(long, default_value = "960x540", value_name = "WxH")]
    pub size: String,

    /// Scene time in seconds to render at.
    #[arg(long, default_value_t = 0.0, value_name = "SECONDS")]
    pub time: f32,

    /// Draw the outline glow around near-miss silhouettes.
    #[arg(long, default_value_t = false)]
    pub outline: bool,
}

pub fn run_snapshot(args: &CliArgs) -> ExitCode {
    let Some(ref path) = args.snapshot else {
        return ExitCode::FAILURE;
    };
    let Some((width, height)) = parse_size(&args.size) else {
        log::error!("invalid --size '{}', expected WIDTHxHEIGHT", args.size);
        return ExitCode::FAILURE;
    };

    let started = Instant::now();
    let outline = Arc::new(AtomicBool::new(args.outline));
    let mut renderer = Renderer::new(demo::demo_builder(outline));
    renderer.resize(width, height);
    renderer.update(args.time);
    renderer.render_frame();
    while !renderer.is_done() {
        thread::sleep(Duration::from_millis(5));
    }

    let mut image = image::RgbaImage::new(width, height);
    for (pixel, color) in image.pixels_mut().zip(renderer.buffer()) {
        *pixel = image::Rgba(color.to_rgba8());
    }
    if let Err(err) = image.save(path) {
        log::error!("failed to write {}: {err}", path.display());
        return ExitCode::FAILURE;
    }

    log::info!(
        "wrote {} ({width}x{height}, t = {}s) in {:.1} ms",
        path.display(),
        args.time,
        started.elapsed().as_secs_f64() * 1000.0
    );
    ExitCode::SUCCESS
}

fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}
