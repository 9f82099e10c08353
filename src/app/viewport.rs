//! Viewer panels: toolbar controls, the render viewport, and the stats
//! overlay.

use std::sync::atomic::Ordering;

use eframe::egui;

use super::ViewerApp;

impl ViewerApp {
    pub fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui: &mut egui::Ui| {
            ui.horizontal(|ui: &mut egui::Ui| {
                let pause_label = if self.paused { "Resume" } else { "Pause" };
                if ui.button(pause_label).clicked() {
                    self.paused = !self.paused;
                }

                let mut outline = self.outline.load(Ordering::Relaxed);
                if ui.checkbox(&mut outline, "Outlines").changed() {
                    self.outline.store(outline, Ordering::Relaxed);
                }

                ui.checkbox(&mut self.show_stats, "Stats");

                ui.separator();
                ui.label("Detail");
                ui.add(
                    egui::Slider::new(&mut self.max_edge, 120..=960)
                        .suffix(" px")
                        .logarithmic(true),
                );
            });
        });
    }

    pub fn viewport(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            let avail = ui.available_size();
            if avail.x >= 1.0 && avail.y >= 1.0 {
                let (w, h) = fit_render_size(avail.x, avail.y, self.max_edge);
                if (w, h) != (self.renderer.width(), self.renderer.height()) {
                    // Cancels and drains any in-flight frame before the
                    // buffer swaps.
                    self.renderer.resize(w, h);
                }
            }

            self.upload_buffer(ctx);

            if let Some(ref texture) = self.texture {
                ui.centered_and_justified(|ui: &mut egui::Ui| {
                    ui.add(
                        egui::Image::new(texture)
                            .fit_to_exact_size(avail)
                            .maintain_aspect_ratio(true),
                    );
                });
            }
        });

        if self.show_stats {
            self.stats_window(ctx);
        }
    }

    /// Clamp the current buffer to 8-bit RGBA and (re)upload it as the
    /// viewport texture. Runs every GUI frame; mid-render reads are the
    /// progressive preview.
    fn upload_buffer(&mut self, ctx: &egui::Context) {
        let w = self.renderer.width() as usize;
        let h = self.renderer.height() as usize;
        if w == 0 || h == 0 {
            return;
        }

        let buffer = self.renderer.buffer();
        let mut rgba = Vec::with_capacity(w * h * 4);
        for color in buffer {
            rgba.extend_from_slice(&color.to_rgba8());
        }

        let image = egui::ColorImage::from_rgba_unmultiplied([w, h], &rgba);
        match self.texture {
            Some(ref mut texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("render-target", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn stats_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Render stats")
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui: &mut egui::Ui| {
                let (done, total) = self.renderer.progress();
                ui.label(format!(
                    "{} x {} px",
                    self.renderer.width(),
                    self.renderer.height()
                ));
                ui.label(format!("tiles: {done}/{total}"));
                ui.label(format!("workers: {}", self.renderer.worker_count()));
                ui.label(format!("scene time: {:.2} s", self.renderer.time()));
                if self.frame_time > 0.0 {
                    ui.label(format!(
                        "last frame: {:.1} ms ({:.1} fps)",
                        self.frame_time * 1000.0,
                        1.0 / self.frame_time.max(1e-6)
                    ));
                }
            });
    }
}

/// Scale `avail_w` x `avail_h` down (never up) so its longest edge is at
/// most `max_edge`, preserving aspect ratio. Returns at least 1x1.
fn fit_render_size(avail_w: f32, avail_h: f32, max_edge: u32) -> (u32, u32) {
    let longest = avail_w.max(avail_h);
    let scale = (max_edge as f32 / longest).min(1.0);
    let w = (avail_w * scale).round().max(1.0) as u32;
    let h = (avail_h * scale).round().max(1.0) as u32;
    (w, h)
}
