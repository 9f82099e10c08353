use eframe::egui;

mod app;
mod cli;

use clap::Parser;

use app::ViewerApp;

fn main() -> std::process::ExitCode {
    env_logger::init();

    let args = cli::CliArgs::parse();
    if args.snapshot.is_some() {
        // Headless path: render one frame, write the PNG, never open a
        // window.
        return cli::run_snapshot(&args);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    let app = ViewerApp::new(&args);
    eframe::run_native("tilemarch", options, Box::new(move |_cc| Ok(Box::new(app))))
        .expect("failed to start viewer");

    std::process::ExitCode::SUCCESS
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_frame();
        self.toolbar(ctx);
        self.viewport(ctx);
        // The renderer animates continuously; keep the event loop hot so
        // partial frames reach the screen as they fill in.
        ctx.request_repaint();
    }
}
