mod action_bar;
mod annotation;
mod app;
mod canvas;
mod clipboard;
mod export;
mod geometry;
mod gesture;
mod loader;
mod state;
mod text_layout;
mod theme;
mod toolbar;
mod ui_controls;

use std::path::PathBuf;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let initial_image = std::env::args_os().nth(1).map(PathBuf::from);
    if let Some(path) = &initial_image {
        log::info!("opening {} from command line", path.display());
    }

    let viewport = egui::ViewportBuilder::default()
        .with_title("Arrowmark")
        .with_inner_size([1180.0, 780.0])
        .with_min_inner_size([640.0, 480.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Arrowmark",
        options,
        Box::new(move |cc| Box::new(app::ArrowMarkApp::new(cc, initial_image))),
    )
}
