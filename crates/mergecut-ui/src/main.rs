#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod modules;
mod theme;

fn main() -> eframe::Result {
    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("✂ MergeCut")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([760.0, 480.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "MergeCut",
        native_options,
        Box::new(|cc| Ok(Box::new(app::MergeCutApp::new(cc)))),
    )
}
