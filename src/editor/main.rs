mod app;
mod canvas;

use app::SpriteEditorApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sprite Editor",
        options,
        Box::new(|cc| Ok(Box::new(SpriteEditorApp::new(cc)))),
    )
}
