use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;
use log::{info, warn};
use sprite_tools::bounds::BoundsBuilder;
use sprite_tools::{
    AlphaMask, BackgroundSegmentation, EditSession, EngineConfig, PixelBuffer, Segmenter,
    ThresholdSegmenter,
};

use super::canvas::{CanvasState, MAX_BRUSH_RADIUS, MIN_BRUSH_RADIUS, Tool, render_canvas};

pub struct SpriteEditorApp {
    session: Option<EditSession>,
    config: EngineConfig,
    segmenter: Arc<dyn Segmenter>,
    /// Pending automatic background removal
    job: Option<BackgroundSegmentation>,
    canvas_state: CanvasState,
    current_path: Option<PathBuf>,
    status_message: String,
}

impl Default for SpriteEditorApp {
    fn default() -> Self {
        let config = EngineConfig::default();
        let segmenter: Arc<dyn Segmenter> =
            Arc::new(ThresholdSegmenter::new(config.segment.clone()));
        Self {
            session: None,
            canvas_state: CanvasState::new(config.brush_radius),
            config,
            segmenter,
            job: None,
            current_path: None,
            status_message: String::from("Ready - Open an image to begin editing"),
        }
    }
}

impl SpriteEditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .pick_file()
        else {
            return;
        };

        let pixels = match image::open(&path)
            .map_err(|e| e.to_string())
            .and_then(|img| PixelBuffer::from_dynamic_image(&img).map_err(String::from))
        {
            Ok(pixels) => pixels,
            Err(e) => {
                warn!("failed to open {}: {}", path.display(), e);
                self.status_message = format!("Error loading file: {}", e);
                return;
            }
        };

        let (width, height) = pixels.dimensions();
        match EditSession::with_config(pixels, self.config.clone()) {
            Ok(session) => {
                // A job for the previous image is discarded with it
                self.job = None;
                self.session = Some(session);
                self.canvas_state.invalidate();
                self.canvas_state.reset_view();
                self.status_message =
                    format!("Loaded: {} ({} x {})", path.display(), width, height);
                self.current_path = Some(path);
            }
            Err(e) => {
                self.status_message = format!("Error loading file: {}", e);
            }
        }
    }

    fn save_file(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        let suggested = self
            .current_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|stem| format!("{}_nobg.png", stem.to_string_lossy()))
            .unwrap_or_else(|| String::from("sprite.png"));

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(suggested)
            .save_file()
        else {
            return;
        };

        let result = session
            .composite()
            .map_err(String::from)
            .and_then(|rgba| rgba.save(&path).map_err(|e| e.to_string()));

        self.status_message = match result {
            Ok(()) => {
                info!("saved {}", path.display());
                format!("Saved: {}", path.display())
            }
            Err(e) => format!("Error saving file: {}", e),
        };
    }

    fn start_auto_remove(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        match BackgroundSegmentation::spawn(self.segmenter.clone(), session.image().clone()) {
            Ok(job) => {
                self.job = Some(job);
                self.status_message = String::from("Removing background...");
            }
            Err(e) => {
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    fn poll_job(&mut self) {
        // The result waits until the current stroke is released
        if self.canvas_state.is_stroking() {
            return;
        }
        let Some(job) = &self.job else {
            return;
        };
        let Some(result) = job.try_take() else {
            return;
        };
        self.job = None;

        let Some(session) = &mut self.session else {
            return;
        };

        self.status_message = match result.and_then(|mask| session.apply_mask(mask)) {
            Ok(true) => {
                self.canvas_state.invalidate();
                String::from("Background removed")
            }
            Ok(false) => String::from("Background removal changed nothing"),
            Err(e) => {
                warn!("automatic background removal failed: {}", e);
                format!("Automatic removal failed: {}", e)
            }
        };
    }

    fn undo(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        if session.undo().is_some() {
            self.canvas_state.invalidate();
            self.status_message = format!(
                "Undo ({} more available)",
                session.history().undo_count()
            );
        }
    }

    fn redo(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        if session.redo().is_some() {
            self.canvas_state.invalidate();
            self.status_message = format!(
                "Redo ({} more available)",
                session.history().redo_count()
            );
        }
    }

    fn reset(&mut self) {
        if let Some(session) = &mut self.session {
            session.reset();
            self.canvas_state.invalidate();
            self.status_message = String::from("Mask reset");
        }
    }

    /// Crop to the bounding box of everything still visible
    fn crop_to_content(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };

        let mask = session.mask();
        let mut builder = BoundsBuilder::new();
        for (x, y, pixel) in mask.as_gray_image().enumerate_pixels() {
            if pixel.0[0] != AlphaMask::TRANSPARENT {
                builder.update(x, y);
            }
        }

        let Some(bounds) = builder.build() else {
            self.status_message = String::from("Nothing visible to crop to");
            return;
        };

        self.status_message = match session.crop(bounds) {
            Ok(()) => {
                self.canvas_state.invalidate();
                format!("Cropped to {} x {}", bounds.width, bounds.height)
            }
            Err(e) => format!("Error: {}", e),
        };
    }

    fn tool_button(&mut self, ui: &mut egui::Ui, tool: Tool, label: &str) {
        if ui
            .selectable_label(self.canvas_state.current_tool == tool, label)
            .clicked()
        {
            self.canvas_state.current_tool = tool;
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let has_session = self.session.is_some();
        let can_undo = self.session.as_ref().is_some_and(|s| s.can_undo());
        let can_redo = self.session.as_ref().is_some_and(|s| s.can_redo());

        ui.horizontal(|ui| {
            if ui.button("Open Image").clicked() {
                self.open_file();
            }
            if ui
                .add_enabled(has_session, egui::Button::new("Save PNG"))
                .clicked()
            {
                self.save_file();
            }

            ui.separator();

            // Undo/Redo buttons
            if ui
                .add_enabled(can_undo, egui::Button::new("↶ Undo"))
                .on_hover_text("Ctrl+Z")
                .clicked()
            {
                self.undo();
            }
            if ui
                .add_enabled(can_redo, egui::Button::new("↷ Redo"))
                .on_hover_text("Ctrl+Y or Ctrl+Shift+Z")
                .clicked()
            {
                self.redo();
            }

            ui.separator();

            if ui
                .add_enabled(
                    has_session && self.job.is_none(),
                    egui::Button::new("Auto Remove Background"),
                )
                .clicked()
            {
                self.start_auto_remove();
            }
            if self.job.is_some() {
                ui.spinner();
            }
            if ui
                .add_enabled(has_session, egui::Button::new("Crop to Content"))
                .clicked()
            {
                self.crop_to_content();
            }
            if ui
                .add_enabled(has_session, egui::Button::new("Reset"))
                .clicked()
            {
                self.reset();
            }

            ui.separator();

            ui.label("Tool:");
            self.tool_button(ui, Tool::Erase, "Erase");
            self.tool_button(ui, Tool::Restore, "Restore");
            self.tool_button(ui, Tool::RegionRemove, "Remove Region");
            self.tool_button(ui, Tool::Fill, "Fill");

            ui.separator();

            ui.label(format!("Zoom: {:.0}%", self.canvas_state.zoom * 100.0));
            if ui.button("Reset View").clicked() {
                self.canvas_state.reset_view();
            }
        });
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Brush");
        ui.separator();
        ui.add(
            egui::Slider::new(
                &mut self.canvas_state.brush_radius,
                MIN_BRUSH_RADIUS..=MAX_BRUSH_RADIUS,
            )
            .text("Size"),
        );

        ui.separator();
        ui.heading("Fill");
        ui.add(egui::Slider::new(&mut self.canvas_state.fill_tolerance, 0..=100).text("Tolerance"));

        ui.separator();
        ui.heading("History");
        match &self.session {
            Some(session) => {
                let history = session.history();
                ui.label(format!(
                    "Undo: {} | Redo: {}",
                    history.undo_count(),
                    history.redo_count()
                ));
                ui.label(format!("Limit: {} steps", history.max_depth()));
            }
            None => {
                ui.label("No image loaded");
            }
        }
    }
}

impl eframe::App for SpriteEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();

        // Handle keyboard shortcuts
        let mut do_undo = false;
        let mut do_redo = false;
        let mut do_open = false;
        let mut do_save = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::O) && i.modifiers.command {
                do_open = true;
            }
            if i.key_pressed(egui::Key::S) && i.modifiers.command {
                do_save = true;
            }
            // Undo: Ctrl+Z
            if i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift {
                do_undo = true;
            }
            // Redo: Ctrl+Y or Ctrl+Shift+Z
            if i.key_pressed(egui::Key::Y) && i.modifiers.command {
                do_redo = true;
            }
            if i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift {
                do_redo = true;
            }
        });

        // History moves wait until the current stroke is released
        if !self.canvas_state.is_stroking() {
            if do_undo {
                self.undo();
            }
            if do_redo {
                self.redo();
            }
        }
        if do_open {
            self.open_file();
        }
        if do_save {
            self.save_file();
        }

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        // Bottom status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(session) = &self.session {
                        let (width, height) = session.dimensions();
                        ui.label(format!("Image: {} x {}", width, height));
                    }
                });
            });
        });

        egui::SidePanel::left("tools_panel")
            .default_width(200.0)
            .show(ctx, |ui| {
                self.render_side_panel(ui);
            });

        // Main canvas area
        egui::CentralPanel::default().show(ctx, |ui| match &mut self.session {
            Some(session) => {
                if let Some(message) = render_canvas(ui, session, &mut self.canvas_state) {
                    self.status_message = message;
                }
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Open an image to begin (Ctrl+O)");
                });
            }
        });

        // Keep polling while the background job runs
        if self.job.is_some() {
            ctx.request_repaint();
        }
    }
}
