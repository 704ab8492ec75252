use egui::{Color32, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use sprite_tools::{Bounds, EditSession, Point};

const BACKDROP_COLOR: Color32 = Color32::from_gray(200);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(0, 150, 255);
const BRUSH_ERASE_COLOR: Color32 = Color32::from_rgb(255, 100, 100);
const BRUSH_RESTORE_COLOR: Color32 = Color32::from_rgb(100, 220, 100);

pub const MIN_BRUSH_RADIUS: u32 = 5;
pub const MAX_BRUSH_RADIUS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Tool {
    #[default]
    Erase,
    Restore,
    RegionRemove,
    Fill,
}

pub struct CanvasState {
    pub pan: Vec2,
    pub zoom: f32,
    pub current_tool: Tool,
    pub brush_radius: u32,
    pub fill_tolerance: u8,
    /// Last pixel of the stroke in progress
    last_point: Option<Point>,
    /// Cached hover preview, keyed by seed pixel, tool and tolerance
    hover_region: Option<((Point, Tool, u8), Option<Bounds>)>,
    texture: Option<TextureHandle>,
    texture_dirty: bool,
}

impl CanvasState {
    pub fn new(brush_radius: u32) -> Self {
        Self {
            pan: Vec2::new(50.0, 50.0),
            zoom: 1.0,
            current_tool: Tool::Erase,
            brush_radius: brush_radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS),
            fill_tolerance: sprite_tools::region::PAINT_BUCKET_TOLERANCE,
            last_point: None,
            hover_region: None,
            texture: None,
            texture_dirty: true,
        }
    }

    /// Rebuild the preview texture on the next frame
    pub fn invalidate(&mut self) {
        self.texture_dirty = true;
        self.hover_region = None;
    }

    pub fn reset_view(&mut self) {
        self.pan = Vec2::new(50.0, 50.0);
        self.zoom = 1.0;
    }

    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn screen_to_image(&self, screen_pos: Pos2, canvas_rect: Rect) -> Pos2 {
        let local = screen_pos - canvas_rect.min.to_vec2();
        Pos2::new(
            (local.x - self.pan.x) / self.zoom,
            (local.y - self.pan.y) / self.zoom,
        )
    }

    pub fn image_to_screen(&self, image_pos: Pos2, canvas_rect: Rect) -> Pos2 {
        Pos2::new(
            image_pos.x * self.zoom + self.pan.x + canvas_rect.min.x,
            image_pos.y * self.zoom + self.pan.y + canvas_rect.min.y,
        )
    }

    /// Pixel under a screen position (may lie outside the image)
    pub fn pixel_at(&self, screen_pos: Pos2, canvas_rect: Rect) -> Point {
        let pos = self.screen_to_image(screen_pos, canvas_rect);
        Point::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    fn refresh_texture(&mut self, ctx: &egui::Context, session: &EditSession) -> Option<String> {
        if !self.texture_dirty && self.texture.is_some() {
            return None;
        }
        self.texture_dirty = false;

        let rgba = match session.composite() {
            Ok(rgba) => rgba,
            Err(e) => return Some(format!("Error rendering preview: {}", e)),
        };
        let size = [rgba.width() as usize, rgba.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("sprite", image, TextureOptions::NEAREST));
            }
        }
        None
    }
}

/// Draw the sprite and route pointer input to the session.
/// Returns a status message when an edit happened or failed.
pub fn render_canvas(
    ui: &mut egui::Ui,
    session: &mut EditSession,
    state: &mut CanvasState,
) -> Option<String> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let canvas_rect = response.rect;

    let mut status = state.refresh_texture(ui.ctx(), session);

    // Draw background
    painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(40));

    let (width, height) = session.dimensions();
    let doc_min = state.image_to_screen(Pos2::ZERO, canvas_rect);
    let doc_max = state.image_to_screen(Pos2::new(width as f32, height as f32), canvas_rect);
    let doc_rect = Rect::from_min_max(doc_min, doc_max);
    painter.rect_filled(doc_rect, 0.0, BACKDROP_COLOR);
    if let Some(texture) = &state.texture {
        painter.image(
            texture.id(),
            doc_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }
    painter.rect_stroke(doc_rect, 0.0, Stroke::new(1.0, Color32::GRAY));

    let space_held = ui.input(|i| i.key_down(egui::Key::Space));

    // Handle zoom with scroll wheel
    if response.hovered() {
        let scroll_delta = ui.input(|i| i.raw_scroll_delta);

        if scroll_delta.y != 0.0 {
            let zoom_factor = 1.0 + scroll_delta.y * 0.002;
            let old_zoom = state.zoom;
            state.zoom = (state.zoom * zoom_factor).clamp(0.1, 20.0);

            // Zoom toward mouse position
            if let Some(mouse_pos) = response.hover_pos() {
                let local = mouse_pos - canvas_rect.min.to_vec2();
                state.pan.x = local.x - (local.x - state.pan.x) * (state.zoom / old_zoom);
                state.pan.y = local.y - (local.y - state.pan.y) * (state.zoom / old_zoom);
            }
        }
    }

    // Handle panning: middle mouse, right mouse, or space+drag
    let is_panning = response.dragged_by(egui::PointerButton::Middle)
        || response.dragged_by(egui::PointerButton::Secondary)
        || (space_held && response.dragged_by(egui::PointerButton::Primary));

    if response.drag_stopped() && state.last_point.take().is_some() {
        if session.end_gesture() {
            status = Some(format!(
                "Stroke committed ({} undo steps)",
                session.history().undo_count()
            ));
        }
    } else if is_panning {
        state.pan += response.drag_delta();
    } else if let Some(message) = handle_tool_interaction(session, state, &response, canvas_rect)
    {
        status = Some(message);
    }

    if let Some(hover) = response.hover_pos() {
        render_tool_preview(&painter, session, state, hover, canvas_rect);
    }

    status
}

fn handle_tool_interaction(
    session: &mut EditSession,
    state: &mut CanvasState,
    response: &egui::Response,
    canvas_rect: Rect,
) -> Option<String> {
    let pointer_pos = response.interact_pointer_pos()?;
    let pixel = state.pixel_at(pointer_pos, canvas_rect);

    match state.current_tool {
        Tool::Erase | Tool::Restore => {
            if response.drag_started_by(egui::PointerButton::Primary) {
                session.begin_gesture();
                state.last_point = Some(pixel);
                return stroke(session, state, pixel, pixel);
            }

            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(last) = state.last_point
            {
                state.last_point = Some(pixel);
                if last != pixel {
                    return stroke(session, state, last, pixel);
                }
            }

            if response.clicked() {
                return stroke(session, state, pixel, pixel);
            }
            None
        }
        Tool::RegionRemove => {
            if !response.clicked() {
                return None;
            }
            let outcome = session.remove_region_at(pixel);
            report_edit(state, outcome, "Removed region", pixel)
        }
        Tool::Fill => {
            if !response.clicked() {
                return None;
            }
            let outcome = session.fill_at(
                pixel,
                state.fill_tolerance,
                sprite_tools::AlphaMask::OPAQUE,
            );
            report_edit(state, outcome, "Filled region", pixel)
        }
    }
}

fn stroke(
    session: &mut EditSession,
    state: &mut CanvasState,
    from: Point,
    to: Point,
) -> Option<String> {
    let outcome = match state.current_tool {
        Tool::Restore => session.restore_stroke(from, to, state.brush_radius),
        _ => session.paint_stroke(from, to, state.brush_radius),
    };
    match outcome {
        Ok(true) => {
            state.invalidate();
            None
        }
        Ok(false) => None,
        Err(e) => Some(format!("Error: {}", e)),
    }
}

fn report_edit(
    state: &mut CanvasState,
    outcome: sprite_tools::Result<bool>,
    verb: &str,
    pixel: Point,
) -> Option<String> {
    match outcome {
        Ok(true) => {
            state.invalidate();
            Some(format!("{} at ({}, {})", verb, pixel.x, pixel.y))
        }
        Ok(false) => Some(format!("Nothing to change at ({}, {})", pixel.x, pixel.y)),
        Err(e) => Some(format!("Error: {}", e)),
    }
}

fn render_tool_preview(
    painter: &egui::Painter,
    session: &EditSession,
    state: &mut CanvasState,
    hover: Pos2,
    canvas_rect: Rect,
) {
    match state.current_tool {
        Tool::Erase | Tool::Restore => {
            let color = if state.current_tool == Tool::Erase {
                BRUSH_ERASE_COLOR
            } else {
                BRUSH_RESTORE_COLOR
            };
            painter.circle_stroke(
                hover,
                state.brush_radius as f32 * state.zoom,
                Stroke::new(1.0, color),
            );
        }
        Tool::RegionRemove | Tool::Fill => {
            let pixel = state.pixel_at(hover, canvas_rect);
            let tolerance = if state.current_tool == Tool::Fill {
                state.fill_tolerance
            } else {
                session.config().region_tolerance
            };
            let key = (pixel, state.current_tool, tolerance);

            let bounds = match state.hover_region {
                Some((cached, bounds)) if cached == key => bounds,
                _ => {
                    let bounds =
                        sprite_tools::detect_region(session.image(), pixel, tolerance).bounds();
                    state.hover_region = Some((key, bounds));
                    bounds
                }
            };

            if let Some(b) = bounds {
                let min = state.image_to_screen(Pos2::new(b.x as f32, b.y as f32), canvas_rect);
                let max = state.image_to_screen(
                    Pos2::new(b.right() as f32, b.bottom() as f32),
                    canvas_rect,
                );
                painter.rect_stroke(
                    Rect::from_min_max(min, max),
                    0.0,
                    Stroke::new(2.0, HIGHLIGHT_COLOR),
                );
            }
        }
    }
}
