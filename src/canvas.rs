use egui::{
    vec2, Align2, Color32, Context, CursorIcon, FontId, Id, Key, Modifiers, Painter, Pos2, Rect,
    Response, ScrollArea, Sense, Shape, Stroke, Ui,
};

use crate::annotation::{Arrow, Point, TextBox, TextBoxId};
use crate::geometry;
use crate::state::{EditorState, Gesture, Selection};
use crate::text_layout::{self, FONT_SIZE, TEXT_PADDING};
use crate::theme::AppTheme;

const CANVAS_MARGIN: f32 = 48.0;
const CURVE_DRAW_STEPS: usize = 24;

pub fn show_canvas(ui: &mut Ui, ctx: &Context, state: &mut EditorState, theme: &AppTheme) {
    let Some(image) = state.image.as_mut() else {
        empty_canvas(ui, theme);
        return;
    };
    image.ensure_texture(ctx);
    let Some(texture_id) = image.texture.as_ref().map(|texture| texture.id()) else {
        return;
    };
    let image_size = image.size_vec2();

    let available = ui.available_size();
    if state.fit_zoom_to_view {
        state.set_fit_zoom(image_size, available - vec2(CANVAS_MARGIN, CANVAS_MARGIN));
        state.fit_zoom_to_view = false;
    }

    let scaled = image_size * state.zoom;
    let canvas_size = vec2(
        (scaled.x + CANVAS_MARGIN).max(available.x),
        (scaled.y + CANVAS_MARGIN).max(available.y),
    );

    ScrollArea::both()
        .id_source("arrowmark_canvas_scroll")
        .show(ui, |ui| {
            let (canvas_rect, response) =
                ui.allocate_exact_size(canvas_size, Sense::click_and_drag());

            let origin = Pos2::new(
                canvas_rect.center().x - scaled.x * 0.5,
                canvas_rect.center().y - scaled.y * 0.5,
            );
            let image_rect = Rect::from_min_size(origin, scaled);

            handle_pointer(ctx, state, &response, image_rect);

            let painter = ui.painter_at(canvas_rect);
            painter.rect_filled(canvas_rect, 0.0, theme.surfaces.canvas_bg);
            painter.image(
                texture_id,
                image_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
            painter.rect_stroke(
                image_rect.expand(1.0),
                0.0,
                Stroke::new(1.0, theme.surfaces.stroke_strong),
            );

            let clipped = painter.with_clip_rect(image_rect);
            draw_arrows(&clipped, state, image_rect, theme);
            draw_text_boxes(ctx, &clipped, state, image_rect, theme);
            draw_text_editor(ctx, state, image_rect, theme);
        });
}

fn empty_canvas(ui: &mut Ui, theme: &AppTheme) {
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 16.0, theme.surfaces.canvas_bg);
    painter.rect_stroke(rect, 16.0, Stroke::new(1.0, theme.surfaces.stroke_soft));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Open an image (Ctrl+O), paste one (Ctrl+V) or drop a file here",
        FontId::proportional(17.0),
        theme.text.secondary,
    );
}

/// Feeds raw primary-button events to the gesture state machine.
///
/// Positions outside the image are `None`: a press there is ignored and a
/// drag that wanders out ends the gesture through `pointer_leave`.
fn handle_pointer(ctx: &Context, state: &mut EditorState, response: &Response, image_rect: Rect) {
    if state.text_edit.is_some() {
        return;
    }

    let (pressed, released, pointer_pos, now) = ctx.input(|input| {
        (
            input.pointer.primary_pressed(),
            input.pointer.primary_released(),
            input.pointer.latest_pos(),
            input.time,
        )
    });
    let image_pos = pointer_pos.and_then(|pos| screen_to_image(pos, image_rect, state.zoom));

    if pressed && response.hovered() {
        if let Some(pos) = image_pos {
            state.pointer_down(pos, now);
        }
    }

    if !matches!(state.gesture, Gesture::Idle | Gesture::PlacingTextBox) {
        match image_pos {
            Some(pos) => state.pointer_move(pos),
            None => state.pointer_leave(),
        }
    }

    if released {
        match image_pos {
            Some(pos) => state.pointer_up(pos),
            None => state.pointer_leave(),
        }
    }

    if response.hovered() {
        if let Some(pos) = image_pos {
            ctx.set_cursor_icon(hover_cursor(state, pos));
        }
    }
}

fn hover_cursor(state: &EditorState, pos: Point) -> CursorIcon {
    match state.gesture {
        Gesture::DraggingTextBox { .. } => return CursorIcon::Grabbing,
        Gesture::ResizingTextBox { .. } => return CursorIcon::ResizeNwSe,
        Gesture::PlacingTextBox => return CursorIcon::Text,
        Gesture::DrawingNewArrow { .. } | Gesture::ExtendingArrowFromEndpoint { .. } => {
            return CursorIcon::Crosshair
        }
        Gesture::Idle => {}
    }

    if let Some(Selection::TextBox(id)) = state.selection {
        if state
            .find_text_box(id)
            .is_some_and(|text_box| text_box.hits_resize_handle(pos))
        {
            return CursorIcon::ResizeNwSe;
        }
    }
    if state.hit_text_box(pos).is_some() {
        CursorIcon::Grab
    } else if state.hit_endpoint(pos).is_some() {
        CursorIcon::Crosshair
    } else if state.hit_arrow(pos).is_some() {
        CursorIcon::PointingHand
    } else {
        CursorIcon::Default
    }
}

fn draw_arrows(painter: &Painter, state: &EditorState, image_rect: Rect, theme: &AppTheme) {
    let tokens = &theme.annotations;
    let normal = Stroke::new(tokens.arrow_width, tokens.arrow);
    let selected = state.selected_arrow();

    // Selected arrow goes last so it stays on top.
    for (index, arrow) in state.arrows.iter().enumerate() {
        if Some(index) != selected {
            draw_arrow(painter, arrow, image_rect, state.zoom, normal, theme);
        }
    }
    if let Some(index) = selected {
        let stroke = Stroke::new(tokens.arrow_selected_width, tokens.arrow_selected);
        draw_arrow(painter, &state.arrows[index], image_rect, state.zoom, stroke, theme);
    }

    if let Some(preview) = state.in_progress_arrow() {
        let stroke = Stroke::new(tokens.arrow_width, tokens.arrow.linear_multiply(0.8));
        draw_arrow(painter, &preview, image_rect, state.zoom, stroke, theme);
    }
}

fn draw_arrow(
    painter: &Painter,
    arrow: &Arrow,
    image_rect: Rect,
    zoom: f32,
    stroke: Stroke,
    theme: &AppTheme,
) {
    let points: Vec<Pos2> = if arrow.is_curved() {
        geometry::sample_quadratic(arrow.start, arrow.control_point(), arrow.end, CURVE_DRAW_STEPS)
            .into_iter()
            .map(|point| image_to_screen(point, image_rect, zoom))
            .collect()
    } else {
        vec![
            image_to_screen(arrow.start, image_rect, zoom),
            image_to_screen(arrow.end, image_rect, zoom),
        ]
    };
    painter.add(Shape::line(points, stroke));

    if arrow.shows_arrowhead() {
        let tip = image_to_screen(arrow.end, image_rect, zoom);
        painter.add(Shape::convex_polygon(
            arrowhead(tip, arrow.head_angle(), theme).to_vec(),
            stroke.color,
            Stroke::NONE,
        ));
    }
}

/// Triangle with its tip on the arrow end, pointing along `angle`.
fn arrowhead(tip: Pos2, angle: f32, theme: &AppTheme) -> [Pos2; 3] {
    let tokens = &theme.annotations;
    let unit = vec2(angle.cos(), angle.sin());
    let normal = vec2(-unit.y, unit.x);
    let base = tip - unit * tokens.arrowhead_length;
    [
        tip,
        base + normal * tokens.arrowhead_half_width,
        base - normal * tokens.arrowhead_half_width,
    ]
}

fn draw_text_boxes(
    ctx: &Context,
    painter: &Painter,
    state: &EditorState,
    image_rect: Rect,
    theme: &AppTheme,
) {
    let tokens = &theme.annotations;
    for text_box in &state.text_boxes {
        let selected = state.selection == Some(Selection::TextBox(text_box.id));
        let rect = box_screen_rect(text_box, image_rect, state.zoom);
        let stroke = text_box_stroke(state, text_box.id, theme);
        painter.rect_filled(rect, 4.0, tokens.text_box_fill);
        painter.rect_stroke(rect, 4.0, stroke);

        if !state.is_editing(text_box.id) {
            draw_text_lines(ctx, painter, text_box, rect.min, state.zoom);
        }

        if selected {
            let corner = image_to_screen(text_box.resize_handle(), image_rect, state.zoom);
            painter.rect_filled(
                Rect::from_center_size(corner, vec2(tokens.resize_handle_size, tokens.resize_handle_size)),
                2.0,
                tokens.resize_handle,
            );
        }
    }
}

/// Outline of a text box: thicker while dragged, blue while selected.
fn text_box_stroke(state: &EditorState, id: TextBoxId, theme: &AppTheme) -> Stroke {
    let tokens = &theme.annotations;
    if state.is_dragging(id) {
        Stroke::new(2.5, tokens.text_box_selected_stroke)
    } else if state.selection == Some(Selection::TextBox(id)) {
        Stroke::new(1.5, tokens.text_box_selected_stroke)
    } else {
        Stroke::new(1.0, tokens.text_box_stroke)
    }
}

fn draw_text_lines(ctx: &Context, painter: &Painter, text_box: &TextBox, origin: Pos2, zoom: f32) {
    let measure_font = FontId::proportional(FONT_SIZE);
    let lines = ctx.fonts(|fonts| {
        text_layout::wrap_text(&text_box.text, text_box.width, |candidate| {
            fonts
                .layout_no_wrap(candidate.to_owned(), measure_font.clone(), Color32::WHITE)
                .size()
                .x
        })
    });

    let font = FontId::proportional(FONT_SIZE * zoom);
    let color = text_box.color32();
    for (line, offset) in lines.iter().zip(text_layout::line_offsets(lines.len())) {
        painter.text(
            origin + vec2(TEXT_PADDING, offset) * zoom,
            Align2::LEFT_TOP,
            line,
            font.clone(),
            color,
        );
    }
}

/// In-place multiline editor over the text box. Ctrl+Enter or a click
/// outside commits; Escape is handled by the app shortcuts.
fn draw_text_editor(ctx: &Context, state: &mut EditorState, image_rect: Rect, theme: &AppTheme) {
    let Some(edit_id) = state.text_edit.as_ref().map(|edit| edit.id) else {
        return;
    };
    let Some(rect) = state
        .find_text_box(edit_id)
        .map(|text_box| box_screen_rect(text_box, image_rect, state.zoom))
    else {
        state.cancel_text_edit();
        return;
    };

    let zoom = state.zoom;
    let commit_shortcut =
        ctx.input_mut(|input| input.consume_key(Modifiers::COMMAND, Key::Enter));

    let area = egui::Area::new(Id::new("arrowmark_text_edit"))
        .order(egui::Order::Foreground)
        .fixed_pos(rect.min)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(theme.annotations.text_box_fill)
                .stroke(Stroke::new(1.5, theme.surfaces.accent))
                .rounding(egui::Rounding::same(4.0))
                .show(ui, |ui| {
                    let Some(edit) = state.text_edit.as_mut() else {
                        return;
                    };
                    let response = ui.add_sized(
                        rect.size(),
                        egui::TextEdit::multiline(&mut edit.buffer)
                            .font(FontId::proportional(FONT_SIZE * zoom))
                            .text_color(Color32::from_rgb(0x1A, 0x20, 0x2C))
                            .margin(vec2(TEXT_PADDING, TEXT_PADDING) * zoom)
                            .frame(false),
                    );
                    if !response.has_focus() {
                        response.request_focus();
                    }
                });
        });

    let clicked_outside = ctx.input(|input| {
        input.pointer.any_pressed()
            && input
                .pointer
                .interact_pos()
                .is_some_and(|pos| !area.response.rect.contains(pos))
    });

    if commit_shortcut || clicked_outside {
        state.commit_text_edit();
    }
}

fn box_screen_rect(text_box: &TextBox, image_rect: Rect, zoom: f32) -> Rect {
    Rect::from_min_size(
        image_to_screen(text_box.position, image_rect, zoom),
        vec2(text_box.width, text_box.height) * zoom,
    )
}

pub fn image_to_screen(point: Point, image_rect: Rect, zoom: f32) -> Pos2 {
    Pos2::new(
        image_rect.min.x + point.x * zoom,
        image_rect.min.y + point.y * zoom,
    )
}

/// `None` when `pos` falls outside the displayed image.
pub fn screen_to_image(pos: Pos2, image_rect: Rect, zoom: f32) -> Option<Point> {
    if !image_rect.contains(pos) || zoom <= 0.0 {
        return None;
    }
    Some(Point::new(
        (pos.x - image_rect.min.x) / zoom,
        (pos.y - image_rect.min.y) / zoom,
    ))
}
