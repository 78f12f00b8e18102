use egui::{vec2, Button, Color32, Frame, Margin, Response, RichText, Rounding, Sense, Stroke, Ui, Vec2};

use crate::theme::AppTheme;

pub fn panel_frame(theme: &AppTheme) -> Frame {
    Frame::none()
        .fill(theme.surfaces.panel_bg)
        .inner_margin(Margin::symmetric(
            theme.layout.panel_padding_x,
            theme.layout.panel_padding_y,
        ))
}

/// Bottom bar frame; padding keeps the action buttons vertically centered.
pub fn action_bar_frame(theme: &AppTheme) -> Frame {
    let slack = theme.layout.action_bar_height - theme.controls.action_height;
    let vertical = (slack * 0.5).round().max(theme.layout.space_1);
    panel_frame(theme).inner_margin(Margin::symmetric(theme.layout.panel_padding_x, vertical))
}

pub fn card_frame(theme: &AppTheme) -> Frame {
    Frame::none()
        .fill(theme.surfaces.card_bg_alt)
        .rounding(Rounding::same(theme.controls.card_rounding))
        .stroke(Stroke::new(1.0, theme.surfaces.stroke_soft))
        .inner_margin(Margin::same(theme.layout.space_3))
}

fn highlighted<'a>(button: Button<'a>, theme: &AppTheme, on: bool) -> Button<'a> {
    if on {
        button
            .fill(theme.surfaces.accent_soft)
            .stroke(Stroke::new(1.0, theme.surfaces.accent))
    } else {
        button
            .fill(theme.surfaces.card_bg_alt)
            .stroke(Stroke::new(1.0, theme.surfaces.stroke_soft))
    }
}

/// Latching toolbar button, e.g. the text-box placement mode.
pub fn toggle_chip(ui: &mut Ui, theme: &AppTheme, label: &str, active: bool) -> Response {
    let button = Button::new(RichText::new(label).size(14.0))
        .min_size(vec2(0.0, theme.layout.chip_h))
        .rounding(Rounding::same(theme.controls.chip_rounding));
    ui.add(highlighted(button, theme, active))
}

pub fn segmented(ui: &mut Ui, theme: &AppTheme, label: &str, selected: bool) -> Response {
    let button = Button::new(RichText::new(label).size(13.0))
        .min_size(vec2(theme.layout.chip_w_segment, theme.layout.chip_h))
        .rounding(Rounding::same(theme.controls.button_rounding));
    ui.add(highlighted(button, theme, selected))
}

pub fn primary_button(ui: &mut Ui, theme: &AppTheme, label: &str, min_size: Vec2) -> Response {
    let button = Button::new(RichText::new(label).strong().color(theme.text.primary))
        .min_size(min_size)
        .rounding(Rounding::same(theme.controls.button_rounding));
    ui.add(highlighted(button, theme, true))
}

pub fn ghost_button(ui: &mut Ui, theme: &AppTheme, label: &str, min_size: Vec2) -> Response {
    let button = Button::new(RichText::new(label).color(theme.text.secondary))
        .min_size(min_size)
        .rounding(Rounding::same(theme.controls.button_rounding));
    ui.add(highlighted(button, theme, false))
}

fn tinted(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub fn subtle_badge(ui: &mut Ui, theme: &AppTheme, text: &str) {
    Frame::none()
        .fill(tinted(theme.surfaces.accent, 34))
        .rounding(Rounding::same(10.0))
        .stroke(Stroke::new(1.0, theme.surfaces.accent_soft))
        .inner_margin(Margin::symmetric(8.0, 4.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).size(12.0).strong().color(theme.text.accent));
        });
}

/// Dismissable red strip; returns `true` when the close button was clicked.
pub fn error_banner(ui: &mut Ui, theme: &AppTheme, message: &str) -> bool {
    let mut dismissed = false;
    Frame::none()
        .fill(tinted(theme.surfaces.danger, 40))
        .stroke(Stroke::new(1.0, theme.surfaces.danger))
        .rounding(Rounding::same(theme.controls.chip_rounding))
        .inner_margin(Margin::symmetric(theme.layout.space_3, theme.layout.space_1))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(message).color(theme.text.primary).size(13.0));
                dismissed = ui.small_button("✕").clicked();
            });
        });
    dismissed
}

pub fn vertical_divider(ui: &mut Ui, theme: &AppTheme, height: f32) {
    let (rect, _) = ui.allocate_exact_size(vec2(1.0, height), Sense::hover());
    ui.painter().line_segment(
        [rect.center_top(), rect.center_bottom()],
        Stroke::new(1.0, theme.surfaces.stroke_soft),
    );
}
