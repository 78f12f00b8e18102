use egui::{vec2, Align, Layout, RichText, Slider, Ui};

use crate::geometry::{CURVATURE_STEP, MAX_CURVATURE};
use crate::state::EditorState;
use crate::theme::{AppTheme, WidthClass};
use crate::ui_controls;

#[derive(Clone, Copy, Debug)]
pub struct ToolbarPlan {
    pub show_curvature_label: bool,
    pub show_zoom_inline: bool,
    pub slider_width: f32,
}

#[derive(Default)]
pub struct ToolbarOutput {
    pub open_image: bool,
}

pub fn plan_toolbar_items(width_class: WidthClass) -> ToolbarPlan {
    match width_class {
        WidthClass::Compact => ToolbarPlan {
            show_curvature_label: false,
            show_zoom_inline: false,
            slider_width: 90.0,
        },
        WidthClass::Regular => ToolbarPlan {
            show_curvature_label: true,
            show_zoom_inline: false,
            slider_width: 120.0,
        },
        WidthClass::Wide => ToolbarPlan {
            show_curvature_label: true,
            show_zoom_inline: true,
            slider_width: 160.0,
        },
    }
}

pub fn show_toolbar(
    ui: &mut Ui,
    state: &mut EditorState,
    theme: &AppTheme,
    width_class: WidthClass,
) -> ToolbarOutput {
    let plan = plan_toolbar_items(width_class);
    let mut out = ToolbarOutput::default();
    let has_image = state.image.is_some();

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        ui.spacing_mut().interact_size.y = theme.layout.chip_h;
        ui.spacing_mut().item_spacing = vec2(theme.layout.control_gap, 0.0);

        if ui_controls::toggle_chip(ui, theme, "Open Image", false)
            .on_hover_text("Open an image file (Ctrl+O)")
            .clicked()
        {
            out.open_image = true;
        }

        group_separator(ui, theme);

        let placing = state.is_placing_text_box();
        let add_text = ui.add_enabled_ui(has_image, |ui| {
            ui_controls::toggle_chip(ui, theme, "Add Text Box", placing)
                .on_hover_text("Click on the image to place a text box (T)")
        });
        if add_text.inner.clicked() {
            state.toggle_text_box_placement();
        }

        group_separator(ui, theme);
        curvature_control(ui, state, theme, plan);

        group_separator(ui, theme);
        let can_delete = state.selection.is_some();
        if ui
            .add_enabled_ui(can_delete, |ui| {
                ui_controls::ghost_button(ui, theme, "Delete", vec2(0.0, theme.layout.chip_h))
            })
            .inner
            .on_hover_text("Delete the selected arrow or text box (Del)")
            .clicked()
        {
            state.delete_selected();
        }
        let has_annotations = !state.arrows.is_empty() || !state.text_boxes.is_empty();
        if ui
            .add_enabled_ui(has_annotations, |ui| {
                ui_controls::ghost_button(ui, theme, "Clear All", vec2(0.0, theme.layout.chip_h))
            })
            .inner
            .clicked()
        {
            state.clear_all();
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_enabled_ui(has_image, |ui| zoom_controls(ui, state, theme, plan));
        });
    });

    out
}

fn curvature_control(ui: &mut Ui, state: &mut EditorState, theme: &AppTheme, plan: ToolbarPlan) {
    if plan.show_curvature_label {
        ui.label(RichText::new("Curvature").color(theme.text.muted).size(12.0));
    }

    let selected = state.selected_curvature();
    let mut value = selected.unwrap_or(0.0);
    let slider = ui.add_enabled_ui(selected.is_some(), |ui| {
        ui.spacing_mut().slider_width = plan.slider_width;
        ui.add(
            Slider::new(&mut value, -MAX_CURVATURE..=MAX_CURVATURE)
                .step_by(f64::from(CURVATURE_STEP))
                .fixed_decimals(2),
        )
    });
    let response = if selected.is_some() {
        slider.inner
    } else {
        slider.inner.on_disabled_hover_text("Select an arrow to bend it")
    };
    if response.changed() {
        state.set_selected_curvature(value);
    }
}

fn zoom_controls(ui: &mut Ui, state: &mut EditorState, theme: &AppTheme, plan: ToolbarPlan) {
    if ui
        .add(egui::Button::new("Fit").min_size(vec2(0.0, theme.layout.chip_h)))
        .on_hover_text("Fit image to window (Ctrl+0)")
        .clicked()
    {
        state.fit_zoom_to_view = true;
    }
    if ui.button("+").on_hover_text("Zoom in (Ctrl+=)").clicked() {
        state.zoom_in();
    }
    if plan.show_zoom_inline {
        ui.label(
            RichText::new(format!("{:.0}%", state.zoom * 100.0))
                .color(theme.text.secondary)
                .size(12.0),
        );
    }
    if ui.button("−").on_hover_text("Zoom out (Ctrl+-)").clicked() {
        state.zoom_out();
    }
}

fn group_separator(ui: &mut Ui, theme: &AppTheme) {
    ui_controls::vertical_divider(ui, theme, theme.layout.chip_h - theme.layout.space_2);
    let extra = (theme.layout.group_gap - theme.layout.control_gap).max(0.0);
    if extra > 0.0 {
        ui.add_space(extra);
    }
}

#[cfg(test)]
mod tests {
    use super::plan_toolbar_items;
    use crate::theme::WidthClass;

    #[test]
    fn compact_toolbar_drops_labels_first() {
        let plan = plan_toolbar_items(WidthClass::Compact);
        assert!(!plan.show_curvature_label);
        assert!(!plan.show_zoom_inline);
    }

    #[test]
    fn wide_toolbar_shows_everything() {
        let plan = plan_toolbar_items(WidthClass::Wide);
        assert!(plan.show_curvature_label);
        assert!(plan.show_zoom_inline);
        assert!(plan.slider_width > plan_toolbar_items(WidthClass::Regular).slider_width);
    }
}
