use egui::{vec2, Align, Layout, RichText, Ui};

use crate::export::ExportFormat;
use crate::state::EditorState;
use crate::theme::{AppTheme, WidthClass};
use crate::ui_controls;

#[derive(Default)]
pub struct ActionBarOutput {
    pub copy: bool,
    pub format: Option<ExportFormat>,
    pub toggle_preview: bool,
}

pub fn annotation_summary(state: &EditorState) -> String {
    let arrows = state.arrows.len();
    let boxes = state.text_boxes.len();
    format!(
        "{arrows} arrow{} · {boxes} text box{}",
        if arrows == 1 { "" } else { "s" },
        if boxes == 1 { "" } else { "es" }
    )
}

pub fn show_action_bar(
    ui: &mut Ui,
    state: &EditorState,
    theme: &AppTheme,
    copied_feedback: bool,
    preview_open: bool,
    width_class: WidthClass,
) -> ActionBarOutput {
    let action_h = theme.controls.action_height;
    let copy_w = if width_class == WidthClass::Compact {
        120.0
    } else {
        156.0
    };
    let mut out = ActionBarOutput::default();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = vec2(theme.layout.space_1, 0.0);

        for format in ExportFormat::ALL {
            let selected = state.settings.export_format == format;
            if ui_controls::segmented(ui, theme, format.label(), selected).clicked() && !selected {
                out.format = Some(format);
            }
        }

        if width_class != WidthClass::Compact {
            ui.add_space(theme.layout.space_4);
            ui.label(
                RichText::new(annotation_summary(state))
                    .color(theme.text.muted)
                    .size(12.0),
            );
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.spacing_mut().item_spacing = vec2(theme.layout.space_3, 0.0);

            let copy_text = if copied_feedback {
                "Copied"
            } else {
                "Copy Coordinates"
            };
            let copy_button = ui.add_enabled_ui(state.image.is_some(), |ui| {
                ui_controls::primary_button(ui, theme, copy_text, vec2(copy_w, action_h))
            });
            if copy_button.inner.on_hover_text("Ctrl+C").clicked() {
                out.copy = true;
            }

            let preview_label = if preview_open {
                "Hide Preview"
            } else {
                "Preview"
            };
            if ui_controls::ghost_button(ui, theme, preview_label, vec2(0.0, action_h)).clicked() {
                out.toggle_preview = true;
            }

            if copied_feedback && width_class != WidthClass::Compact {
                ui_controls::subtle_badge(ui, theme, "clipboard updated");
            }
        });
    });

    out
}

#[cfg(test)]
mod tests {
    use image::DynamicImage;

    use super::annotation_summary;
    use crate::annotation::Point;
    use crate::state::{EditorState, UserSettings};

    #[test]
    fn summary_counts_annotations() {
        let mut state = EditorState::with_settings(UserSettings::default());
        state.reset_for_new_image(DynamicImage::new_rgba8(100, 100));
        assert_eq!(annotation_summary(&state), "0 arrows · 0 text boxes");

        state.pointer_down(Point::new(10.0, 10.0), 0.0);
        state.pointer_up(Point::new(60.0, 10.0));
        assert_eq!(annotation_summary(&state), "1 arrow · 0 text boxes");
    }
}
