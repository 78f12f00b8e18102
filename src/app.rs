use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use eframe::egui::{self, Context as EguiContext, Key, RichText, TopBottomPanel};
use eframe::{App, Frame};

use crate::action_bar;
use crate::canvas;
use crate::clipboard;
use crate::loader;
use crate::state::EditorState;
use crate::theme::{self, AppTheme};
use crate::toolbar;
use crate::ui_controls;

const COPY_FEEDBACK_SECS: f64 = 1.5;

pub struct ArrowMarkApp {
    pub state: EditorState,
    theme: AppTheme,
    error: Option<String>,
    copy_feedback_until: Option<f64>,
    preview_open: bool,
}

impl ArrowMarkApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_image: Option<PathBuf>) -> Self {
        let theme = theme::workbench_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        let mut app = Self {
            state: EditorState::default(),
            theme,
            error: None,
            copy_feedback_until: None,
            preview_open: false,
        };
        if let Some(path) = initial_image {
            app.open_path(&path);
        }
        app
    }

    fn report_error(&mut self, context: &str, err: anyhow::Error) {
        log::error!("{context}: {err:#}");
        self.error = Some(format!("{context}: {err:#}"));
    }

    fn open_path(&mut self, path: &Path) {
        match loader::load_image_from_path(path) {
            Ok(image) => {
                self.state.reset_for_new_image(image);
                self.state.remember_open_dir(path);
                self.error = None;
            }
            Err(err) => self.report_error("Cannot open image", err),
        }
    }

    fn open_with_dialog(&mut self) {
        let start_dir = self.state.settings.last_open_dir.clone();
        if let Some(path) = loader::pick_image_file(start_dir.as_deref()) {
            self.open_path(&path);
        }
    }

    fn paste_image(&mut self) {
        match clipboard::read_image_from_clipboard() {
            Ok(Some(image)) => {
                self.state.reset_for_new_image(image);
                self.error = None;
            }
            Ok(None) => log::debug!("paste ignored: clipboard holds no image"),
            Err(err) => self.report_error("Cannot paste image", err),
        }
    }

    fn copy_coordinates(&mut self, ctx: &EguiContext) -> Result<()> {
        let Some(text) = self.state.export_text()? else {
            return Ok(());
        };
        clipboard::write_text_to_clipboard(&text)?;
        self.copy_feedback_until = Some(ctx.input(|input| input.time) + COPY_FEEDBACK_SECS);
        Ok(())
    }

    fn copy_or_report(&mut self, ctx: &EguiContext) {
        if let Err(err) = self.copy_coordinates(ctx) {
            self.report_error("Copy failed", err);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &EguiContext) {
        let dropped: Vec<PathBuf> = ctx.input(|input| {
            input
                .raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        let Some(first) = dropped.first() else {
            return;
        };

        match dropped.iter().find(|path| loader::is_image_file(path)) {
            Some(path) => self.open_path(path),
            None => {
                self.error = Some(format!("Not an image file: {}", first.display()));
                log::warn!("ignored dropped file {}", first.display());
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            if self.state.text_edit.is_some() {
                self.state.cancel_text_edit();
            } else if self.state.is_placing_text_box() {
                self.state.toggle_text_box_placement();
            } else {
                self.state.selection = None;
            }
        }

        // Typing into the text box editor owns the keyboard.
        if self.state.text_edit.is_some() || ctx.wants_keyboard_input() {
            return;
        }

        let cmd = ctx.input(|input| input.modifiers.command);

        if !cmd {
            if ctx
                .input(|input| input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace))
            {
                self.state.delete_selected();
            }
            if self.state.image.is_some() && ctx.input(|input| input.key_pressed(Key::T)) {
                self.state.toggle_text_box_placement();
            }
            return;
        }

        let copy_requested = ctx.input(|input| {
            input.key_pressed(Key::C)
                || input
                    .events
                    .iter()
                    .any(|event| matches!(event, egui::Event::Copy))
        });
        if copy_requested {
            self.copy_or_report(ctx);
        }

        let paste_requested = ctx.input(|input| {
            input.key_pressed(Key::V)
                || input
                    .events
                    .iter()
                    .any(|event| matches!(event, egui::Event::Paste(_)))
        });
        if paste_requested {
            self.paste_image();
        }

        if ctx.input(|input| input.key_pressed(Key::O)) {
            self.open_with_dialog();
        }

        if ctx.input(|input| input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals)) {
            self.state.zoom_in();
        }

        if ctx.input(|input| input.key_pressed(Key::Minus)) {
            self.state.zoom_out();
        }

        if ctx.input(|input| input.key_pressed(Key::Num0)) {
            self.state.fit_zoom_to_view = true;
        }
    }

    fn show_export_preview(&self, ctx: &EguiContext) {
        egui::SidePanel::right("export_preview")
            .default_width(self.theme.layout.export_panel_width)
            .frame(ui_controls::panel_frame(&self.theme))
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(format!(
                        "Export preview · {}",
                        self.state.settings.export_format.label()
                    ))
                    .color(self.theme.text.secondary)
                    .strong(),
                );
                ui.add_space(self.theme.layout.space_2);
                ui_controls::card_frame(&self.theme).show(ui, |ui| {
                    egui::ScrollArea::both()
                        .id_source("export_preview_scroll")
                        .show(ui, |ui| match self.state.export_text() {
                            Ok(Some(text)) => {
                                ui.label(RichText::new(text).monospace());
                            }
                            Ok(None) => {
                                ui.label(
                                    RichText::new("No image loaded").color(self.theme.text.muted),
                                );
                            }
                            Err(err) => {
                                ui.label(
                                    RichText::new(format!("{err:#}"))
                                        .color(self.theme.surfaces.danger),
                                );
                            }
                        });
                });
            });
    }
}

impl App for ArrowMarkApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        let toolbar_output = TopBottomPanel::top("toolbar")
            .exact_height(self.theme.layout.toolbar_height)
            .frame(ui_controls::panel_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                toolbar::show_toolbar(ui, &mut self.state, &self.theme, width_class)
            })
            .inner;

        if let Some(message) = self.error.clone() {
            TopBottomPanel::top("error_banner")
                .frame(ui_controls::panel_frame(&self.theme))
                .show(ctx, |ui| {
                    if ui_controls::error_banner(ui, &self.theme, &message) {
                        self.error = None;
                    }
                });
        }

        let now = ctx.input(|input| input.time);
        let copied_feedback = self
            .copy_feedback_until
            .is_some_and(|deadline| now <= deadline);

        let action_output = TopBottomPanel::bottom("action_bar")
            .exact_height(self.theme.layout.action_bar_height)
            .frame(ui_controls::action_bar_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                action_bar::show_action_bar(
                    ui,
                    &self.state,
                    &self.theme,
                    copied_feedback,
                    self.preview_open,
                    width_class,
                )
            })
            .inner;

        if self.preview_open {
            self.show_export_preview(ctx);
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surfaces.app_bg)
                    .inner_margin(egui::Margin::symmetric(
                        self.theme.layout.panel_padding_x,
                        self.theme.layout.panel_padding_y,
                    )),
            )
            .show(ctx, |ui| {
                canvas::show_canvas(ui, ctx, &mut self.state, &self.theme);
            });

        if toolbar_output.open_image {
            self.open_with_dialog();
        }
        if let Some(format) = action_output.format {
            self.state.set_export_format(format);
        }
        if action_output.toggle_preview {
            self.preview_open = !self.preview_open;
        }
        if action_output.copy {
            self.copy_or_report(ctx);
        }

        if let Some(deadline) = self.copy_feedback_until {
            if now <= deadline {
                ctx.request_repaint_after(Duration::from_secs_f64(deadline - now));
            } else {
                self.copy_feedback_until = None;
            }
        }
    }
}
