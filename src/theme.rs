use egui::epaint::Shadow;
use egui::style::WidgetVisuals;
use egui::{vec2, Color32, Context, FontFamily, FontId, Margin, Rounding, Stroke, TextStyle, Visuals};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthClass {
    Compact,
    Regular,
    Wide,
}

#[derive(Clone, Debug)]
pub struct AppTheme {
    pub surfaces: SurfaceTokens,
    pub text: TextTokens,
    pub controls: ControlTokens,
    pub layout: LayoutTokens,
    pub breakpoints: Breakpoints,
    pub annotations: AnnotationTokens,
}

#[derive(Clone, Debug)]
pub struct SurfaceTokens {
    pub app_bg: Color32,
    pub panel_bg: Color32,
    pub card_bg: Color32,
    pub card_bg_alt: Color32,
    pub canvas_bg: Color32,
    pub stroke_soft: Color32,
    pub stroke_strong: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
    pub danger: Color32,
}

#[derive(Clone, Debug)]
pub struct TextTokens {
    pub primary: Color32,
    pub secondary: Color32,
    pub muted: Color32,
    pub accent: Color32,
}

#[derive(Clone, Debug)]
pub struct ControlTokens {
    pub card_rounding: f32,
    pub chip_rounding: f32,
    pub button_rounding: f32,
    pub action_height: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutTokens {
    pub space_1: f32,
    pub space_2: f32,
    pub space_3: f32,
    pub space_4: f32,
    pub panel_padding_x: f32,
    pub panel_padding_y: f32,
    pub control_gap: f32,
    pub group_gap: f32,
    pub toolbar_height: f32,
    pub action_bar_height: f32,
    pub export_panel_width: f32,
    pub chip_h: f32,
    pub chip_w_segment: f32,
}

#[derive(Clone, Debug)]
pub struct Breakpoints {
    pub compact_max: f32,
    pub regular_max: f32,
}

/// Colors and stroke widths of things drawn over the image.
#[derive(Clone, Debug)]
pub struct AnnotationTokens {
    pub arrow: Color32,
    pub arrow_selected: Color32,
    pub arrow_width: f32,
    pub arrow_selected_width: f32,
    pub arrowhead_length: f32,
    pub arrowhead_half_width: f32,
    pub text_box_fill: Color32,
    pub text_box_stroke: Color32,
    pub text_box_selected_stroke: Color32,
    pub resize_handle: Color32,
    pub resize_handle_size: f32,
}

impl AppTheme {
    pub fn width_class(&self, width: f32) -> WidthClass {
        width_class(width, &self.breakpoints)
    }
}

pub fn width_class(width: f32, breakpoints: &Breakpoints) -> WidthClass {
    if width <= breakpoints.compact_max {
        WidthClass::Compact
    } else if width <= breakpoints.regular_max {
        WidthClass::Regular
    } else {
        WidthClass::Wide
    }
}

/// Graphite chrome around the image; annotations keep the classic red/blue.
pub fn workbench_theme() -> AppTheme {
    let accent = Color32::from_rgb(0x3B, 0x82, 0xF6);
    AppTheme {
        surfaces: SurfaceTokens {
            app_bg: Color32::from_rgb(0x1E, 0x1F, 0x24),
            panel_bg: Color32::from_rgb(0x25, 0x27, 0x2D),
            card_bg: Color32::from_rgb(0x2D, 0x30, 0x37),
            card_bg_alt: Color32::from_rgb(0x29, 0x2B, 0x32),
            canvas_bg: Color32::from_rgb(0x16, 0x17, 0x1B),
            stroke_soft: Color32::from_white_alpha(24),
            stroke_strong: Color32::from_white_alpha(56),
            accent,
            accent_soft: accent.gamma_multiply(0.35),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
        },
        text: TextTokens {
            primary: Color32::from_rgb(0xF1, 0xF3, 0xF7),
            secondary: Color32::from_rgb(0xBC, 0xC3, 0xD0),
            muted: Color32::from_rgb(0x8B, 0x93, 0xA3),
            accent: Color32::from_rgb(0x93, 0xC5, 0xFD),
        },
        controls: ControlTokens {
            card_rounding: 10.0,
            chip_rounding: 6.0,
            button_rounding: 6.0,
            action_height: 30.0,
        },
        layout: LayoutTokens {
            space_1: 4.0,
            space_2: 8.0,
            space_3: 12.0,
            space_4: 16.0,
            panel_padding_x: 10.0,
            panel_padding_y: 6.0,
            control_gap: 6.0,
            group_gap: 14.0,
            toolbar_height: 42.0,
            action_bar_height: 48.0,
            export_panel_width: 320.0,
            chip_h: 28.0,
            chip_w_segment: 84.0,
        },
        breakpoints: Breakpoints {
            compact_max: 820.0,
            regular_max: 1180.0,
        },
        annotations: AnnotationTokens {
            arrow: Color32::from_rgb(0xE5, 0x3E, 0x3E),
            arrow_selected: Color32::from_rgb(0x25, 0x63, 0xEB),
            arrow_width: 2.0,
            arrow_selected_width: 3.0,
            arrowhead_length: 12.0,
            arrowhead_half_width: 6.0,
            text_box_fill: Color32::from_rgba_unmultiplied(255, 255, 255, 230),
            text_box_stroke: Color32::from_black_alpha(90),
            text_box_selected_stroke: Color32::from_rgb(0x25, 0x63, 0xEB),
            resize_handle: Color32::from_rgb(0x25, 0x63, 0xEB),
            resize_handle_size: 8.0,
        },
    }
}

fn widget_state(
    base: WidgetVisuals,
    fill: Color32,
    outline: Color32,
    foreground: Color32,
    rounding: f32,
) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: fill,
        weak_bg_fill: fill,
        bg_stroke: Stroke::new(1.0, outline),
        fg_stroke: Stroke::new(1.0, foreground),
        rounding: Rounding::same(rounding),
        ..base
    }
}

pub fn apply_theme(ctx: &Context, theme: &AppTheme) {
    let surfaces = &theme.surfaces;
    let text = &theme.text;
    let rounding = theme.controls.button_rounding;

    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(text.primary);
    visuals.panel_fill = surfaces.panel_bg;
    visuals.window_fill = surfaces.panel_bg;
    visuals.extreme_bg_color = surfaces.app_bg;
    visuals.code_bg_color = surfaces.card_bg_alt;
    visuals.window_rounding = Rounding::same(theme.controls.card_rounding);
    visuals.window_shadow = Shadow {
        offset: vec2(0.0, 8.0),
        blur: 20.0,
        spread: 0.0,
        color: Color32::from_black_alpha(100),
    };
    visuals.selection.bg_fill = surfaces.accent_soft;
    visuals.selection.stroke = Stroke::new(1.0, surfaces.accent);

    let widgets = &mut visuals.widgets;
    widgets.noninteractive = widget_state(
        widgets.noninteractive,
        surfaces.panel_bg,
        surfaces.stroke_soft,
        text.secondary,
        rounding,
    );
    widgets.inactive = widget_state(
        widgets.inactive,
        surfaces.card_bg_alt,
        surfaces.stroke_soft,
        text.secondary,
        rounding,
    );
    widgets.hovered = widget_state(
        widgets.hovered,
        surfaces.card_bg,
        surfaces.stroke_strong,
        text.primary,
        rounding,
    );
    widgets.active = widget_state(
        widgets.active,
        surfaces.accent_soft,
        surfaces.accent,
        text.primary,
        rounding,
    );
    widgets.open = widgets.hovered;

    ctx.style_mut(|style| {
        style.visuals = visuals;
        style.spacing.item_spacing = vec2(theme.layout.control_gap, theme.layout.space_2);
        style.spacing.button_padding = vec2(theme.layout.space_3, theme.layout.space_1);
        style.spacing.window_margin = Margin::same(theme.layout.space_3);

        for (text_style, size, family) in [
            (TextStyle::Body, 14.5, FontFamily::Proportional),
            (TextStyle::Button, 14.0, FontFamily::Proportional),
            (TextStyle::Small, 12.0, FontFamily::Proportional),
            (TextStyle::Monospace, 12.5, FontFamily::Monospace),
        ] {
            style.text_styles.insert(text_style, FontId::new(size, family));
        }
    });
}
