use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use egui::{ColorImage, Context as EguiContext, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::annotation::{Arrow, Endpoint, Point, SegmentId, TextBox, TextBoxId};
use crate::export::{self, ExportFormat, ImageSize};
use crate::gesture::DoubleClickRecognizer;

pub const ZOOM_STEPS: &[f32] = &[0.25, 0.33, 0.5, 0.67, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0];

/// Arrows shorter than this are dropped instead of committed.
pub const MIN_ARROW_LENGTH: f32 = 1.0;
pub const NEW_TEXT_BOX_TEXT: &str = "Text";

pub struct EditorImage {
    pub dynamic: DynamicImage,
    pub texture: Option<TextureHandle>,
}

impl EditorImage {
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.dynamic.width(),
            height: self.dynamic.height(),
        }
    }

    pub fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.dynamic.width() as f32, self.dynamic.height() as f32)
    }

    pub fn ensure_texture(&mut self, ctx: &EguiContext) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.dynamic.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture = Some(ctx.load_texture("annotated_image", color, TextureOptions::LINEAR));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Arrow(usize),
    TextBox(TextBoxId),
}

/// The single pointer gesture in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Idle,
    /// Armed by the toolbar; the next click on empty canvas drops a text box.
    PlacingTextBox,
    DrawingNewArrow {
        start: Point,
        current: Point,
    },
    ExtendingArrowFromEndpoint {
        source: usize,
        from: Endpoint,
        segment_id: SegmentId,
        anchor: Point,
        current: Point,
    },
    DraggingTextBox {
        id: TextBoxId,
        grab_offset: Vec2,
    },
    ResizingTextBox {
        id: TextBoxId,
    },
}

#[derive(Clone, Debug)]
pub struct TextEditState {
    pub id: TextBoxId,
    pub buffer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub double_click_ms: u64,
    pub export_format: ExportFormat,
    pub text_box_width: f32,
    pub text_box_height: f32,
    pub text_color: [u8; 4],
    pub last_open_dir: Option<PathBuf>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
            export_format: ExportFormat::Report,
            text_box_width: 200.0,
            text_box_height: 60.0,
            text_color: [0x1A, 0x20, 0x2C, 0xFF],
            last_open_dir: None,
        }
    }
}

pub struct EditorState {
    pub image: Option<EditorImage>,
    pub arrows: Vec<Arrow>,
    pub text_boxes: Vec<TextBox>,
    pub selection: Option<Selection>,
    pub gesture: Gesture,
    pub text_edit: Option<TextEditState>,
    pub zoom: f32,
    pub fit_zoom_to_view: bool,
    pub settings: UserSettings,
    double_click: DoubleClickRecognizer,
    next_text_box_id: TextBoxId,
    next_segment_id: SegmentId,
}

impl Default for EditorState {
    fn default() -> Self {
        let settings = UserSettings::load().unwrap_or_else(|err| {
            log::debug!("using default settings: {err:#}");
            UserSettings::default()
        });
        Self::with_settings(settings)
    }
}

impl EditorState {
    pub fn with_settings(settings: UserSettings) -> Self {
        Self {
            image: None,
            arrows: Vec::new(),
            text_boxes: Vec::new(),
            selection: None,
            gesture: Gesture::Idle,
            text_edit: None,
            zoom: 1.0,
            fit_zoom_to_view: true,
            double_click: DoubleClickRecognizer::new(settings.double_click_ms),
            settings,
            next_text_box_id: 1,
            next_segment_id: 1,
        }
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.image.as_ref().map(EditorImage::size)
    }

    /// Swaps in a new image and drops every annotation of the previous one.
    pub fn reset_for_new_image(&mut self, image: DynamicImage) {
        log::info!("loaded image {}x{}", image.width(), image.height());
        self.image = Some(EditorImage {
            dynamic: image,
            texture: None,
        });
        self.arrows.clear();
        self.text_boxes.clear();
        self.selection = None;
        self.gesture = Gesture::Idle;
        self.text_edit = None;
        self.double_click.reset();
        self.zoom = 1.0;
        self.fit_zoom_to_view = true;
    }

    pub fn pointer_down(&mut self, pos: Point, now: f64) {
        if self.image.is_none() || self.text_edit.is_some() {
            return;
        }
        if !matches!(self.gesture, Gesture::Idle | Gesture::PlacingTextBox) {
            return;
        }

        if let Some(Selection::TextBox(id)) = self.selection {
            if self
                .find_text_box(id)
                .is_some_and(|text_box| text_box.hits_resize_handle(pos))
            {
                self.gesture = Gesture::ResizingTextBox { id };
                return;
            }
        }

        if let Some(id) = self.hit_text_box(pos) {
            self.press_text_box(id, pos, now);
            return;
        }

        if self.gesture == Gesture::PlacingTextBox {
            self.place_text_box(pos);
            return;
        }

        if let Some((source, from)) = self.hit_endpoint(pos) {
            self.begin_extending(source, from);
            return;
        }

        if let Some(index) = self.hit_arrow(pos) {
            log::debug!("selected arrow {index}");
            self.selection = Some(Selection::Arrow(index));
            return;
        }

        self.selection = None;
        self.gesture = Gesture::DrawingNewArrow {
            start: pos,
            current: pos,
        };
    }

    pub fn pointer_move(&mut self, pos: Point) {
        match self.gesture {
            Gesture::DrawingNewArrow { start, .. } => {
                self.gesture = Gesture::DrawingNewArrow {
                    start,
                    current: pos,
                };
            }
            Gesture::ExtendingArrowFromEndpoint {
                source,
                from,
                segment_id,
                anchor,
                ..
            } => {
                self.gesture = Gesture::ExtendingArrowFromEndpoint {
                    source,
                    from,
                    segment_id,
                    anchor,
                    current: pos,
                };
            }
            Gesture::DraggingTextBox { id, grab_offset } => {
                if let Some(text_box) = self.find_text_box_mut(id) {
                    text_box.position = pos.offset(grab_offset);
                }
            }
            Gesture::ResizingTextBox { id } => {
                if let Some(text_box) = self.find_text_box_mut(id) {
                    text_box.resize_to(pos);
                }
            }
            Gesture::Idle | Gesture::PlacingTextBox => {}
        }
    }

    pub fn pointer_up(&mut self, pos: Point) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::DrawingNewArrow { start, .. } => self.commit_new_arrow(start, pos),
            Gesture::ExtendingArrowFromEndpoint {
                from,
                segment_id,
                anchor,
                ..
            } => self.commit_extension(from, segment_id, anchor, pos, true),
            Gesture::PlacingTextBox => self.gesture = Gesture::PlacingTextBox,
            Gesture::DraggingTextBox { .. } | Gesture::ResizingTextBox { .. } | Gesture::Idle => {}
        }
    }

    /// Pointer left the canvas. An arrow in progress is kept as drawn so far,
    /// but unlike `pointer_up` it never merges into another chain.
    pub fn pointer_leave(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::DrawingNewArrow { start, current } => self.commit_new_arrow(start, current),
            Gesture::ExtendingArrowFromEndpoint {
                from,
                segment_id,
                anchor,
                current,
                ..
            } => self.commit_extension(from, segment_id, anchor, current, false),
            Gesture::PlacingTextBox => self.gesture = Gesture::PlacingTextBox,
            Gesture::DraggingTextBox { .. } | Gesture::ResizingTextBox { .. } | Gesture::Idle => {}
        }
    }

    /// Straight preview of the arrow being drawn, if any.
    pub fn in_progress_arrow(&self) -> Option<Arrow> {
        match self.gesture {
            Gesture::DrawingNewArrow { start, current } => Some(Arrow::new(start, current)),
            Gesture::ExtendingArrowFromEndpoint {
                from,
                segment_id,
                anchor,
                current,
                ..
            } => Some(Arrow {
                segment_id: Some(segment_id),
                is_end_segment: from == Endpoint::End,
                ..Arrow::new(anchor, current)
            }),
            _ => None,
        }
    }

    pub fn is_placing_text_box(&self) -> bool {
        self.gesture == Gesture::PlacingTextBox
    }

    pub fn toggle_text_box_placement(&mut self) {
        self.gesture = match self.gesture {
            Gesture::Idle => Gesture::PlacingTextBox,
            Gesture::PlacingTextBox => Gesture::Idle,
            other => other,
        };
    }

    pub fn is_dragging(&self, id: TextBoxId) -> bool {
        matches!(self.gesture, Gesture::DraggingTextBox { id: dragged, .. } if dragged == id)
    }

    pub fn is_editing(&self, id: TextBoxId) -> bool {
        self.text_edit.as_ref().is_some_and(|edit| edit.id == id)
    }

    pub fn selected_arrow(&self) -> Option<usize> {
        match self.selection {
            Some(Selection::Arrow(index)) if index < self.arrows.len() => Some(index),
            _ => None,
        }
    }

    pub fn selected_curvature(&self) -> Option<f32> {
        self.selected_arrow().map(|index| self.arrows[index].curvature)
    }

    pub fn set_selected_curvature(&mut self, value: f32) -> bool {
        let Some(index) = self.selected_arrow() else {
            return false;
        };
        self.arrows[index].set_curvature(value);
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        if !matches!(self.gesture, Gesture::Idle | Gesture::PlacingTextBox) {
            return false;
        }
        match self.selection.take() {
            Some(Selection::Arrow(index)) if index < self.arrows.len() => {
                self.arrows.remove(index);
                log::debug!("deleted arrow {index}");
                true
            }
            Some(Selection::TextBox(id)) => {
                let before = self.text_boxes.len();
                self.text_boxes.retain(|text_box| text_box.id != id);
                self.double_click.forget(id);
                if self.is_editing(id) {
                    self.text_edit = None;
                }
                self.text_boxes.len() != before
            }
            _ => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.arrows.clear();
        self.text_boxes.clear();
        self.selection = None;
        self.text_edit = None;
        self.gesture = Gesture::Idle;
        self.double_click.reset();
        log::debug!("cleared all annotations");
    }

    pub fn begin_text_edit(&mut self, id: TextBoxId) {
        let Some(text_box) = self.find_text_box(id) else {
            return;
        };
        self.text_edit = Some(TextEditState {
            id,
            buffer: text_box.text.clone(),
        });
        self.selection = Some(Selection::TextBox(id));
    }

    pub fn commit_text_edit(&mut self) {
        let Some(edit) = self.text_edit.take() else {
            return;
        };
        if let Some(text_box) = self.find_text_box_mut(edit.id) {
            text_box.text = edit.buffer.trim().to_string();
        }
    }

    pub fn cancel_text_edit(&mut self) {
        self.text_edit = None;
    }

    pub fn export_text(&self) -> Result<Option<String>> {
        let Some(size) = self.image_size() else {
            return Ok(None);
        };
        export::export(
            self.settings.export_format,
            &self.arrows,
            &self.text_boxes,
            size,
        )
        .map(Some)
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        if self.settings.export_format == format {
            return;
        }
        self.settings.export_format = format;
        self.save_settings();
    }

    pub fn remember_open_dir(&mut self, file: &Path) {
        let Some(dir) = file.parent() else {
            return;
        };
        if self.settings.last_open_dir.as_deref() == Some(dir) {
            return;
        }
        self.settings.last_open_dir = Some(dir.to_path_buf());
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Err(err) = self.settings.save() {
            log::warn!("cannot save settings: {err:#}");
        }
    }

    pub fn find_text_box(&self, id: TextBoxId) -> Option<&TextBox> {
        self.text_boxes.iter().find(|text_box| text_box.id == id)
    }

    pub fn find_text_box_mut(&mut self, id: TextBoxId) -> Option<&mut TextBox> {
        self.text_boxes.iter_mut().find(|text_box| text_box.id == id)
    }

    pub fn hit_text_box(&self, pos: Point) -> Option<TextBoxId> {
        self.text_boxes
            .iter()
            .rev()
            .find(|text_box| text_box.contains(pos))
            .map(|text_box| text_box.id)
    }

    pub fn hit_arrow(&self, pos: Point) -> Option<usize> {
        self.arrows.iter().rposition(|arrow| arrow.contains(pos))
    }

    /// Nearest arrow endpoint within the snap radius.
    pub fn hit_endpoint(&self, pos: Point) -> Option<(usize, Endpoint)> {
        self.arrows
            .iter()
            .enumerate()
            .filter_map(|(index, arrow)| {
                let which = arrow.snap_endpoint(pos)?;
                Some((index, which, arrow.endpoint(which).distance(pos)))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(index, which, _)| (index, which))
    }

    pub fn nearest_zoom_step(&self) -> usize {
        let mut best_idx = 0usize;
        let mut best_diff = f32::MAX;
        for (idx, step) in ZOOM_STEPS.iter().enumerate() {
            let diff = (self.zoom - step).abs();
            if diff < best_diff {
                best_diff = diff;
                best_idx = idx;
            }
        }
        best_idx
    }

    pub fn zoom_in(&mut self) {
        let idx = self.nearest_zoom_step();
        if idx + 1 < ZOOM_STEPS.len() {
            self.zoom = ZOOM_STEPS[idx + 1];
        }
    }

    pub fn zoom_out(&mut self) {
        let idx = self.nearest_zoom_step();
        if idx > 0 {
            self.zoom = ZOOM_STEPS[idx - 1];
        }
    }

    pub fn set_fit_zoom(&mut self, image_size: Vec2, view_size: Vec2) {
        let width_scale = (view_size.x / image_size.x.max(1.0)).max(0.05);
        let height_scale = (view_size.y / image_size.y.max(1.0)).max(0.05);
        self.zoom = width_scale.min(height_scale).clamp(0.1, 4.0);
    }

    fn press_text_box(&mut self, id: TextBoxId, pos: Point, now: f64) {
        self.selection = Some(Selection::TextBox(id));
        if self.double_click.register(id, now) {
            log::debug!("editing text box {id}");
            self.gesture = Gesture::Idle;
            self.begin_text_edit(id);
            return;
        }
        let Some(position) = self.find_text_box(id).map(|text_box| text_box.position) else {
            return;
        };
        self.gesture = Gesture::DraggingTextBox {
            id,
            grab_offset: pos.delta(position),
        };
    }

    fn place_text_box(&mut self, pos: Point) {
        let id = self.next_text_box_id;
        self.next_text_box_id = self.next_text_box_id.saturating_add(1);
        self.text_boxes.push(TextBox {
            id,
            position: pos,
            text: NEW_TEXT_BOX_TEXT.to_string(),
            width: self.settings.text_box_width,
            height: self.settings.text_box_height,
            color: self.settings.text_color,
        });
        self.selection = Some(Selection::TextBox(id));
        self.gesture = Gesture::Idle;
        log::debug!("placed text box {id} at ({:.1}, {:.1})", pos.x, pos.y);
    }

    fn next_segment(&mut self) -> SegmentId {
        let id = self.next_segment_id;
        self.next_segment_id = self.next_segment_id.saturating_add(1);
        id
    }

    fn begin_extending(&mut self, source: usize, from: Endpoint) {
        let segment_id = match self.arrows[source].segment_id {
            Some(id) => id,
            None => {
                let id = self.next_segment();
                let arrow = &mut self.arrows[source];
                arrow.segment_id = Some(id);
                arrow.is_end_segment = from == Endpoint::Start;
                id
            }
        };
        let anchor = self.arrows[source].endpoint(from);
        log::debug!("extending arrow {source} from {from:?} in segment {segment_id}");
        self.gesture = Gesture::ExtendingArrowFromEndpoint {
            source,
            from,
            segment_id,
            anchor,
            current: anchor,
        };
    }

    fn commit_new_arrow(&mut self, start: Point, end: Point) {
        if start.distance(end) < MIN_ARROW_LENGTH {
            return;
        }
        self.arrows.push(Arrow::new(start, end));
        self.selection = Some(Selection::Arrow(self.arrows.len() - 1));
    }

    fn commit_extension(
        &mut self,
        from: Endpoint,
        segment_id: SegmentId,
        anchor: Point,
        end: Point,
        allow_merge: bool,
    ) {
        if anchor.distance(end) < MIN_ARROW_LENGTH {
            self.dissolve_single_arrow_segment(segment_id);
            return;
        }

        let mut arrow = Arrow::new(anchor, end);
        arrow.segment_id = Some(segment_id);
        arrow.is_end_segment = from == Endpoint::End;
        if arrow.is_end_segment {
            for other in self.arrows_in_segment_mut(segment_id) {
                other.is_end_segment = false;
            }
        }

        if allow_merge {
            if let Some(target) = self.merge_target(end, segment_id) {
                self.merge_segments(segment_id, target);
                arrow.is_end_segment = false;
            }
        }

        self.arrows.push(arrow);
        self.selection = Some(Selection::Arrow(self.arrows.len() - 1));
    }

    /// Arrow in another chain (or no chain) whose endpoint is within snap range.
    fn merge_target(&self, pos: Point, segment_id: SegmentId) -> Option<usize> {
        self.arrows
            .iter()
            .enumerate()
            .filter(|(_, arrow)| arrow.segment_id != Some(segment_id))
            .filter_map(|(index, arrow)| {
                let which = arrow.snap_endpoint(pos)?;
                Some((index, arrow.endpoint(which).distance(pos)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Pulls `target` and its whole chain into `segment_id`; `target` becomes
    /// the only end of the merged chain.
    fn merge_segments(&mut self, segment_id: SegmentId, target: usize) {
        let absorbed = self.arrows[target].segment_id;
        log::debug!("merging arrow {target} (segment {absorbed:?}) into segment {segment_id}");
        for (index, arrow) in self.arrows.iter_mut().enumerate() {
            let in_chain = arrow.segment_id == Some(segment_id)
                || (absorbed.is_some() && arrow.segment_id == absorbed);
            if index == target || in_chain {
                arrow.segment_id = Some(segment_id);
                arrow.is_end_segment = index == target;
            }
        }
    }

    // An extension that produced nothing must not leave its source as a
    // headless one-arrow chain.
    fn dissolve_single_arrow_segment(&mut self, segment_id: SegmentId) {
        if self.arrows_in_segment_mut(segment_id).count() != 1 {
            return;
        }
        for arrow in self.arrows_in_segment_mut(segment_id) {
            arrow.segment_id = None;
            arrow.is_end_segment = false;
        }
    }

    fn arrows_in_segment_mut(&mut self, segment_id: SegmentId) -> impl Iterator<Item = &mut Arrow> {
        self.arrows
            .iter_mut()
            .filter(move |arrow| arrow.segment_id == Some(segment_id))
    }
}

impl UserSettings {
    fn file_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("com", "arrowmark", "arrowmark")?;
        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir).ok()?;
        Some(config_dir.join("settings.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        std::fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::DynamicImage;

    use super::{EditorState, Gesture, Selection, UserSettings, NEW_TEXT_BOX_TEXT};
    use crate::annotation::{Arrow, Point};

    fn editor() -> EditorState {
        let mut state = EditorState::with_settings(UserSettings::default());
        state.reset_for_new_image(DynamicImage::new_rgba8(800, 600));
        state
    }

    fn draw(state: &mut EditorState, from: (f32, f32), to: (f32, f32)) {
        state.pointer_down(Point::new(from.0, from.1), 0.0);
        state.pointer_move(Point::new(to.0, to.1));
        state.pointer_up(Point::new(to.0, to.1));
    }

    fn place_text_box(state: &mut EditorState, at: (f32, f32)) -> u64 {
        state.toggle_text_box_placement();
        state.pointer_down(Point::new(at.0, at.1), 0.0);
        state.pointer_up(Point::new(at.0, at.1));
        match state.selection {
            Some(Selection::TextBox(id)) => id,
            other => panic!("expected text box selection, got {other:?}"),
        }
    }

    fn end_flags(state: &EditorState) -> Vec<bool> {
        state.arrows.iter().map(|arrow| arrow.is_end_segment).collect()
    }

    #[test]
    fn drawing_creates_straight_selected_arrow() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (200.0, 100.0));

        assert_eq!(state.arrows.len(), 1);
        let arrow = &state.arrows[0];
        assert_eq!(arrow.start, Point::new(100.0, 100.0));
        assert_eq!(arrow.end, Point::new(200.0, 100.0));
        assert_eq!(arrow.curvature, 0.0);
        assert_eq!(arrow.segment_id, None);
        assert_eq!(state.selection, Some(Selection::Arrow(0)));
        assert_eq!(state.gesture, Gesture::Idle);
    }

    #[test]
    fn exporter_reports_drawn_arrow() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (200.0, 100.0));
        let report = state
            .export_text()
            .expect("export")
            .expect("image is loaded");
        assert!(report.contains("Start:(100,100) End:(200,100) Length:100.00 Angle:0.00"));
    }

    #[test]
    fn click_without_drag_creates_nothing() {
        let mut state = editor();
        draw(&mut state, (50.0, 50.0), (50.0, 50.0));
        assert!(state.arrows.is_empty());
        assert_eq!(state.selection, None);
    }

    #[test]
    fn pointer_events_without_image_are_ignored() {
        let mut state = EditorState::with_settings(UserSettings::default());
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        assert!(state.arrows.is_empty());
        assert!(state.export_text().expect("export").is_none());
    }

    #[test]
    fn hit_test_is_idempotent_after_selection() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0));
        draw(&mut state, (100.0, 300.0), (300.0, 300.0));

        let probe = Point::new(200.0, 104.0);
        state.pointer_down(probe, 1.0);
        state.pointer_up(probe);
        assert_eq!(state.selection, Some(Selection::Arrow(0)));
        assert_eq!(state.hit_arrow(probe), Some(0));
        assert_eq!(state.hit_arrow(probe), Some(0));
    }

    #[test]
    fn curved_arrow_is_hit_along_the_curve() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0));
        assert!(state.set_selected_curvature(0.5));
        state.selection = None;

        // Apex is curvature * length / 4 = 25 px below the chord.
        let apex = Point::new(200.0, 125.0);
        state.pointer_down(apex, 1.0);
        assert_eq!(state.selection, Some(Selection::Arrow(0)));
        assert_eq!(state.gesture, Gesture::Idle);
    }

    #[test]
    fn curvature_only_touches_selected_arrow() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0));
        draw(&mut state, (100.0, 300.0), (300.0, 300.0));

        assert!(state.set_selected_curvature(0.8));
        assert_eq!(state.arrows[1].curvature, 0.5);
        assert_eq!(state.arrows[0].curvature, 0.0);

        state.selection = None;
        assert!(!state.set_selected_curvature(0.2));
        assert_eq!(state.selected_curvature(), None);
    }

    #[test]
    fn extending_into_another_arrow_merges_chains() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0)); // A
        draw(&mut state, (200.0, 0.0), (300.0, 0.0)); // B

        state.pointer_down(Point::new(102.0, 1.0), 1.0);
        assert!(matches!(
            state.gesture,
            Gesture::ExtendingArrowFromEndpoint { source: 0, .. }
        ));
        state.pointer_move(Point::new(150.0, 5.0));
        state.pointer_up(Point::new(198.0, 2.0));

        assert_eq!(state.arrows.len(), 3);
        let segment = state.arrows[0].segment_id;
        assert!(segment.is_some());
        assert_eq!(state.arrows[1].segment_id, segment);
        assert_eq!(state.arrows[2].segment_id, segment);
        assert_eq!(end_flags(&state), vec![false, true, false]);
        assert_eq!(state.arrows[2].start, Point::new(100.0, 0.0));
        assert_eq!(state.selection, Some(Selection::Arrow(2)));
    }

    #[test]
    fn extending_into_empty_space_moves_the_arrowhead() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));

        state.pointer_down(Point::new(100.0, 0.0), 1.0);
        state.pointer_up(Point::new(100.0, 80.0));

        assert_eq!(state.arrows.len(), 2);
        assert_eq!(state.arrows[0].segment_id, state.arrows[1].segment_id);
        assert_eq!(end_flags(&state), vec![false, true]);
        assert!(!state.arrows[0].shows_arrowhead());
        assert!(state.arrows[1].shows_arrowhead());
    }

    #[test]
    fn extending_from_start_keeps_source_as_end() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (200.0, 100.0));

        state.pointer_down(Point::new(100.0, 100.0), 1.0);
        state.pointer_up(Point::new(100.0, 200.0));

        assert_eq!(end_flags(&state), vec![true, false]);
        assert_eq!(state.arrows[1].start, Point::new(100.0, 100.0));
    }

    #[test]
    fn continuing_a_chain_hands_over_the_end() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        state.pointer_down(Point::new(100.0, 0.0), 1.0);
        state.pointer_up(Point::new(100.0, 100.0));
        state.pointer_down(Point::new(100.0, 100.0), 2.0);
        state.pointer_up(Point::new(200.0, 100.0));

        assert_eq!(state.arrows.len(), 3);
        assert_eq!(end_flags(&state), vec![false, false, true]);
        let segment = state.arrows[0].segment_id;
        assert!(state.arrows.iter().all(|arrow| arrow.segment_id == segment));
    }

    #[test]
    fn merging_absorbs_the_whole_target_chain() {
        let mut state = editor();
        // Chain X: two arrows.
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        state.pointer_down(Point::new(100.0, 0.0), 1.0);
        state.pointer_up(Point::new(100.0, 100.0));
        // Chain Y: two arrows far away.
        draw(&mut state, (400.0, 0.0), (500.0, 0.0));
        state.pointer_down(Point::new(500.0, 0.0), 2.0);
        state.pointer_up(Point::new(500.0, 100.0));

        // Extend X's end onto Y's first start.
        state.pointer_down(Point::new(100.0, 100.0), 3.0);
        state.pointer_up(Point::new(400.0, 0.0));

        let segment = state.arrows[0].segment_id;
        assert!(state.arrows.iter().all(|arrow| arrow.segment_id == segment));
        assert_eq!(end_flags(&state).iter().filter(|flag| **flag).count(), 1);
        assert!(state.arrows[2].is_end_segment);
    }

    #[test]
    fn pointer_leave_commits_without_merging() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0)); // A
        draw(&mut state, (200.0, 0.0), (300.0, 0.0)); // B

        state.pointer_down(Point::new(100.0, 0.0), 1.0);
        state.pointer_move(Point::new(199.0, 1.0));
        state.pointer_leave();

        assert_eq!(state.arrows.len(), 3);
        assert_ne!(state.arrows[1].segment_id, state.arrows[0].segment_id);
        assert_eq!(state.arrows[1].segment_id, None);
        assert_eq!(state.arrows[2].segment_id, state.arrows[0].segment_id);
        assert_eq!(state.arrows[2].end, Point::new(199.0, 1.0));
        assert!(state.arrows[2].is_end_segment);
        assert_eq!(state.gesture, Gesture::Idle);
    }

    #[test]
    fn pointer_leave_commits_plain_drawing() {
        let mut state = editor();
        state.pointer_down(Point::new(10.0, 10.0), 0.0);
        state.pointer_move(Point::new(60.0, 10.0));
        state.pointer_leave();

        assert_eq!(state.arrows, vec![Arrow::new(Point::new(10.0, 10.0), Point::new(60.0, 10.0))]);
        assert_eq!(state.selection, Some(Selection::Arrow(0)));
    }

    #[test]
    fn aborted_extension_restores_standalone_arrow() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        state.pointer_down(Point::new(100.0, 0.0), 1.0);
        state.pointer_up(Point::new(100.0, 0.0));

        assert_eq!(state.arrows.len(), 1);
        assert_eq!(state.arrows[0].segment_id, None);
        assert!(state.arrows[0].shows_arrowhead());
    }

    #[test]
    fn placing_text_box_arms_once() {
        let mut state = editor();
        let id = place_text_box(&mut state, (50.0, 60.0));

        let text_box = state.find_text_box(id).expect("text box exists");
        assert_eq!(text_box.position, Point::new(50.0, 60.0));
        assert_eq!(text_box.text, NEW_TEXT_BOX_TEXT);
        assert_eq!(text_box.width, 200.0);
        assert!(!state.is_placing_text_box());

        // Next click on empty canvas draws an arrow instead.
        state.pointer_down(Point::new(400.0, 400.0), 1.0);
        assert!(matches!(state.gesture, Gesture::DrawingNewArrow { .. }));
    }

    #[test]
    fn dragging_text_box_keeps_grab_offset() {
        let mut state = editor();
        let id = place_text_box(&mut state, (50.0, 60.0));

        state.pointer_down(Point::new(60.0, 70.0), 5.0);
        assert!(state.is_dragging(id));
        state.pointer_move(Point::new(160.0, 90.0));
        state.pointer_up(Point::new(160.0, 90.0));

        let text_box = state.find_text_box(id).expect("text box exists");
        assert_eq!(text_box.position, Point::new(150.0, 80.0));
        assert!(!state.is_dragging(id));
    }

    #[test]
    fn double_click_enters_edit_mode() {
        let mut state = editor();
        let id = place_text_box(&mut state, (50.0, 60.0));

        state.pointer_down(Point::new(60.0, 70.0), 5.0);
        state.pointer_up(Point::new(60.0, 70.0));
        state.pointer_down(Point::new(60.0, 70.0), 5.2);
        state.pointer_up(Point::new(60.0, 70.0));

        assert!(state.is_editing(id));
        assert_eq!(state.gesture, Gesture::Idle);

        if let Some(edit) = state.text_edit.as_mut() {
            edit.buffer = "  Hello there  ".to_string();
        }
        state.commit_text_edit();
        assert!(!state.is_editing(id));
        assert_eq!(state.find_text_box(id).map(|b| b.text.as_str()), Some("Hello there"));
    }

    #[test]
    fn slow_second_click_drags_again() {
        let mut state = editor();
        let id = place_text_box(&mut state, (50.0, 60.0));

        state.pointer_down(Point::new(60.0, 70.0), 5.0);
        state.pointer_up(Point::new(60.0, 70.0));
        state.pointer_down(Point::new(60.0, 70.0), 6.0);

        assert!(!state.is_editing(id));
        assert!(state.is_dragging(id));
    }

    #[test]
    fn cancelled_edit_keeps_text() {
        let mut state = editor();
        let id = place_text_box(&mut state, (50.0, 60.0));
        state.begin_text_edit(id);
        if let Some(edit) = state.text_edit.as_mut() {
            edit.buffer = "changed".to_string();
        }
        state.cancel_text_edit();
        assert_eq!(state.find_text_box(id).map(|b| b.text.as_str()), Some(NEW_TEXT_BOX_TEXT));
    }

    #[test]
    fn resize_handle_of_selected_box() {
        let mut state = editor();
        let id = place_text_box(&mut state, (50.0, 60.0));

        // Corner sits at (250, 120); grab slightly outside the box.
        state.pointer_down(Point::new(253.0, 122.0), 5.0);
        assert_eq!(state.gesture, Gesture::ResizingTextBox { id });
        state.pointer_move(Point::new(350.0, 200.0));
        state.pointer_up(Point::new(350.0, 200.0));

        let text_box = state.find_text_box(id).expect("text box exists");
        assert_eq!(text_box.width, 300.0);
        assert_eq!(text_box.height, 140.0);
    }

    #[test]
    fn text_box_wins_over_arrow_underneath() {
        let mut state = editor();
        draw(&mut state, (0.0, 80.0), (400.0, 80.0));
        let id = place_text_box(&mut state, (100.0, 60.0));
        state.selection = None;

        state.pointer_down(Point::new(150.0, 80.0), 9.0);
        assert_eq!(state.selection, Some(Selection::TextBox(id)));
    }

    #[test]
    fn delete_removes_exactly_one_entity() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        draw(&mut state, (0.0, 200.0), (100.0, 200.0));
        let id = place_text_box(&mut state, (300.0, 300.0));

        assert!(state.delete_selected());
        assert!(state.find_text_box(id).is_none());
        assert_eq!(state.arrows.len(), 2);

        state.selection = Some(Selection::Arrow(0));
        assert!(state.delete_selected());
        assert_eq!(state.arrows.len(), 1);
        assert_eq!(state.arrows[0].start, Point::new(0.0, 200.0));
        assert_eq!(state.selection, None);
        assert!(!state.delete_selected());
    }

    #[test]
    fn clear_all_empties_everything() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        draw(&mut state, (0.0, 200.0), (100.0, 200.0));
        place_text_box(&mut state, (300.0, 300.0));

        state.clear_all();
        assert!(state.arrows.is_empty());
        assert!(state.text_boxes.is_empty());
        assert_eq!(state.selection, None);
    }

    #[test]
    fn new_image_discards_annotations() {
        let mut state = editor();
        draw(&mut state, (0.0, 0.0), (100.0, 0.0));
        place_text_box(&mut state, (300.0, 300.0));

        state.reset_for_new_image(DynamicImage::new_rgba8(32, 16));
        assert!(state.arrows.is_empty());
        assert!(state.text_boxes.is_empty());
        assert_eq!(state.selection, None);
        assert_eq!(state.image_size().map(|size| size.width), Some(32));
    }

    #[test]
    fn preview_arrow_is_straight() {
        let mut state = editor();
        state.pointer_down(Point::new(10.0, 10.0), 0.0);
        state.pointer_move(Point::new(90.0, 40.0));
        let preview = state.in_progress_arrow().expect("drawing in progress");
        assert_eq!(preview.curvature, 0.0);
        assert_eq!(preview.end, Point::new(90.0, 40.0));
    }

    #[test]
    fn zoom_steps_walk_the_table() {
        let mut state = editor();
        state.zoom = 1.0;
        state.zoom_in();
        assert_eq!(state.zoom, 1.5);
        state.zoom_out();
        state.zoom_out();
        assert_eq!(state.zoom, 0.75);
    }
}
