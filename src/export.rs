//! Coordinate export: a readable report, a normalized source literal and a
//! JSON document. Every call recomputes the text from the current state.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::annotation::{Arrow, Point, SegmentId, TextBox};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Report,
    Normalized,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Report, Self::Normalized, Self::Json];

    pub fn label(self) -> &'static str {
        match self {
            Self::Report => "Report",
            Self::Normalized => "Normalized",
            Self::Json => "JSON",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    fn normalize(self, point: Point) -> (f64, f64) {
        (
            round2(point.x as f64 / self.width.max(1) as f64),
            round2(point.y as f64 / self.height.max(1) as f64),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for ExportedPoint {
    fn from(value: Point) -> Self {
        Self {
            x: round2(value.x as f64),
            y: round2(value.y as f64),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedArrow {
    pub start: ExportedPoint,
    pub end: ExportedPoint,
    pub curvature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point: Option<ExportedPoint>,
    #[serde(default)]
    pub segment_id: Option<SegmentId>,
    #[serde(default)]
    pub is_end_segment: bool,
    pub length: f64,
    pub angle: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedTextBox {
    pub text: String,
    pub position: ExportedPoint,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub image: ImageSize,
    pub arrows: Vec<ExportedArrow>,
    pub text_boxes: Vec<ExportedTextBox>,
}

/// Arrows in one connected chain, or a lone arrow.
enum ArrowGroup<'a> {
    Segment(Vec<&'a Arrow>),
    Single(&'a Arrow),
}

pub fn export(
    format: ExportFormat,
    arrows: &[Arrow],
    text_boxes: &[TextBox],
    size: ImageSize,
) -> Result<String> {
    match format {
        ExportFormat::Report => Ok(coordinate_report(arrows, text_boxes, size)),
        ExportFormat::Normalized => Ok(normalized_literal(arrows, text_boxes, size)),
        ExportFormat::Json => to_json(&build_document(arrows, text_boxes, size)),
    }
}

pub fn coordinate_report(arrows: &[Arrow], text_boxes: &[TextBox], size: ImageSize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image: {}x{} px", size.width, size.height);

    if arrows.is_empty() && text_boxes.is_empty() {
        out.push_str("\nNo annotations.\n");
        return out;
    }

    let mut arrow_number = 0;
    let mut segment_number = 0;
    for group in group_arrows(arrows) {
        out.push('\n');
        match group {
            ArrowGroup::Single(arrow) => {
                arrow_number += 1;
                let _ = writeln!(out, "Arrow {arrow_number}");
                let _ = writeln!(out, "  {}", arrow_line(arrow));
            }
            ArrowGroup::Segment(parts) => {
                segment_number += 1;
                let _ = writeln!(
                    out,
                    "Connected Segment {segment_number} ({} arrows)",
                    parts.len()
                );
                for (index, arrow) in parts.iter().enumerate() {
                    let _ = writeln!(out, "  Part {}: {}", index + 1, arrow_line(arrow));
                }
            }
        }
    }

    for (index, text_box) in text_boxes.iter().enumerate() {
        if index == 0 {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "Text Box {}: {:?} at ({},{}) size {}x{}",
            index + 1,
            text_box.text,
            fmt_num(text_box.position.x as f64),
            fmt_num(text_box.position.y as f64),
            fmt_num(text_box.width as f64),
            fmt_num(text_box.height as f64),
        );
    }

    out
}

fn arrow_line(arrow: &Arrow) -> String {
    let mut line = format!(
        "Start:({},{}) End:({},{}) Length:{:.2} Angle:{:.2}",
        fmt_num(arrow.start.x as f64),
        fmt_num(arrow.start.y as f64),
        fmt_num(arrow.end.x as f64),
        fmt_num(arrow.end.y as f64),
        round2(arrow_length(arrow)),
        round2(arrow_angle(arrow)),
    );
    if arrow.is_curved() {
        let control = arrow.control_point();
        let _ = write!(
            line,
            " Curvature:{} Control:({},{})",
            fmt_num(arrow.curvature as f64),
            fmt_num(control.x as f64),
            fmt_num(control.y as f64),
        );
    }
    line
}

/// Normalized 0–1 coordinates as a JavaScript-style literal, one inner array
/// per chain (lone arrows get a chain of their own).
pub fn normalized_literal(arrows: &[Arrow], text_boxes: &[TextBox], size: ImageSize) -> String {
    let mut out = String::from("const arrows = [\n");
    for group in group_arrows(arrows) {
        let parts = match group {
            ArrowGroup::Single(arrow) => vec![arrow],
            ArrowGroup::Segment(parts) => parts,
        };
        out.push_str("  [\n");
        for arrow in parts {
            let (x1, y1) = size.normalize(arrow.start);
            let (x2, y2) = size.normalize(arrow.end);
            let _ = writeln!(
                out,
                "    {{ x1: {x1}, y1: {y1}, x2: {x2}, y2: {y2}, curvature: {} }},",
                round2(arrow.curvature as f64)
            );
        }
        out.push_str("  ],\n");
    }
    out.push_str("];\n\nconst textBoxes = [\n");
    for text_box in text_boxes {
        let (x, y) = size.normalize(text_box.position);
        let text = serde_json::to_string(&text_box.text).unwrap_or_else(|_| "\"\"".to_string());
        let _ = writeln!(
            out,
            "  {{ text: {text}, x: {x}, y: {y}, color: \"{}\" }},",
            text_box.hex_color()
        );
    }
    out.push_str("];\n");
    out
}

pub fn build_document(arrows: &[Arrow], text_boxes: &[TextBox], size: ImageSize) -> ExportDocument {
    ExportDocument {
        image: size,
        arrows: arrows
            .iter()
            .map(|arrow| ExportedArrow {
                start: arrow.start.into(),
                end: arrow.end.into(),
                curvature: round2(arrow.curvature as f64),
                control_point: arrow.is_curved().then(|| arrow.control_point().into()),
                segment_id: arrow.segment_id,
                is_end_segment: arrow.is_end_segment,
                length: round2(arrow_length(arrow)),
                angle: round2(arrow_angle(arrow)),
            })
            .collect(),
        text_boxes: text_boxes
            .iter()
            .map(|text_box| ExportedTextBox {
                text: text_box.text.clone(),
                position: text_box.position.into(),
                width: round2(text_box.width as f64),
                height: round2(text_box.height as f64),
                color: text_box.hex_color(),
            })
            .collect(),
    }
}

pub fn to_json(document: &ExportDocument) -> Result<String> {
    serde_json::to_string_pretty(document).context("cannot serialize annotations")
}

/// Reads back a document written by [`to_json`].
#[cfg(test)]
pub fn parse_json(raw: &str) -> Result<ExportDocument> {
    serde_json::from_str(raw).context("cannot parse exported annotations")
}

fn group_arrows(arrows: &[Arrow]) -> Vec<ArrowGroup<'_>> {
    let mut groups: Vec<ArrowGroup<'_>> = Vec::new();
    let mut segment_slots: Vec<(SegmentId, usize)> = Vec::new();

    for arrow in arrows {
        let Some(segment_id) = arrow.segment_id else {
            groups.push(ArrowGroup::Single(arrow));
            continue;
        };
        match segment_slots.iter().find(|(id, _)| *id == segment_id) {
            Some(&(_, slot)) => {
                if let ArrowGroup::Segment(parts) = &mut groups[slot] {
                    parts.push(arrow);
                }
            }
            None => {
                segment_slots.push((segment_id, groups.len()));
                groups.push(ArrowGroup::Segment(vec![arrow]));
            }
        }
    }

    groups
}

fn arrow_length(arrow: &Arrow) -> f64 {
    let dx = arrow.end.x as f64 - arrow.start.x as f64;
    let dy = arrow.end.y as f64 - arrow.start.y as f64;
    (dx * dx + dy * dy).sqrt()
}

fn arrow_angle(arrow: &Arrow) -> f64 {
    let dx = arrow.end.x as f64 - arrow.start.x as f64;
    let dy = arrow.end.y as f64 - arrow.start.y as f64;
    dy.atan2(dx).to_degrees()
}

/// Two-decimal rounding that never yields negative zero.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn fmt_num(value: f64) -> String {
    round2(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        build_document, coordinate_report, export, normalized_literal, parse_json, round2,
        ExportFormat, ImageSize,
    };
    use crate::annotation::{Arrow, Point, TextBox};

    const SIZE: ImageSize = ImageSize {
        width: 800,
        height: 600,
    };

    fn chained(start: Point, end: Point, segment: u64, is_end: bool) -> Arrow {
        Arrow {
            segment_id: Some(segment),
            is_end_segment: is_end,
            ..Arrow::new(start, end)
        }
    }

    fn label(text: &str, x: f32, y: f32) -> TextBox {
        TextBox {
            id: 1,
            position: Point::new(x, y),
            text: text.to_string(),
            width: 200.0,
            height: 60.0,
            color: [255, 255, 255, 255],
        }
    }

    #[test]
    fn report_for_single_straight_arrow() {
        let arrows = vec![Arrow::new(Point::new(100.0, 100.0), Point::new(200.0, 100.0))];
        let report = coordinate_report(&arrows, &[], SIZE);
        assert!(report.contains("Arrow 1"));
        assert!(report.contains("Start:(100,100) End:(200,100) Length:100.00 Angle:0.00"));
        assert!(!report.contains("Curvature"));
    }

    #[test]
    fn report_lists_curvature_and_control_point() {
        let mut arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        arrow.set_curvature(0.2);
        let report = coordinate_report(&[arrow], &[], SIZE);
        assert!(report.contains("Curvature:0.2 Control:(50,10)"));
    }

    #[test]
    fn report_groups_segments_in_insertion_order() {
        let arrows = vec![
            chained(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 4, false),
            Arrow::new(Point::new(50.0, 50.0), Point::new(60.0, 60.0)),
            chained(Point::new(10.0, 0.0), Point::new(10.0, 10.0), 4, true),
        ];
        let report = coordinate_report(&arrows, &[], SIZE);

        let segment = report.find("Connected Segment 1 (2 arrows)").expect("segment block");
        let single = report.find("Arrow 1\n").expect("standalone block");
        assert!(segment < single);
        assert!(report.contains("Part 2: Start:(10,0) End:(10,10) Length:10.00 Angle:90.00"));
    }

    #[test]
    fn report_mentions_text_boxes() {
        let report = coordinate_report(&[], &[label("hello", 12.5, 30.0)], SIZE);
        assert!(report.contains("Text Box 1: \"hello\" at (12.5,30) size 200x60"));
    }

    #[test]
    fn empty_report_says_so() {
        let report = coordinate_report(&[], &[], SIZE);
        assert!(report.starts_with("Image: 800x600 px"));
        assert!(report.contains("No annotations."));
    }

    #[test]
    fn normalized_literal_divides_by_image_size() {
        let arrows = vec![Arrow::new(Point::new(100.0, 150.0), Point::new(400.0, 600.0))];
        let text_boxes = vec![label("a \"quote\"", 200.0, 300.0)];
        let literal = normalized_literal(&arrows, &text_boxes, SIZE);

        assert!(literal.contains("{ x1: 0.13, y1: 0.25, x2: 0.5, y2: 1, curvature: 0 },"));
        assert!(literal
            .contains("{ text: \"a \\\"quote\\\"\", x: 0.25, y: 0.5, color: \"#ffffff\" },"));
        assert!(literal.starts_with("const arrows = [\n  [\n"));
    }

    #[test]
    fn normalized_literal_nests_chains() {
        let arrows = vec![
            chained(Point::new(0.0, 0.0), Point::new(80.0, 60.0), 1, false),
            chained(Point::new(80.0, 60.0), Point::new(160.0, 60.0), 1, true),
        ];
        let literal = normalized_literal(&arrows, &[], SIZE);
        assert_eq!(literal.matches("  [\n").count(), 1);
        assert_eq!(literal.matches("x1:").count(), 2);
    }

    #[test]
    fn json_round_trip_keeps_rounded_values() {
        let mut curved = Arrow::new(Point::new(10.123, 20.456), Point::new(300.987, 40.0));
        curved.set_curvature(-0.37);
        let arrows = vec![
            curved,
            chained(Point::new(1.0, 2.0), Point::new(3.0, 4.0), 9, true),
        ];
        let text_boxes = vec![label("multi\nline", 33.333, 44.444)];

        let raw = export(ExportFormat::Json, &arrows, &text_boxes, SIZE).expect("json export");
        let parsed = parse_json(&raw).expect("parse export");
        let expected = build_document(&arrows, &text_boxes, SIZE);

        assert_eq!(parsed.image, SIZE);
        assert_eq!(parsed.arrows.len(), expected.arrows.len());
        for (got, want) in parsed.arrows.iter().zip(&expected.arrows) {
            assert_eq!(round2(got.start.x), want.start.x);
            assert_eq!(round2(got.start.y), want.start.y);
            assert_eq!(round2(got.end.x), want.end.x);
            assert_eq!(round2(got.end.y), want.end.y);
            assert_eq!(round2(got.curvature), want.curvature);
            assert_eq!(got.segment_id, want.segment_id);
        }
        let text_box = &parsed.text_boxes[0];
        assert_eq!(text_box.text, "multi\nline");
        assert_eq!(round2(text_box.position.x), 33.33);
        assert_eq!(round2(text_box.position.y), 44.44);
        assert_eq!(round2(text_box.width), 200.0);
        assert_eq!(round2(text_box.height), 60.0);
    }

    #[test]
    fn json_omits_control_point_for_straight_arrows() {
        let arrows = vec![Arrow::new(Point::new(0.0, 0.0), Point::new(5.0, 5.0))];
        let raw = export(ExportFormat::Json, &arrows, &[], SIZE).expect("json export");
        assert!(!raw.contains("control_point"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_json("{ not json").is_err());
    }
}
