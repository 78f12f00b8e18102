use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, ARROW_HIT_TOLERANCE, ENDPOINT_SNAP_RADIUS, RESIZE_HANDLE_TOLERANCE};

pub type TextBoxId = u64;
pub type SegmentId = u64;

pub const MIN_TEXT_BOX_WIDTH: f32 = 40.0;
pub const MIN_TEXT_BOX_HEIGHT: f32 = 24.0;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_pos2(self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn delta(self, other: Point) -> Vec2 {
        Vec2::new(other.x - self.x, other.y - self.y)
    }

    pub fn offset(self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        self.delta(other).length()
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Arrow {
    pub start: Point,
    pub end: Point,
    pub curvature: f32,
    pub segment_id: Option<SegmentId>,
    pub is_end_segment: bool,
}

impl Arrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            curvature: 0.0,
            segment_id: None,
            is_end_segment: false,
        }
    }

    /// Derived on every call; never cached on the arrow.
    pub fn control_point(&self) -> Point {
        geometry::control_point(self.start, self.end, self.curvature)
    }

    pub fn is_curved(&self) -> bool {
        self.curvature != 0.0
    }

    pub fn shows_arrowhead(&self) -> bool {
        self.segment_id.is_none() || self.is_end_segment
    }

    pub fn endpoint(&self, which: Endpoint) -> Point {
        match which {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn head_angle(&self) -> f32 {
        geometry::curve_angle_at_end(self.start, self.end, self.control_point())
    }

    pub fn set_curvature(&mut self, value: f32) {
        self.curvature = geometry::snap_curvature(value);
    }

    pub fn contains(&self, point: Point) -> bool {
        let distance = if self.is_curved() {
            geometry::distance_point_to_curve(point, self.start, self.control_point(), self.end)
        } else {
            geometry::distance_point_to_segment(point, self.start, self.end)
        };
        distance <= ARROW_HIT_TOLERANCE
    }

    /// Closest endpoint within the snap radius, start wins ties.
    pub fn snap_endpoint(&self, point: Point) -> Option<Endpoint> {
        let to_start = point.distance(self.start);
        let to_end = point.distance(self.end);
        if to_start <= ENDPOINT_SNAP_RADIUS && to_start <= to_end {
            Some(Endpoint::Start)
        } else if to_end <= ENDPOINT_SNAP_RADIUS {
            Some(Endpoint::End)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TextBox {
    pub id: TextBoxId,
    pub position: Point,
    pub text: String,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 4],
}

impl TextBox {
    pub fn color32(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.color[0], self.color[1], self.color[2], self.color[3])
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position.to_pos2(), Vec2::new(self.width, self.height))
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point.to_pos2())
    }

    pub fn resize_handle(&self) -> Point {
        Point::new(self.position.x + self.width, self.position.y + self.height)
    }

    pub fn hits_resize_handle(&self, point: Point) -> bool {
        self.resize_handle().distance(point) <= RESIZE_HANDLE_TOLERANCE
    }

    pub fn resize_to(&mut self, corner: Point) {
        self.width = (corner.x - self.position.x).max(MIN_TEXT_BOX_WIDTH);
        self.height = (corner.y - self.position.y).max(MIN_TEXT_BOX_HEIGHT);
    }

    /// CSS-style `#rrggbb`, used by the exporters.
    pub fn hex_color(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            self.color[0], self.color[1], self.color[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Arrow, Endpoint, Point, TextBox, MIN_TEXT_BOX_WIDTH};

    fn text_box() -> TextBox {
        TextBox {
            id: 7,
            position: Point::new(10.0, 10.0),
            text: "note".to_string(),
            width: 100.0,
            height: 40.0,
            color: [0x1a, 0x20, 0x2c, 255],
        }
    }

    #[test]
    fn hit_test_straight_arrow() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(arrow.contains(Point::new(50.0, 9.0)));
        assert!(!arrow.contains(Point::new(50.0, 11.0)));
    }

    #[test]
    fn hit_test_curved_arrow_uses_the_curve() {
        let mut arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        arrow.set_curvature(0.5);
        // Apex of the bulge is 12.5 px off the chord.
        assert!(arrow.contains(Point::new(50.0, 12.5)));
        assert!(!arrow.contains(Point::new(50.0, -2.0)));
    }

    #[test]
    fn snap_endpoint_prefers_nearest() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(arrow.snap_endpoint(Point::new(5.0, 5.0)), Some(Endpoint::Start));
        assert_eq!(arrow.snap_endpoint(Point::new(90.0, 0.0)), Some(Endpoint::End));
        assert_eq!(arrow.snap_endpoint(Point::new(50.0, 0.0)), None);
    }

    #[test]
    fn arrowhead_only_on_chain_end() {
        let mut arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(arrow.shows_arrowhead());
        arrow.segment_id = Some(3);
        assert!(!arrow.shows_arrowhead());
        arrow.is_end_segment = true;
        assert!(arrow.shows_arrowhead());
    }

    #[test]
    fn text_box_resize_respects_minimum() {
        let mut text_box = text_box();
        assert!(text_box.hits_resize_handle(Point::new(108.0, 52.0)));
        assert!(!text_box.hits_resize_handle(Point::new(100.0, 40.0)));

        text_box.resize_to(Point::new(0.0, 200.0));
        assert_eq!(text_box.width, MIN_TEXT_BOX_WIDTH);
        assert_eq!(text_box.height, 190.0);
    }

    #[test]
    fn text_box_hex_color() {
        assert_eq!(text_box().hex_color(), "#1a202c");
    }
}
