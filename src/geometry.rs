//! Curve and hit-test math shared by the canvas, the state machine and the
//! coordinate exporter. Everything here works in image pixel space.

use crate::annotation::Point;

/// Max distance from an arrow (or its sampled curve) that still counts as a hit.
pub const ARROW_HIT_TOLERANCE: f32 = 10.0;
/// Max distance from an arrow endpoint for chaining.
pub const ENDPOINT_SNAP_RADIUS: f32 = 15.0;
/// Max distance from a text box corner that grabs the resize handle.
pub const RESIZE_HANDLE_TOLERANCE: f32 = 6.0;
/// Bézier parameter step used when hit-testing curved arrows.
pub const CURVE_SAMPLE_STEP: f32 = 0.1;

pub const MAX_CURVATURE: f32 = 0.5;
pub const CURVATURE_STEP: f32 = 0.01;

/// Quadratic Bézier control point for an arrow: the chord midpoint pushed
/// along the unit perpendicular `(-dy, dx)` by `curvature * length / 2`.
pub fn control_point(start: Point, end: Point, curvature: f32) -> Point {
    let mid = start.midpoint(end);
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return mid;
    }

    let offset = curvature * length * 0.5;
    Point::new(mid.x - dy / length * offset, mid.y + dx / length * offset)
}

/// Tangent direction of the curve at `t = 1`, in radians.
pub fn curve_angle_at_end(start: Point, end: Point, control: Point) -> f32 {
    let tx = 2.0 * (end.x - control.x);
    let ty = 2.0 * (end.y - control.y);
    if tx.abs() <= f32::EPSILON && ty.abs() <= f32::EPSILON {
        return (end.y - start.y).atan2(end.x - start.x);
    }
    ty.atan2(tx)
}

pub fn point_on_quadratic(start: Point, control: Point, end: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
        u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
    )
}

/// Polyline approximation of the curve with `steps` segments, both ends included.
pub fn sample_quadratic(start: Point, control: Point, end: Point, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| point_on_quadratic(start, control, end, i as f32 / steps as f32))
        .collect()
}

pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + abx * t, a.y + aby * t))
}

pub fn distance_point_to_curve(p: Point, start: Point, control: Point, end: Point) -> f32 {
    let steps = (1.0 / CURVE_SAMPLE_STEP).round() as usize;
    sample_quadratic(start, control, end, steps)
        .windows(2)
        .map(|pair| distance_point_to_segment(p, pair[0], pair[1]))
        .fold(f32::INFINITY, f32::min)
}

/// Clamps to the allowed range and snaps to the slider step.
pub fn snap_curvature(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let clamped = value.clamp(-MAX_CURVATURE, MAX_CURVATURE);
    (clamped / CURVATURE_STEP).round() * CURVATURE_STEP
}
