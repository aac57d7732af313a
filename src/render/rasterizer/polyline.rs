//! Polyline stroking.
//!
//! Strokes are turned into triangles in screen space and handed to the
//! triangle rasterizer. Each segment `a -> b` becomes a quad offset by the
//! segment normal times half the thickness:
//!
//! ```text
//!   a + n ---------------- b + n
//!     |                      |
//!   a ---------------------- b
//!     |                      |
//!   a - n ---------------- b - n
//! ```
//!
//! Rounded joins add a triangle fan on the outside of each bend, spanning the
//! gap between the two segment normals.

use std::f32::consts::PI;

use crate::math::Vec2;
use crate::triangulate::Triangle2;

/// Angular overlap added to both ends of a join fan.
const JOIN_ANGLE_MARGIN: f32 = 0.01;
/// Radial overlap so fans cover the quad edges they meet.
const JOIN_RADIUS_MARGIN: f32 = 0.25;
const JOIN_STEP: f32 = PI / 16.0;

/// Triangles covering a stroke of `thickness` pixels along `points`.
///
/// Zero-length segments are skipped; fewer than two distinct points or a
/// non-positive thickness produce nothing.
pub fn stroke_triangles(
    points: &[Vec2],
    thickness: f32,
    rounded_joins: bool,
    closed: bool,
) -> Vec<Triangle2> {
    let half = thickness * 0.5;
    if half <= 0.0 || points.len() < 2 {
        return Vec::new();
    }

    let mut segments: Vec<(Vec2, Vec2)> = points
        .windows(2)
        .map(|w| (w[0], w[1]))
        .collect();
    if closed && points.len() > 2 {
        segments.push((points[points.len() - 1], points[0]));
    }
    segments.retain(|(a, b)| (*b - *a).length_squared() > f32::EPSILON);

    let mut triangles = Vec::with_capacity(segments.len() * 2);
    for &(a, b) in &segments {
        let n = (b - a).normalize().perp() * half;
        triangles.push([a + n, b + n, b - n]);
        triangles.push([a + n, b - n, a - n]);
    }

    if rounded_joins && segments.len() > 1 {
        let joins = if closed {
            segments.len()
        } else {
            segments.len() - 1
        };
        for i in 0..joins {
            let (a, pivot) = segments[i];
            let (_, c) = segments[(i + 1) % segments.len()];
            join_fan(&mut triangles, pivot, pivot - a, c - pivot, half);
        }
    }
    triangles
}

/// Fan around `pivot` between the outer offsets of directions `d0` and `d1`.
fn join_fan(out: &mut Vec<Triangle2>, pivot: Vec2, d0: Vec2, d1: Vec2, half: f32) {
    let (d0, d1) = (d0.normalize(), d1.normalize());
    let turn = d0.cross(d1).atan2(d0.dot(d1));
    if turn.abs() <= f32::EPSILON {
        return;
    }
    // The outside of the bend is opposite the turning direction.
    let side = if d0.cross(d1) > 0.0 { -1.0 } else { 1.0 };
    let start = (d0.perp() * side).angle() - JOIN_ANGLE_MARGIN * turn.signum();
    let sweep = turn + 2.0 * JOIN_ANGLE_MARGIN * turn.signum();
    let radius = half + JOIN_RADIUS_MARGIN;

    let steps = (turn.abs() / JOIN_STEP).ceil().max(1.0) as usize;
    let mut prev = pivot + Vec2::from_angle(start) * radius;
    for step in 1..=steps {
        let angle = start + sweep * step as f32 / steps as f32;
        let next = pivot + Vec2::from_angle(angle) * radius;
        out.push([pivot, prev, next]);
        prev = next;
    }
}
