//! Polygon triangulation by ear clipping, with hole bridging.
//!
//! # Algorithm Overview
//!
//! 1. Every hole is spliced into the outer contour with a zero-width bridge so
//!    the polygon becomes a single (weakly simple) contour:
//!
//! ```text
//!   outer: ... A ---------- I ---------- B ...
//!                           |
//!   hole:          H2 ---- M (rightmost hole vertex)
//!
//!   merged: ... A, I, M, H.., M, I, B ...
//! ```
//!
//!    `I` is where a horizontal ray cast from `M` towards +x first crosses the
//!    contour merged so far. Holes are bridged right-to-left so a ray can never
//!    pass through a hole that has not been merged yet.
//!
//! 2. Ears are clipped one at a time. A vertex is an ear when the turn
//!    `prev -> cur -> next` is convex for the contour winding and no other
//!    remaining vertex lies strictly inside the triangle.
//!
//! If a full pass finds no ear the input is not a simple polygon and the result
//! is empty. Callers treat an empty result as "nothing to draw".
//!
//! # References
//!
//! - David Eberly, "Triangulation by Ear Clipping" (Geometric Tools, 2002)

use crate::math::Vec2;

/// A triangle as three points.
pub type Triangle2 = [Vec2; 3];

const AREA_EPSILON: f32 = 1e-6;

/// Signed area by the shoelace formula. Positive for counter-clockwise
/// contours in a y-up frame.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| points[i].cross(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// `true` when the shoelace sum is negative.
pub fn is_clockwise(points: &[Vec2]) -> bool {
    signed_area(points) < 0.0
}

pub fn triangle_area(t: &Triangle2) -> f32 {
    ((t[1] - t[0]).cross(t[2] - t[0]) * 0.5).abs()
}

/// Removes consecutive duplicate points, including a closing duplicate of the
/// first point.
pub fn dedup_contour(points: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map_or(true, |&q| q != p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn orient(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a)
}

fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    ((d1 > AREA_EPSILON && d2 < -AREA_EPSILON) || (d1 < -AREA_EPSILON && d2 > AREA_EPSILON))
        && ((d3 > AREA_EPSILON && d4 < -AREA_EPSILON) || (d3 < -AREA_EPSILON && d4 > AREA_EPSILON))
}

/// `false` when any two non-adjacent edges properly cross.
pub fn is_simple(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 4 {
        return true;
    }
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        for j in (i + 2)..n {
            // Edge n-1 is adjacent to edge 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (points[j], points[(j + 1) % n]);
            if segments_cross(a, b, c, d) {
                return false;
            }
        }
    }
    true
}

fn strictly_inside(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = orient(a, b, p);
    let d2 = orient(b, c, p);
    let d3 = orient(c, a, p);
    (d1 > AREA_EPSILON && d2 > AREA_EPSILON && d3 > AREA_EPSILON)
        || (d1 < -AREA_EPSILON && d2 < -AREA_EPSILON && d3 < -AREA_EPSILON)
}

/// Finds where a +x ray from `origin` first crosses `contour`.
///
/// Returns the index of the crossed edge's start vertex and the crossing point.
fn cast_bridge_ray(contour: &[Vec2], origin: Vec2) -> Option<(usize, Vec2)> {
    let n = contour.len();
    let mut best: Option<(usize, Vec2)> = None;
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        let dy = b.y - a.y;
        // Horizontal edges never cross a horizontal ray; skip before dividing.
        if dy.abs() <= f32::EPSILON {
            continue;
        }
        if origin.y < a.y.min(b.y) || origin.y > a.y.max(b.y) {
            continue;
        }
        let x = a.x + (origin.y - a.y) * (b.x - a.x) / dy;
        if x < origin.x {
            continue;
        }
        if best.map_or(true, |(_, p)| x < p.x) {
            best = Some((i, Vec2::new(x, origin.y)));
        }
    }
    best
}

/// Splices `holes` into `outer`, returning a single bridged contour.
///
/// Holes are re-oriented against `outer_clockwise` when needed. A hole whose
/// bridge ray hits nothing is not enclosed and is skipped.
pub fn merge_holes<H: AsRef<[Vec2]>>(
    outer: &[Vec2],
    outer_clockwise: bool,
    holes: &[H],
) -> Vec<Vec2> {
    let mut merged = outer.to_vec();

    let mut ordered: Vec<Vec<Vec2>> = holes
        .iter()
        .map(|h| dedup_contour(h.as_ref()))
        .filter(|h| h.len() >= 3)
        .collect();
    let rightmost_x = |h: &Vec<Vec2>| h.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    ordered.sort_by(|a, b| rightmost_x(b).total_cmp(&rightmost_x(a)));

    for mut hole in ordered {
        if is_clockwise(&hole) == outer_clockwise {
            hole.reverse();
        }

        let mut m_index = 0;
        for (i, p) in hole.iter().enumerate() {
            if p.x > hole[m_index].x {
                m_index = i;
            }
        }
        let m = hole[m_index];

        let Some((edge, crossing)) = cast_bridge_ray(&merged, m) else {
            log::debug!("hole at {:?} is not enclosed, skipping", m);
            continue;
        };

        let next = (edge + 1) % merged.len();
        let bridge_index = if crossing.distance(merged[edge]) <= AREA_EPSILON {
            edge
        } else if crossing.distance(merged[next]) <= AREA_EPSILON {
            next
        } else {
            merged.insert(edge + 1, crossing);
            edge + 1
        };
        let bridge = merged[bridge_index];

        let mut spliced = Vec::with_capacity(merged.len() + hole.len() + 2);
        spliced.extend_from_slice(&merged[..=bridge_index]);
        spliced.extend(hole[m_index..].iter().chain(hole[..m_index].iter()));
        spliced.push(m);
        spliced.push(bridge);
        spliced.extend_from_slice(&merged[bridge_index + 1..]);
        merged = spliced;
    }

    merged
}

/// Ear-clips a single contour whose orientation is `clockwise`.
///
/// Returns an empty list when no ear can be found.
pub fn ear_clip(points: &[Vec2], clockwise: bool) -> Vec<Triangle2> {
    if points.len() < 3 {
        return Vec::new();
    }
    let winding = if clockwise { -1.0 } else { 1.0 };

    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut progressed = false;

        for i in 0..n {
            let ip = remaining[(i + n - 1) % n];
            let ic = remaining[i];
            let inx = remaining[(i + 1) % n];
            let (a, b, c) = (points[ip], points[ic], points[inx]);

            let turn = (b - a).cross(c - b) * winding;
            if turn.abs() <= AREA_EPSILON {
                // Zero-area corner: drop the vertex without emitting anything.
                remaining.remove(i);
                progressed = true;
                break;
            }
            if turn < 0.0 {
                continue;
            }

            let blocked = remaining.iter().any(|&j| {
                let p = points[j];
                j != ip
                    && j != ic
                    && j != inx
                    && p != a
                    && p != b
                    && p != c
                    && strictly_inside(p, a, b, c)
            });
            if blocked {
                continue;
            }

            triangles.push([a, b, c]);
            remaining.remove(i);
            progressed = true;
            break;
        }

        if !progressed {
            log::warn!(
                "ear clipping stalled with {} vertices left; polygon is not simple",
                n
            );
            return Vec::new();
        }
    }

    if remaining.len() == 3 {
        let t = [
            points[remaining[0]],
            points[remaining[1]],
            points[remaining[2]],
        ];
        if triangle_area(&t) > AREA_EPSILON {
            triangles.push(t);
        }
    }
    triangles
}

/// Triangulates an outer contour with optional holes.
///
/// Degenerate input (fewer than three distinct points, near-zero area, or
/// self-crossing contours) yields an empty list.
pub fn triangulate<H: AsRef<[Vec2]>>(outer: &[Vec2], holes: &[H]) -> Vec<Triangle2> {
    triangulate_oriented(outer, is_clockwise(outer), holes)
}

/// Like [`triangulate`], with the outer winding supplied by the caller (for
/// contours that cache their orientation).
pub fn triangulate_oriented<H: AsRef<[Vec2]>>(
    outer: &[Vec2],
    clockwise: bool,
    holes: &[H],
) -> Vec<Triangle2> {
    let outer = dedup_contour(outer);
    if outer.len() < 3 || signed_area(&outer).abs() <= AREA_EPSILON {
        return Vec::new();
    }
    if !is_simple(&outer) || holes.iter().any(|h| !is_simple(h.as_ref())) {
        log::debug!("self-intersecting contour, skipping triangulation");
        return Vec::new();
    }
    if holes.is_empty() {
        return ear_clip(&outer, clockwise);
    }
    let merged = merge_holes(&outer, clockwise, holes);
    ear_clip(&merged, clockwise)
}
