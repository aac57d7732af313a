//! Glyph fill for flattened outlines in screen space.
//!
//! Both strategies use the non-zero winding rule, so overlapping contours
//! with the same direction stay filled and holes need the opposite direction
//! (the TrueType convention).
//!
//! - **Scanline** (aliased): an edge table sorted by `ymin` feeds an active
//!   edge list per scanline; crossings at the pixel-centre row are sorted and
//!   spans are filled while the running winding sum is non-zero.
//! - **Signed distance** (smoothed): per pixel, the winding number decides
//!   inside/outside and the distance to the nearest edge gives a signed
//!   distance `sd`; coverage is `smoothstep(-r, r, sd)`.

use super::emit;
use super::fragment::{Fragment, PixelShader};
use crate::colors::BlendMode;
use crate::math::{Aabb2, Vec2};
use crate::render::framebuffer::{PixelRect, PixelTarget};

/// A non-horizontal outline edge, oriented so `top.y < bottom.y`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    top: Vec2,
    bottom: Vec2,
    /// dx/dy
    slope: f32,
    /// `+1` if the outline runs downwards along this edge, `-1` upwards.
    winding: i32,
}

impl Edge {
    fn new(a: Vec2, b: Vec2) -> Option<Self> {
        if a.y == b.y {
            return None;
        }
        let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Self {
            top,
            bottom,
            slope: (bottom.x - top.x) / (bottom.y - top.y),
            winding,
        })
    }

    #[inline]
    fn x_at(&self, y: f32) -> f32 {
        self.top.x + (y - self.top.y) * self.slope
    }
}

fn closed_segments(contour: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = contour.len();
    (0..n).map(move |i| (contour[i], contour[(i + 1) % n]))
}

/// Glyph contours prepared for filling.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphFill {
    contours: Vec<Vec<Vec2>>,
    /// Edge table, sorted by top y.
    edges: Vec<Edge>,
    smoothing: f32,
    bounds: Aabb2,
}

impl GlyphFill {
    /// `smoothing` is the signed-distance radius in pixels; `0` selects the
    /// aliased scanline fill.
    pub fn new(contours: Vec<Vec<Vec2>>, smoothing: f32) -> Self {
        let contours: Vec<Vec<Vec2>> = contours.into_iter().filter(|c| c.len() >= 3).collect();
        let mut edges: Vec<Edge> = contours
            .iter()
            .flat_map(|c| closed_segments(c))
            .filter_map(|(a, b)| Edge::new(a, b))
            .collect();
        edges.sort_by(|a, b| a.top.y.total_cmp(&b.top.y));

        let smoothing = smoothing.max(0.0);
        let bounds = Aabb2::from_points(contours.iter().flatten()).inflate(smoothing);
        Self {
            contours,
            edges,
            smoothing,
            bounds,
        }
    }

    pub fn bounds(&self) -> Aabb2 {
        self.bounds
    }

    pub fn is_smoothed(&self) -> bool {
        self.smoothing > 0.0
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Non-zero winding number of `p` over all contours.
    pub fn winding_number(&self, p: Vec2) -> i32 {
        let mut winding = 0;
        for contour in &self.contours {
            for (a, b) in closed_segments(contour) {
                let side = (b - a).cross(p - a);
                if a.y <= p.y {
                    if b.y > p.y && side > 0.0 {
                        winding += 1;
                    }
                } else if b.y <= p.y && side < 0.0 {
                    winding -= 1;
                }
            }
        }
        winding
    }

    /// Distance to the nearest edge, positive inside.
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        let nearest = self
            .contours
            .iter()
            .flat_map(|c| closed_segments(c))
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f32::INFINITY, f32::min);
        if self.winding_number(p) != 0 {
            nearest
        } else {
            -nearest
        }
    }

    /// Sorted `(x, winding)` crossings of the scanline at `y`; edges are
    /// half-open `[top, bottom)` so shared vertices count once.
    fn crossings(&self, active: &[&Edge], y: f32, out: &mut Vec<(f32, i32)>) {
        out.clear();
        out.extend(
            active
                .iter()
                .filter(|e| e.top.y <= y && y < e.bottom.y)
                .map(|e| (e.x_at(y), e.winding)),
        );
        out.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
}

/// Turns sorted crossings into `[start, end)` spans where the winding sum is
/// non-zero.
fn nonzero_spans(crossings: &[(f32, i32)], out: &mut Vec<(f32, f32)>) {
    out.clear();
    let mut winding = 0;
    let mut start = 0.0;
    for &(x, dir) in crossings {
        let before = winding;
        winding += dir;
        if before == 0 && winding != 0 {
            start = x;
        } else if before != 0 && winding == 0 {
            out.push((start, x));
        }
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 <= f32::EPSILON {
        0.0
    } else {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    };
    p.distance(a + ab * t)
}

/// Hermite step from 0 at `edge0` to 1 at `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fills `glyphs` inside `region`, choosing the strategy from its smoothing.
pub fn fill_region<T, S>(
    target: &mut T,
    glyphs: &GlyphFill,
    region: PixelRect,
    depth: f32,
    shader: &S,
    blend: BlendMode,
) -> usize
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    let region = region
        .intersect(&PixelRect::covering(&glyphs.bounds))
        .intersect(&target.bounds());
    if region.is_empty() || glyphs.is_empty() {
        return 0;
    }
    if glyphs.is_smoothed() {
        fill_distance(target, glyphs, region, depth, shader, blend)
    } else {
        fill_scanlines(target, glyphs, region, depth, shader, blend)
    }
}

fn fill_scanlines<T, S>(
    target: &mut T,
    glyphs: &GlyphFill,
    region: PixelRect,
    depth: f32,
    shader: &S,
    blend: BlendMode,
) -> usize
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    let mut emitted = 0;
    let mut next_edge = 0;
    let mut active: Vec<&Edge> = Vec::new();
    let mut xs = Vec::new();
    let mut spans = Vec::new();

    for y in region.y0..region.y1 {
        let sy = y as f32 + 0.5;
        while next_edge < glyphs.edges.len() && glyphs.edges[next_edge].top.y <= sy {
            active.push(&glyphs.edges[next_edge]);
            next_edge += 1;
        }
        active.retain(|e| e.bottom.y > sy);
        glyphs.crossings(&active, sy, &mut xs);
        nonzero_spans(&xs, &mut spans);

        for &(xa, xb) in &spans {
            // Pixel x is covered when its centre x + 0.5 lies in [xa, xb).
            let first = ((xa - 0.5).ceil() as i32).max(region.x0);
            let last = ((xb - 0.5).ceil() as i32).min(region.x1);
            for x in first..last {
                let fragment = Fragment {
                    x,
                    y,
                    weights: [1.0, 0.0, 0.0],
                    depth,
                    coverage: 1.0,
                };
                if emit(target, &fragment, shader, blend) {
                    emitted += 1;
                }
            }
        }
    }
    emitted
}

fn fill_distance<T, S>(
    target: &mut T,
    glyphs: &GlyphFill,
    region: PixelRect,
    depth: f32,
    shader: &S,
    blend: BlendMode,
) -> usize
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    let r = glyphs.smoothing;
    let mut emitted = 0;
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            let mut fragment = Fragment {
                x,
                y,
                weights: [1.0, 0.0, 0.0],
                depth,
                coverage: 0.0,
            };
            fragment.coverage = smoothstep(-r, r, glyphs.signed_distance(fragment.center()));
            if fragment.coverage > 0.0 && emit(target, &fragment, shader, blend) {
                emitted += 1;
            }
        }
    }
    emitted
}
