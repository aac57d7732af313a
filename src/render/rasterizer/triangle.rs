//! Edge-function triangle fill.
//!
//! # Edge Function
//!
//! For an edge from A to B, evaluated at P:
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! which is the 2D cross product `(B - A) x (P - A)` with the sign flipped.
//! Edge functions are flipped for clockwise input so the interior is always
//! positive, which makes either winding work. Values are proportional to
//! barycentric weights:
//! `lambda_i = E_i(P) / (E_0 + E_1 + E_2)`, with `E_i` the edge opposite
//! vertex `i`.
//!
//! # Fill Convention
//!
//! A pixel centre exactly on an edge belongs to the triangle only if that
//! edge is a top edge (horizontal, interior below) or a left edge (interior
//! to its right). Triangles sharing an edge then cover each centre on it
//! exactly once, so translucent meshes blend without seams.
//!
//! Regions are filled block by block. When the four corner pixel centres of a
//! block are all inside, the whole block is inside (a triangle is convex) and
//! the per-pixel tests are skipped.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)

use super::emit;
use super::fragment::{Fragment, PixelShader};
use crate::colors::BlendMode;
use crate::math::{Aabb2, Vec2};
use crate::render::framebuffer::{PixelRect, PixelTarget};

const DEGENERATE_AREA: f32 = 1e-8;

/// `E(P) = a * P.x + b * P.y + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeFunction {
    a: f32,
    b: f32,
    c: f32,
}

impl EdgeFunction {
    fn through(from: Vec2, to: Vec2) -> Self {
        let a = to.y - from.y;
        let b = from.x - to.x;
        Self {
            a,
            b,
            c: -(a * from.x + b * from.y),
        }
    }

    #[inline]
    fn evaluate(&self, p: Vec2) -> f32 {
        self.a * p.x + self.b * p.y + self.c
    }

    fn flipped(self) -> Self {
        Self {
            a: -self.a,
            b: -self.b,
            c: -self.c,
        }
    }

    /// With the interior on the positive side (y down): the edge owns its
    /// boundary when the interior lies to its right, or below a horizontal
    /// edge.
    fn is_top_left(&self) -> bool {
        self.a > 0.0 || (self.a == 0.0 && self.b > 0.0)
    }

    #[inline]
    fn includes(&self, value: f32, top_left: bool) -> bool {
        value > 0.0 || (value == 0.0 && top_left)
    }
}

/// A screen-space triangle with its edge functions precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycentricTriangle {
    vertices: [Vec2; 3],
    /// Oriented so the interior is positive.
    edges: [EdgeFunction; 3],
    top_left: [bool; 3],
    /// Twice the area, non-negative.
    area: f32,
}

impl BarycentricTriangle {
    pub fn new(vertices: [Vec2; 3]) -> Self {
        let [v0, v1, v2] = vertices;
        let mut edges = [
            EdgeFunction::through(v1, v2),
            EdgeFunction::through(v2, v0),
            EdgeFunction::through(v0, v1),
        ];
        if edges[0].evaluate(v0) < 0.0 {
            edges = edges.map(EdgeFunction::flipped);
        }
        Self {
            vertices,
            edges,
            top_left: edges.map(|e| e.is_top_left()),
            area: edges[0].evaluate(v0),
        }
    }

    pub fn vertices(&self) -> [Vec2; 3] {
        self.vertices
    }

    pub fn is_degenerate(&self) -> bool {
        self.area.abs() < DEGENERATE_AREA
    }

    #[inline]
    fn edge_values(&self, p: Vec2) -> [f32; 3] {
        [
            self.edges[0].evaluate(p),
            self.edges[1].evaluate(p),
            self.edges[2].evaluate(p),
        ]
    }

    /// Half-space test. Points on an edge are inside only for top and left
    /// edges.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let values = self.edge_values(p);
        (0..3).all(|i| self.edges[i].includes(values[i], self.top_left[i]))
    }

    /// Barycentric weights of `p`; they sum to one.
    #[inline]
    pub fn weights(&self, p: Vec2) -> [f32; 3] {
        let inv_area = 1.0 / self.area;
        self.edge_values(p).map(|w| w * inv_area)
    }

    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_points(self.vertices.iter())
    }
}

fn pixel_center(x: i32, y: i32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// `true` when every pixel centre of `region` is inside the triangle.
pub fn region_fully_inside(tri: &BarycentricTriangle, region: PixelRect) -> bool {
    !region.is_empty()
        && [
            pixel_center(region.x0, region.y0),
            pixel_center(region.x1 - 1, region.y0),
            pixel_center(region.x0, region.y1 - 1),
            pixel_center(region.x1 - 1, region.y1 - 1),
        ]
        .iter()
        .all(|&c| tri.contains(c))
}

/// Fills the part of `tri` inside `region`. Returns the number of fragments
/// the shader produced.
pub fn fill_region<T, S>(
    target: &mut T,
    tri: &BarycentricTriangle,
    region: PixelRect,
    depths: [f32; 3],
    shader: &S,
    blend: BlendMode,
) -> usize
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    let region = region.intersect(&target.bounds());
    if region.is_empty() || tri.is_degenerate() {
        return 0;
    }
    let full = region_fully_inside(tri, region);

    let mut emitted = 0;
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            let p = pixel_center(x, y);
            if !full && !tri.contains(p) {
                continue;
            }
            let weights = tri.weights(p);
            let fragment = Fragment {
                x,
                y,
                weights,
                depth: weights[0] * depths[0] + weights[1] * depths[1] + weights[2] * depths[2],
                coverage: 1.0,
            };
            if emit(target, &fragment, shader, blend) {
                emitted += 1;
            }
        }
    }
    emitted
}

/// Single-threaded fill: walks the bounding box in `block` sized squares.
pub fn fill_triangle<T, S>(
    target: &mut T,
    tri: &BarycentricTriangle,
    depths: [f32; 3],
    shader: &S,
    blend: BlendMode,
    block: usize,
) -> usize
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    if tri.is_degenerate() {
        return 0;
    }
    let bbox = PixelRect::covering(&tri.bounds()).intersect(&target.bounds());
    let step = block.max(1) as i32;

    let mut emitted = 0;
    let mut y = bbox.y0;
    while y < bbox.y1 {
        let mut x = bbox.x0;
        while x < bbox.x1 {
            let region = PixelRect::new(x, y, (x + step).min(bbox.x1), (y + step).min(bbox.y1));
            emitted += fill_region(target, tri, region, depths, shader, blend);
            x += step;
        }
        y += step;
    }
    emitted
}

#[cfg(test)]
mod tests {
    use super::super::fragment::FlatShader;
    use super::*;
    use crate::colors::{BLACK, RED};
    use crate::render::framebuffer::FrameBuffer;

    fn tri(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> BarycentricTriangle {
        BarycentricTriangle::new([
            Vec2::new(a.0, a.1),
            Vec2::new(b.0, b.1),
            Vec2::new(c.0, c.1),
        ])
    }

    /// Counts pixels by testing every centre, no block logic.
    fn brute_force(t: &BarycentricTriangle, w: i32, h: i32) -> usize {
        (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| t.contains(pixel_center(x, y)))
            .count()
    }

    #[test]
    fn inside_outside_scenario() {
        let t = tri((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        assert!(t.contains(Vec2::new(1.0, 1.0)));
        assert!(!t.contains(Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn winding_does_not_matter() {
        let ccw = tri((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        let cw = tri((0.0, 0.0), (0.0, 10.0), (10.0, 0.0));
        for p in [Vec2::new(1.0, 1.0), Vec2::new(4.0, 4.0), Vec2::new(8.0, 8.0)] {
            assert_eq!(ccw.contains(p), cw.contains(p));
        }
    }

    fn assert_covered_once(a: &BarycentricTriangle, b: &BarycentricTriangle, w: i32, h: i32) {
        for y in 0..h {
            for x in 0..w {
                let p = pixel_center(x, y);
                assert!(!(a.contains(p) && b.contains(p)), "pixel ({}, {}) covered twice", x, y);
            }
        }
    }

    #[test]
    fn shared_diagonal_is_covered_once() {
        let (a, b, c, d) = ((0.0, 0.0), (8.0, 0.0), (8.0, 8.0), (0.0, 8.0));
        let upper = tri(a, b, c);
        let lower = tri(a, c, d);
        assert_covered_once(&upper, &lower, 8, 8);
        assert_eq!(brute_force(&upper, 8, 8) + brute_force(&lower, 8, 8), 64);

        // Reversed winding follows the same convention.
        let upper = tri(c, b, a);
        let lower = tri(d, c, a);
        assert_covered_once(&upper, &lower, 8, 8);
        assert_eq!(brute_force(&upper, 8, 8) + brute_force(&lower, 8, 8), 64);
    }

    #[test]
    fn shared_horizontal_edge_is_covered_once() {
        let top = tri((0.0, 4.5), (4.0, 0.0), (8.0, 4.5));
        let bottom = tri((0.0, 4.5), (8.0, 4.5), (4.0, 9.0));
        assert_covered_once(&top, &bottom, 8, 9);
        // The row of centres on y = 4.5 lies on a top edge of `bottom`.
        assert!(bottom.contains(Vec2::new(4.5, 4.5)));
        assert!(!top.contains(Vec2::new(4.5, 4.5)));
    }

    #[test]
    fn weights_sum_to_one_and_hit_vertices() {
        let t = tri((2.0, 1.0), (17.0, 4.0), (6.0, 13.0));
        let w = t.weights(Vec2::new(7.0, 6.0));
        approx::assert_relative_eq!(w.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        let at_v1 = t.weights(Vec2::new(17.0, 4.0));
        approx::assert_relative_eq!(at_v1[1], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_emits_nothing() {
        let t = tri((0.0, 0.0), (5.0, 5.0), (10.0, 10.0));
        assert!(t.is_degenerate());
        let mut color = vec![BLACK; 256];
        let mut depth = vec![f32::INFINITY; 256];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 16, 16);
        let n = fill_triangle(&mut fb, &t, [0.0; 3], &FlatShader::new(RED), BlendMode::Opaque, 8);
        assert_eq!(n, 0);
    }

    #[test]
    fn fast_path_fills_whole_region() {
        let t = tri((-100.0, -100.0), (300.0, -100.0), (-100.0, 300.0));
        let region = PixelRect::new(0, 0, 32, 32);
        assert!(region_fully_inside(&t, region));

        let mut color = vec![BLACK; 64 * 64];
        let mut depth = vec![f32::INFINITY; 64 * 64];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 64, 64);
        let n = fill_region(&mut fb, &t, region, [0.0; 3], &FlatShader::new(RED), BlendMode::Opaque);
        assert_eq!(n, region.area());
    }

    #[test]
    fn partial_regions_match_brute_force() {
        let shapes = [
            tri((3.2, 1.7), (60.1, 20.4), (12.9, 55.5)),
            tri((63.0, 0.0), (0.0, 31.5), (40.0, 63.0)),
            tri((10.0, 10.0), (11.0, 50.0), (12.0, 10.0)),
        ];
        for t in shapes {
            let mut color = vec![BLACK; 64 * 64];
            let mut depth = vec![f32::INFINITY; 64 * 64];
            let mut fb = FrameBuffer::new(&mut color, &mut depth, 64, 64);
            let n = fill_triangle(&mut fb, &t, [0.0; 3], &FlatShader::new(RED), BlendMode::Opaque, 8);
            assert_eq!(n, brute_force(&t, 64, 64));
            drop(fb);
            assert_eq!(color.iter().filter(|&&c| c == RED).count(), n);
        }
    }

    #[test]
    fn depth_is_interpolated() {
        let t = tri((0.0, 0.0), (16.0, 0.0), (0.0, 16.0));
        let mut color = vec![BLACK; 256];
        let mut depth = vec![f32::INFINITY; 256];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 16, 16);
        fill_triangle(&mut fb, &t, [0.0, 1.0, 1.0], &FlatShader::new(RED), BlendMode::Opaque, 32);
        let near = fb.get_depth(0, 0).unwrap();
        let far = fb.get_depth(10, 4).unwrap();
        assert!(near < far);
    }
}
