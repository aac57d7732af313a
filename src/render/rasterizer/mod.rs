//! Rasterization algorithms.
//!
//! Each shape kind has a region fill that writes into any [`PixelTarget`]:
//!
//! - [`triangle`]: edge-function fill with a whole-block fast path
//! - [`ellipse`]: implicit-surface test in local space
//! - [`polyline`]: strokes expanded to triangles
//! - [`glyph`]: scanline (even-odd) or signed-distance outline fill
//!
//! [`Rasterizer`] runs these serially for small shapes and over disjoint
//! tiles on the `rayon` pool for large ones.

pub mod ellipse;
pub mod fragment;
pub mod glyph;
pub mod polyline;
pub mod tiles;
pub mod triangle;

pub use ellipse::{ellipse_covers, EllipseFill};
pub use fragment::{perspective_weights, FlatShader, Fragment, PixelShader, VertexColorShader};
pub use glyph::GlyphFill;
pub use polyline::stroke_triangles;
pub use triangle::BarycentricTriangle;

use super::framebuffer::{FrameBuffer, PixelRect, PixelTarget};
use crate::colors::{scale_alpha, BlendMode};
use crate::triangulate::Triangle2;

/// Pixel count above which a fill is split across workers.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16_384;
/// Edge length of a parallel triangle tile.
pub const DEFAULT_TILE_SIZE: usize = 32;

/// Shades `fragment` and writes it. Returns `true` if the shader kept it.
#[inline]
pub(crate) fn emit<T, S>(target: &mut T, fragment: &Fragment, shader: &S, blend: BlendMode) -> bool
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    match shader.shade(fragment) {
        Some(color) => {
            target.write_pixel(
                fragment.x,
                fragment.y,
                scale_alpha(color, fragment.coverage),
                fragment.depth,
                blend,
            );
            true
        }
        None => false,
    }
}

/// Chooses between serial and tiled fills and owns their tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rasterizer {
    parallel_threshold: usize,
    tile_size: usize,
    workers: usize,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_PARALLEL_THRESHOLD, DEFAULT_TILE_SIZE, None)
    }
}

impl Rasterizer {
    /// `workers: None` uses the size of the current `rayon` pool.
    pub fn new(parallel_threshold: usize, tile_size: usize, workers: Option<usize>) -> Self {
        Self {
            parallel_threshold,
            tile_size: tile_size.max(1),
            workers: workers.unwrap_or_else(rayon::current_num_threads).max(1),
        }
    }

    /// A rasterizer that never leaves the calling thread.
    pub fn serial() -> Self {
        Self::new(usize::MAX, DEFAULT_TILE_SIZE, Some(1))
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn is_parallel(&self, region: PixelRect) -> bool {
        self.workers > 1 && region.area() > self.parallel_threshold
    }

    fn clip(fb: &FrameBuffer<'_>, bounds: &crate::math::Aabb2) -> PixelRect {
        PixelRect::covering(bounds).intersect(&fb.bounds())
    }

    /// Fills one screen-space triangle with per-vertex depths.
    pub fn fill_triangle<S>(
        &self,
        fb: &mut FrameBuffer<'_>,
        tri: &BarycentricTriangle,
        depths: [f32; 3],
        shader: &S,
        blend: BlendMode,
    ) -> usize
    where
        S: PixelShader + ?Sized,
    {
        if tri.is_degenerate() {
            return 0;
        }
        let region = Self::clip(fb, &tri.bounds());
        if region.is_empty() {
            return 0;
        }
        if self.is_parallel(region) {
            tiles::for_each_tile(fb, region, self.tile_size, self.workers, |tile| {
                let rect = tile.rect();
                triangle::fill_region(tile, tri, rect, depths, shader, blend)
            })
        } else {
            triangle::fill_triangle(fb, tri, depths, shader, blend, self.tile_size)
        }
    }

    /// Fills a batch of flat-depth triangles (strokes, rectangles, polygons).
    pub fn fill_triangles<S>(
        &self,
        fb: &mut FrameBuffer<'_>,
        triangles: &[Triangle2],
        depth: f32,
        shader: &S,
        blend: BlendMode,
    ) -> usize
    where
        S: PixelShader + ?Sized,
    {
        triangles
            .iter()
            .map(|t| {
                let tri = BarycentricTriangle::new(*t);
                self.fill_triangle(fb, &tri, [depth; 3], shader, blend)
            })
            .sum()
    }

    pub fn fill_ellipse<S>(
        &self,
        fb: &mut FrameBuffer<'_>,
        ellipse: &EllipseFill,
        depth: f32,
        shader: &S,
        blend: BlendMode,
    ) -> usize
    where
        S: PixelShader + ?Sized,
    {
        let region = Self::clip(fb, &ellipse.bounds());
        if region.is_empty() {
            return 0;
        }
        if self.is_parallel(region) {
            tiles::for_each_band(fb, region, self.workers, |band| {
                let rect = band.rect();
                ellipse::fill_region(band, ellipse, rect, depth, shader, blend)
            })
        } else {
            ellipse::fill_region(fb, ellipse, region, depth, shader, blend)
        }
    }

    pub fn fill_glyphs<S>(
        &self,
        fb: &mut FrameBuffer<'_>,
        glyphs: &GlyphFill,
        depth: f32,
        shader: &S,
        blend: BlendMode,
    ) -> usize
    where
        S: PixelShader + ?Sized,
    {
        let region = Self::clip(fb, &glyphs.bounds());
        if region.is_empty() {
            return 0;
        }
        if self.is_parallel(region) {
            tiles::for_each_band(fb, region, self.workers, |band| {
                let rect = band.rect();
                glyph::fill_region(band, glyphs, rect, depth, shader, blend)
            })
        } else {
            glyph::fill_region(fb, glyphs, region, depth, shader, blend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, RED};
    use crate::math::{Mat3, Vec2};

    fn buffers() -> (Vec<u32>, Vec<f32>) {
        (vec![BLACK; 200 * 200], vec![f32::INFINITY; 200 * 200])
    }

    fn big_triangle() -> BarycentricTriangle {
        BarycentricTriangle::new([
            Vec2::new(3.3, 2.1),
            Vec2::new(197.0, 40.7),
            Vec2::new(60.2, 190.9),
        ])
    }

    #[test]
    fn tiled_triangle_matches_serial() {
        let tri = big_triangle();
        let shader = FlatShader::new(RED);

        let (mut c1, mut d1) = buffers();
        let mut fb = FrameBuffer::new(&mut c1, &mut d1, 200, 200);
        let serial = Rasterizer::serial().fill_triangle(&mut fb, &tri, [0.5; 3], &shader, BlendMode::Opaque);

        let (mut c2, mut d2) = buffers();
        let mut fb = FrameBuffer::new(&mut c2, &mut d2, 200, 200);
        let tiled = Rasterizer::new(0, 32, Some(4)).fill_triangle(&mut fb, &tri, [0.5; 3], &shader, BlendMode::Opaque);

        assert_eq!(serial, tiled);
        assert_eq!(c1, c2);
        assert_eq!(d1, d2);
    }

    #[test]
    fn banded_ellipse_matches_serial() {
        let e = EllipseFill::new(
            Vec2::new(80.0, 50.0),
            6.0,
            false,
            &(Mat3::translation(Vec2::splat(100.0)) * Mat3::rotation(0.3)),
        )
        .unwrap();
        let shader = FlatShader::new(RED);

        let (mut c1, mut d1) = buffers();
        let mut fb = FrameBuffer::new(&mut c1, &mut d1, 200, 200);
        let serial = Rasterizer::serial().fill_ellipse(&mut fb, &e, 0.0, &shader, BlendMode::Opaque);

        let (mut c2, mut d2) = buffers();
        let mut fb = FrameBuffer::new(&mut c2, &mut d2, 200, 200);
        let banded = Rasterizer::new(0, 32, Some(3)).fill_ellipse(&mut fb, &e, 0.0, &shader, BlendMode::Opaque);

        assert!(serial > 0);
        assert_eq!(serial, banded);
        assert_eq!(c1, c2);
    }

    #[test]
    fn discarding_shader_counts_nothing() {
        let (mut c, mut d) = buffers();
        let mut fb = FrameBuffer::new(&mut c, &mut d, 200, 200);
        let discard = |_: &Fragment| -> Option<u32> { None };
        let n = Rasterizer::default().fill_triangle(&mut fb, &big_triangle(), [0.0; 3], &discard, BlendMode::Alpha);
        assert_eq!(n, 0);
        drop(fb);
        assert!(c.iter().all(|&p| p == BLACK));
    }

    #[test]
    fn coverage_scales_alpha() {
        let (mut c, mut d) = buffers();
        let mut fb = FrameBuffer::new(&mut c, &mut d, 200, 200);
        let f = Fragment {
            x: 1,
            y: 1,
            weights: [1.0, 0.0, 0.0],
            depth: 0.0,
            coverage: 0.5,
        };
        assert!(emit(&mut fb, &f, &FlatShader::new(RED), BlendMode::Opaque));
        assert_eq!(crate::colors::alpha(fb.get_pixel(1, 1).unwrap()), 128);
    }
}
