//! Borrowed pixel views.
//!
//! [`FrameBuffer`] is a view over the whole color and depth buffers.
//! [`Tile`] is a rectangular sub-view made of disjoint row segments; tiles
//! split from one frame buffer can be written from different threads at once.
//! Both implement [`PixelTarget`], which is all the rasterizers need.

use crate::colors::{composite, BlendMode};
use crate::math::Aabb2;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y1 - self.y0).max(0)
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        PixelRect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    /// Pixels whose footprint overlaps `bounds`.
    pub fn covering(bounds: &Aabb2) -> PixelRect {
        if bounds.is_empty() || !bounds.min.x.is_finite() || !bounds.max.x.is_finite() {
            return PixelRect::new(0, 0, 0, 0);
        }
        PixelRect::new(
            bounds.min.x.floor() as i32,
            bounds.min.y.floor() as i32,
            bounds.max.x.ceil() as i32,
            bounds.max.y.ceil() as i32,
        )
    }
}

/// Something rasterizers can write fragments into.
pub trait PixelTarget {
    /// Region this target may write.
    fn bounds(&self) -> PixelRect;

    /// Depth-tested, blended write. Returns `true` if the pixel was stored.
    fn write_pixel(&mut self, x: i32, y: i32, color: u32, depth: f32, blend: BlendMode) -> bool;
}

/// Depth test (`depth <= stored`), then store depth and composite color.
#[inline]
pub(crate) fn store_fragment(
    color_slot: &mut u32,
    depth_slot: &mut f32,
    color: u32,
    depth: f32,
    blend: BlendMode,
) -> bool {
    if depth.is_nan() || depth > *depth_slot {
        return false;
    }
    *depth_slot = depth;
    *color_slot = composite(color, *color_slot, blend);
    true
}

/// A view into color and depth buffers of a `width x height` surface.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(color_buffer.len(), (width * height) as usize);
        debug_assert_eq!(depth_buffer.len(), (width * height) as usize);
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.color_buffer[i])
    }

    pub fn get_depth(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth_buffer[i])
    }

    /// Splits `region` (clipped to the buffer) into `tile_size` squares.
    ///
    /// Tiles come out row-major: all tiles of the first band, then the next.
    pub fn tiles(&mut self, region: PixelRect, tile_size: usize) -> Vec<Tile<'_>> {
        self.split(region, tile_size.max(1), tile_size.max(1))
    }

    /// Splits `region` into at most `bands` full-width horizontal strips.
    pub fn row_bands(&mut self, region: PixelRect, bands: usize) -> Vec<Tile<'_>> {
        let region = region.intersect(&self.bounds());
        let rows = region.height().max(1) as usize;
        let band_height = rows.div_ceil(bands.max(1));
        self.split(region, region.width().max(1) as usize, band_height)
    }

    fn split(&mut self, region: PixelRect, tile_w: usize, tile_h: usize) -> Vec<Tile<'_>> {
        let region = region.intersect(&self.bounds());
        if region.is_empty() {
            return Vec::new();
        }
        let (x0, y0) = (region.x0 as usize, region.y0 as usize);
        let (x1, y1) = (region.x1 as usize, region.y1 as usize);
        let cols = (x1 - x0).div_ceil(tile_w);
        let bands = (y1 - y0).div_ceil(tile_h);

        let mut tiles: Vec<Tile<'_>> = Vec::with_capacity(cols * bands);
        for band in 0..bands {
            for col in 0..cols {
                let tx0 = x0 + col * tile_w;
                let ty0 = y0 + band * tile_h;
                tiles.push(Tile {
                    rect: PixelRect::new(
                        tx0 as i32,
                        ty0 as i32,
                        (tx0 + tile_w).min(x1) as i32,
                        (ty0 + tile_h).min(y1) as i32,
                    ),
                    rows: Vec::with_capacity(tile_h),
                });
            }
        }

        let width = self.width as usize;
        let rows = self
            .color_buffer
            .chunks_mut(width)
            .zip(self.depth_buffer.chunks_mut(width))
            .enumerate()
            .skip(y0)
            .take(y1 - y0);
        for (y, (color_row, depth_row)) in rows {
            let band = (y - y0) / tile_h;
            let segments = color_row[x0..x1]
                .chunks_mut(tile_w)
                .zip(depth_row[x0..x1].chunks_mut(tile_w));
            for (col, (color, depth)) in segments.enumerate() {
                tiles[band * cols + col].rows.push(TileRow { color, depth });
            }
        }
        tiles
    }
}

impl PixelTarget for FrameBuffer<'_> {
    fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    fn write_pixel(&mut self, x: i32, y: i32, color: u32, depth: f32, blend: BlendMode) -> bool {
        match self.index(x, y) {
            Some(i) => store_fragment(
                &mut self.color_buffer[i],
                &mut self.depth_buffer[i],
                color,
                depth,
                blend,
            ),
            None => false,
        }
    }
}

struct TileRow<'a> {
    color: &'a mut [u32],
    depth: &'a mut [f32],
}

/// A rectangular sub-view owning disjoint row segments of a frame buffer.
pub struct Tile<'a> {
    rect: PixelRect,
    rows: Vec<TileRow<'a>>,
}

impl Tile<'_> {
    pub fn rect(&self) -> PixelRect {
        self.rect
    }
}

impl PixelTarget for Tile<'_> {
    fn bounds(&self) -> PixelRect {
        self.rect
    }

    #[inline]
    fn write_pixel(&mut self, x: i32, y: i32, color: u32, depth: f32, blend: BlendMode) -> bool {
        if !self.rect.contains(x, y) {
            return false;
        }
        let row = &mut self.rows[(y - self.rect.y0) as usize];
        let i = (x - self.rect.x0) as usize;
        store_fragment(&mut row.color[i], &mut row.depth[i], color, depth, blend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{argb, BLACK, RED, WHITE};

    fn buffers(w: u32, h: u32) -> (Vec<u32>, Vec<f32>) {
        let n = (w * h) as usize;
        (vec![BLACK; n], vec![f32::INFINITY; n])
    }

    #[test]
    fn depth_test_keeps_nearest() {
        let (mut color, mut depth) = buffers(4, 4);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 4, 4);
        assert!(fb.write_pixel(1, 1, RED, 0.5, BlendMode::Opaque));
        assert!(!fb.write_pixel(1, 1, WHITE, 0.7, BlendMode::Opaque));
        assert!(fb.write_pixel(1, 1, WHITE, 0.5, BlendMode::Opaque));
        assert_eq!(fb.get_pixel(1, 1), Some(WHITE));
        assert_eq!(fb.get_depth(1, 1), Some(0.5));
        assert!(!fb.write_pixel(4, 0, RED, 0.0, BlendMode::Opaque));
        assert!(!fb.write_pixel(-1, 0, RED, 0.0, BlendMode::Opaque));
    }

    #[test]
    fn alpha_zero_leaves_color_but_takes_depth() {
        let (mut color, mut depth) = buffers(2, 2);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2);
        assert!(fb.write_pixel(0, 0, argb(0, 255, 255, 255), 1.0, BlendMode::Alpha));
        assert_eq!(fb.get_pixel(0, 0), Some(BLACK));
        assert_eq!(fb.get_depth(0, 0), Some(1.0));
    }

    #[test]
    fn tiles_cover_region_exactly_once() {
        let (mut color, mut depth) = buffers(70, 40);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 70, 40);
        let region = PixelRect::new(-5, 3, 100, 39);
        let mut tiles = fb.tiles(region, 32);
        // x: 0..70 -> 3 columns, y: 3..39 -> 2 bands
        assert_eq!(tiles.len(), 6);
        let total: usize = tiles.iter().map(|t| t.rect().area()).sum();
        assert_eq!(total, 70 * 36);
        for tile in &mut tiles {
            let r = tile.rect();
            for y in r.y0..r.y1 {
                for x in r.x0..r.x1 {
                    assert!(tile.write_pixel(x, y, RED, 0.0, BlendMode::Opaque));
                }
            }
            assert!(!tile.write_pixel(r.x1, r.y0, RED, 0.0, BlendMode::Opaque));
        }
        drop(tiles);
        assert_eq!(color.iter().filter(|&&c| c == RED).count(), 70 * 36);
        assert_eq!(color[0], BLACK);
    }

    #[test]
    fn row_bands_split_height() {
        let (mut color, mut depth) = buffers(10, 10);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 10, 10);
        let bands = fb.row_bands(PixelRect::new(0, 0, 10, 10), 3);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].rect(), PixelRect::new(0, 0, 10, 4));
        assert_eq!(bands[2].rect(), PixelRect::new(0, 8, 10, 10));
    }
}
