//! The owned color + depth buffers every frame is drawn into.

use super::framebuffer::{store_fragment, FrameBuffer};
use crate::colors::{self, BlendMode};

/// Depth of an empty pixel: every write passes.
pub const CLEAR_DEPTH: f32 = f32::INFINITY;

pub struct Surface {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    width: u32,
    height: u32,
    clear_color: u32,
}

impl Surface {
    pub fn new(width: u32, height: u32, clear_color: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![clear_color; size],
            depth_buffer: vec![CLEAR_DEPTH; size],
            width,
            height,
            clear_color,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color_buffer = vec![self.clear_color; size];
        self.depth_buffer = vec![CLEAR_DEPTH; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear_color(&self) -> u32 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: u32) {
        self.clear_color = color;
    }

    /// Start-of-frame reset: color to the clear color, depth to infinity.
    pub fn clear_frame_buffer(&mut self) {
        self.color_buffer.fill(self.clear_color);
        self.reset_depth();
    }

    /// Resets depth only, keeping what has been drawn so far.
    pub fn reset_depth(&mut self) {
        self.depth_buffer.fill(CLEAR_DEPTH);
    }

    /// Depth-tested, blended single pixel write. Out-of-bounds writes and
    /// writes that fail `depth <= stored` are rejected.
    pub fn write_pixel(&mut self, x: i32, y: i32, color: u32, depth: f32, blend: BlendMode) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        store_fragment(
            &mut self.color_buffer[i],
            &mut self.depth_buffer[i],
            color,
            depth,
            blend,
        )
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.color_buffer[i])
    }

    pub fn depth(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth_buffer[i])
    }

    pub fn pixels(&self) -> &[u32] {
        &self.color_buffer
    }

    /// Pixels as bytes in native `u32` order, the layout SDL's ARGB8888
    /// streaming textures expect.
    pub fn to_argb_bytes(&self) -> Vec<u8> {
        self.color_buffer.iter().flat_map(|c| c.to_ne_bytes()).collect()
    }

    /// Copies the color buffer into an RGBA image.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [a, r, g, b] = colors::channels(self.color_buffer[(y * self.width + x) as usize]);
            image::Rgba([r, g, b, a])
        })
    }

    /// Mutable view for the rasterizers.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
        )
    }
}
