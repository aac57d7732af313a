//! Bitmap textures.

use std::fmt;
use std::path::Path;

use crate::error::ResourceError;
use crate::math::Vec2;

/// An ARGB8888 image sampled by bitmap primitives.
#[derive(Clone, PartialEq)]
pub struct Texture {
    data: Vec<u32>, // row-major, top-left origin
    width: u32,
    height: u32,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Texture {
    /// Loads an image file (PNG, JPG, ...).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();

        // RGBA bytes to ARGB u32
        let data: Vec<u32> = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
            })
            .collect();

        log::debug!("loaded {}x{} texture", width, height);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wraps existing pixels. Returns `None` if `data` does not hold exactly
    /// `width * height` pixels or the image is empty.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a texture by evaluating `f(x, y)` for every texel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u32) -> Option<Self> {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::from_pixels(width, height, data)
    }

    /// Nearest-neighbour sample. `uv` is clamped to `[0, 1]`, `(0, 0)` is the
    /// top-left texel.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> u32 {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.data[(y * self.width + x) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLUE, RED};

    fn checker() -> Texture {
        Texture::from_fn(2, 2, |x, y| if (x + y) % 2 == 0 { RED } else { BLUE }).unwrap()
    }

    #[test]
    fn samples_nearest_texel() {
        let tex = checker();
        assert_eq!(tex.sample(Vec2::new(0.1, 0.1)), RED);
        assert_eq!(tex.sample(Vec2::new(0.9, 0.1)), BLUE);
        assert_eq!(tex.sample(Vec2::new(0.9, 0.9)), RED);
    }

    #[test]
    fn out_of_range_uv_clamps() {
        let tex = checker();
        assert_eq!(tex.sample(Vec2::new(-3.0, -3.0)), RED);
        assert_eq!(tex.sample(Vec2::new(1.0, 0.0)), BLUE);
    }

    #[test]
    fn rejects_mismatched_pixels() {
        assert!(Texture::from_pixels(2, 2, vec![0; 3]).is_none());
        assert!(Texture::from_pixels(0, 0, Vec::new()).is_none());
    }

    #[test]
    fn missing_file_errors() {
        assert!(matches!(
            Texture::from_file("/no/such/image.png"),
            Err(ResourceError::Image(_))
        ));
    }
}
